use std::sync::Arc;

use shared::{
    domain::{Candidate, CandidateId, Election, ElectionId, UserProfile},
    error::ApiException,
    protocol::{ElectionDetail, LoginRequest, LoginResponse, RegisterRequest, VoteRequest},
};
use storage::{KeyValueStore, TOKEN_KEY, USER_KEY};
use tracing::{debug, error, info, warn};

use crate::{
    api::{ApiReply, ElectionApi},
    error::ClientError,
};

/// Status messages shown after each action.
pub mod status {
    pub const LOGGED_IN: &str = "Logged in";
    pub const LOGIN_FAILED: &str = "Login failed";
    pub const REGISTERED: &str = "Registered! Please log in.";
    pub const REGISTER_FAILED: &str = "Register failed";
    pub const PLEASE_LOG_IN: &str = "Please log in";
    pub const SELECT_ELECTION_FIRST: &str = "Select an election first";
    pub const VOTE_RECORDED: &str = "Vote recorded. Thank you!";
}

/// Result of an operation that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult<T> {
    Completed(T),
    /// Rejected by the server or by a client-side precondition. The message
    /// is also the new status message, except for a vote refused without an
    /// `error` string.
    Failed(String),
}

impl<T> CommandResult<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed(message) => Some(message),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandResult<U> {
        match self {
            Self::Completed(value) => CommandResult::Completed(f(value)),
            Self::Failed(message) => CommandResult::Failed(message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

/// Owns the client-side view of the voting session and drives every request
/// against the election API.
pub struct SessionController {
    api: Arc<dyn ElectionApi>,
    store: Arc<dyn KeyValueStore>,
    session: Session,
    elections: Vec<Election>,
    selected_election: Option<Election>,
    candidates: Vec<Candidate>,
    status: Option<String>,
}

impl SessionController {
    /// Starts with an empty session; the store is only written to.
    pub fn new(api: Arc<dyn ElectionApi>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            api,
            store,
            session: Session::default(),
            elections: Vec::new(),
            selected_election: None,
            candidates: Vec::new(),
            status: None,
        }
    }

    /// Rebuilds the session persisted by a previous run.
    pub async fn restore(
        api: Arc<dyn ElectionApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ClientError> {
        let token = store.get(TOKEN_KEY).await?;
        let user = match store.get(USER_KEY).await? {
            Some(raw) => match serde_json::from_str::<Option<UserProfile>>(&raw) {
                Ok(user) => user,
                Err(err) => {
                    warn!(error = %err, "ignoring unreadable persisted user profile");
                    None
                }
            },
            None => None,
        };

        let mut controller = Self::new(api, store);
        controller.session = Session { token, user };
        debug!(
            authenticated = controller.session.is_authenticated(),
            "restored session"
        );
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn elections(&self) -> &[Election] {
        &self.elections
    }

    pub fn selected_election(&self) -> Option<&Election> {
        self.selected_election.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn fail<T>(&mut self, message: impl Into<String>) -> CommandResult<T> {
        let message = message.into();
        self.set_status(message.clone());
        CommandResult::Failed(message)
    }

    /// Replaces the election list. Failures leave the previous list in place
    /// and do not touch the status message.
    pub async fn list_elections(&mut self) -> Result<Vec<Election>, ClientError> {
        let reply = self
            .api
            .list_elections()
            .await
            .inspect_err(|err| error!(error = %err, "failed to fetch elections"))?;

        match reply {
            ApiReply::Ok(elections) => {
                info!(count = elections.len(), "fetched elections");
                self.elections = elections.clone();
                Ok(elections)
            }
            ApiReply::Rejected { status, error } => {
                let err = ApiException::new(
                    status,
                    error.unwrap_or_else(|| "failed to fetch elections".to_string()),
                );
                error!(error = %err, "election list request rejected");
                Err(err.into())
            }
        }
    }

    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<CommandResult<UserProfile>, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let reply = self
            .api
            .login(&request)
            .await
            .inspect_err(|err| error!(error = %err, email, "login request failed"))?;

        match reply {
            ApiReply::Ok(LoginResponse { token, user }) => {
                self.persist_session(&token, &user).await?;
                self.session = Session {
                    token: Some(token),
                    user: Some(user.clone()),
                };
                info!(user_id = user.id.0, "logged in");
                self.set_status(status::LOGGED_IN);
                Ok(CommandResult::Completed(user))
            }
            ApiReply::Rejected { status, error } => {
                warn!(status, email, "login rejected");
                Ok(self.fail(error.unwrap_or_else(|| status::LOGIN_FAILED.to_string())))
            }
        }
    }

    async fn persist_session(&self, token: &str, user: &UserProfile) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(user)?;
        self.store.set(TOKEN_KEY, token).await?;
        if let Err(err) = self.store.set(USER_KEY, &user_json).await {
            // A token without its user must not outlive this call.
            if let Err(rollback) = self.store.remove(TOKEN_KEY).await {
                warn!(error = %rollback, "failed to roll back persisted token");
            }
            return Err(err.into());
        }
        Ok(())
    }

    /// Creates an account. Never signs the user in.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CommandResult<()>, ClientError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let reply = self
            .api
            .register(&request)
            .await
            .inspect_err(|err| error!(error = %err, email, "register request failed"))?;

        match reply {
            ApiReply::Ok(()) => {
                info!(email, "registered");
                self.set_status(status::REGISTERED);
                Ok(CommandResult::Completed(()))
            }
            ApiReply::Rejected { status, error } => {
                warn!(status, email, "registration rejected");
                Ok(self.fail(error.unwrap_or_else(|| status::REGISTER_FAILED.to_string())))
            }
        }
    }

    /// Loads an election and its candidates. Failures change nothing.
    pub async fn view_election(
        &mut self,
        election_id: ElectionId,
    ) -> Result<ElectionDetail, ClientError> {
        let reply = self
            .api
            .election_detail(election_id)
            .await
            .inspect_err(|err| {
                debug!(error = %err, election_id = election_id.0, "failed to fetch election")
            })?;

        match reply {
            ApiReply::Ok(detail) => {
                debug!(
                    election_id = detail.election.id.0,
                    candidates = detail.candidates.len(),
                    "selected election"
                );
                self.selected_election = Some(detail.election.clone());
                self.candidates = detail.candidates.clone();
                Ok(detail)
            }
            ApiReply::Rejected { status, error } => {
                debug!(status, election_id = election_id.0, "election request rejected");
                Err(ApiException::new(
                    status,
                    error.unwrap_or_else(|| format!("election {election_id} unavailable")),
                )
                .into())
            }
        }
    }

    /// Votes for `candidate_id` in the selected election. Nothing is sent
    /// without a token or a selected election. Repeated calls each issue a
    /// request.
    pub async fn cast_vote(
        &mut self,
        candidate_id: CandidateId,
    ) -> Result<CommandResult<()>, ClientError> {
        let Some(token) = self.session.token.clone().filter(|token| !token.is_empty()) else {
            return Ok(self.fail(status::PLEASE_LOG_IN));
        };
        let Some(election_id) = self.selected_election.as_ref().map(|election| election.id) else {
            return Ok(self.fail(status::SELECT_ELECTION_FIRST));
        };

        let reply = self
            .api
            .cast_vote(election_id, &token, &VoteRequest { candidate_id })
            .await
            .inspect_err(|err| {
                error!(
                    error = %err,
                    election_id = election_id.0,
                    candidate_id = candidate_id.0,
                    "vote request failed"
                )
            })?;

        match reply {
            ApiReply::Ok(()) => {
                info!(
                    election_id = election_id.0,
                    candidate_id = candidate_id.0,
                    "vote recorded"
                );
                self.set_status(status::VOTE_RECORDED);
                Ok(CommandResult::Completed(()))
            }
            ApiReply::Rejected {
                status: code,
                error: Some(message),
            } => {
                warn!(status = code, election_id = election_id.0, "vote rejected");
                Ok(self.fail(message))
            }
            ApiReply::Rejected {
                status: code,
                error: None,
            } => {
                // Status follows the `error` field alone.
                warn!(
                    status = code,
                    election_id = election_id.0,
                    "vote rejected without an error message"
                );
                self.set_status(status::VOTE_RECORDED);
                Ok(CommandResult::Failed(format!(
                    "vote rejected with status {code}"
                )))
            }
        }
    }

    /// Forgets the session locally. No request is made.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.session = Session::default();
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await?;
        info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
