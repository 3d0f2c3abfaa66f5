//! Command/result surface for presentation layers.

use shared::{
    domain::{CandidateId, Election, ElectionId, UserProfile},
    protocol::ElectionDetail,
};
use tracing::debug;

use crate::{
    controller::{CommandResult, SessionController},
    error::ClientError,
};

pub enum ClientCommand {
    ListElections,
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    ViewElection {
        election_id: ElectionId,
    },
    CastVote {
        candidate_id: CandidateId,
    },
    Logout,
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::ListElections => "list_elections",
            ClientCommand::Login { .. } => "login",
            ClientCommand::Register { .. } => "register",
            ClientCommand::ViewElection { .. } => "view_election",
            ClientCommand::CastVote { .. } => "cast_vote",
            ClientCommand::Logout => "logout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Elections(Vec<Election>),
    LoggedIn(UserProfile),
    Registered,
    Election(ElectionDetail),
    VoteRecorded,
    LoggedOut,
}

#[derive(Debug, Clone)]
pub struct CommandReport {
    pub command: &'static str,
    pub result: CommandResult<CommandOutput>,
    /// Status message after the command ran.
    pub status: Option<String>,
}

impl SessionController {
    pub async fn execute(&mut self, command: ClientCommand) -> Result<CommandReport, ClientError> {
        let command_name = command.name();
        debug!(command = command_name, "executing client command");

        let result = match command {
            ClientCommand::ListElections => {
                CommandResult::Completed(CommandOutput::Elections(self.list_elections().await?))
            }
            ClientCommand::Login { email, password } => self
                .login(&email, &password)
                .await?
                .map(CommandOutput::LoggedIn),
            ClientCommand::Register {
                name,
                email,
                password,
            } => self
                .register(&name, &email, &password)
                .await?
                .map(|()| CommandOutput::Registered),
            ClientCommand::ViewElection { election_id } => {
                CommandResult::Completed(CommandOutput::Election(
                    self.view_election(election_id).await?,
                ))
            }
            ClientCommand::CastVote { candidate_id } => self
                .cast_vote(candidate_id)
                .await?
                .map(|()| CommandOutput::VoteRecorded),
            ClientCommand::Logout => {
                self.logout().await?;
                CommandResult::Completed(CommandOutput::LoggedOut)
            }
        };

        Ok(CommandReport {
            command: command_name,
            result,
            status: self.status().map(str::to_string),
        })
    }
}
