use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Election, ElectionId},
    error::ApiErrorBody,
    protocol::{ElectionDetail, LoginRequest, LoginResponse, RegisterRequest, VoteRequest},
};
use tracing::debug;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";

/// Outcome of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    Ok(T),
    /// The server refused the request. `error` carries the `error` string of
    /// the response body when there was one.
    Rejected { status: u16, error: Option<String> },
}

/// Election API collaborator. Transport failures surface as `Err`.
#[async_trait]
pub trait ElectionApi: Send + Sync {
    async fn list_elections(&self) -> Result<ApiReply<Vec<Election>>, ClientError>;
    async fn login(&self, request: &LoginRequest) -> Result<ApiReply<LoginResponse>, ClientError>;
    async fn register(&self, request: &RegisterRequest) -> Result<ApiReply<()>, ClientError>;
    async fn election_detail(
        &self,
        election_id: ElectionId,
    ) -> Result<ApiReply<ElectionDetail>, ClientError>;
    async fn cast_vote(
        &self,
        election_id: ElectionId,
        token: &str,
        request: &VoteRequest,
    ) -> Result<ApiReply<()>, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpElectionApi {
    http: Client,
    base_url: String,
}

impl HttpElectionApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for HttpElectionApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

async fn json_reply<T: DeserializeOwned>(response: Response) -> Result<ApiReply<T>, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(ApiReply::Ok(serde_json::from_slice(&body)?));
    }
    Ok(ApiReply::Rejected {
        status: status.as_u16(),
        error: ApiErrorBody::message_from_bytes(&body),
    })
}

/// Like `json_reply` for endpoints whose success body carries nothing. An
/// `error` field is honoured even on a 2xx reply.
async fn empty_reply(response: Response) -> Result<ApiReply<()>, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    let error = ApiErrorBody::message_from_bytes(&body);
    if status.is_success() && error.is_none() {
        return Ok(ApiReply::Ok(()));
    }
    Ok(ApiReply::Rejected {
        status: status.as_u16(),
        error,
    })
}

#[async_trait]
impl ElectionApi for HttpElectionApi {
    async fn list_elections(&self) -> Result<ApiReply<Vec<Election>>, ClientError> {
        let response = self.http.get(self.endpoint("elections")).send().await?;
        debug!(status = %response.status(), "GET /elections");
        json_reply(response).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<ApiReply<LoginResponse>, ClientError> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(request)
            .send()
            .await?;
        debug!(status = %response.status(), email = %request.email, "POST /login");
        json_reply(response).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<ApiReply<()>, ClientError> {
        let response = self
            .http
            .post(self.endpoint("register"))
            .json(request)
            .send()
            .await?;
        debug!(status = %response.status(), email = %request.email, "POST /register");
        let status = response.status();
        let body = response.bytes().await?;
        if status.is_success() {
            return Ok(ApiReply::Ok(()));
        }
        Ok(ApiReply::Rejected {
            status: status.as_u16(),
            error: ApiErrorBody::message_from_bytes(&body),
        })
    }

    async fn election_detail(
        &self,
        election_id: ElectionId,
    ) -> Result<ApiReply<ElectionDetail>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&format!("elections/{election_id}")))
            .send()
            .await?;
        debug!(status = %response.status(), election_id = election_id.0, "GET /elections/{{id}}");
        json_reply(response).await
    }

    async fn cast_vote(
        &self,
        election_id: ElectionId,
        token: &str,
        request: &VoteRequest,
    ) -> Result<ApiReply<()>, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&format!("elections/{election_id}/vote")))
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;
        debug!(
            status = %response.status(),
            election_id = election_id.0,
            candidate_id = request.candidate_id.0,
            "POST /elections/{{id}}/vote"
        );
        empty_reply(response).await
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
