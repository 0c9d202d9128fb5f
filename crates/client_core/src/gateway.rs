//! Remote notes surface consumed by the controller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{Note, NoteId},
    error::ApiError,
    protocol::{note_route, CreateNoteRequest, NOTES_ROUTE},
};
use tracing::debug;
use url::Url;

use crate::error::GatewayError;

#[async_trait]
pub trait NotesGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<Note>, GatewayError>;
    async fn create(&self, title: &str, content: &str) -> Result<Note, GatewayError>;
    async fn remove(&self, note_id: NoteId) -> Result<(), GatewayError>;
}

pub struct MissingNotesGateway;

#[async_trait]
impl NotesGateway for MissingNotesGateway {
    async fn list(&self) -> Result<Vec<Note>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn create(&self, _title: &str, _content: &str) -> Result<Note, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn remove(&self, _note_id: NoteId) -> Result<(), GatewayError> {
        Err(GatewayError::Unavailable)
    }
}

/// JSON-over-HTTP client for the notes server routes.
pub struct HttpNotesGateway {
    http: Client,
    base_url: Url,
}

impl HttpNotesGateway {
    pub fn new(server_url: &str) -> Result<Self, GatewayError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let http = Client::builder().timeout(timeout).build()?;
        Self::with_client(http, server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(server_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(format!(
                "'{server_url}' cannot be used as a base url"
            )));
        }
        // Relative joins drop the last path segment unless it ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a server route below the base url, keeping any base path prefix.
    fn endpoint(&self, route: &str) -> Result<Url, GatewayError> {
        Ok(self.base_url.join(route.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl NotesGateway for HttpNotesGateway {
    async fn list(&self) -> Result<Vec<Note>, GatewayError> {
        let url = self.endpoint(NOTES_ROUTE)?;
        debug!(%url, "notes: GET list");
        let res = self.http.get(url).send().await?;
        let res = ensure_success(res).await?;
        Ok(res.json().await?)
    }

    async fn create(&self, title: &str, content: &str) -> Result<Note, GatewayError> {
        let url = self.endpoint(NOTES_ROUTE)?;
        debug!(%url, "notes: POST create");
        let res = self
            .http
            .post(url)
            .json(&CreateNoteRequest::new(title, content))
            .send()
            .await?;
        let res = ensure_success(res).await?;
        Ok(res.json().await?)
    }

    async fn remove(&self, note_id: NoteId) -> Result<(), GatewayError> {
        let url = self.endpoint(&note_route(note_id.0))?;
        debug!(%url, note_id = note_id.0, "notes: DELETE remove");
        let res = self.http.delete(url).send().await?;
        ensure_success(res).await?;
        Ok(())
    }
}

async fn ensure_success(res: Response) -> Result<Response, GatewayError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res
        .text()
        .await
        .map_err(|err| GatewayError::Transport(format!("failed to read error body: {err}")))?;
    match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => Err(GatewayError::Rejected(api_error)),
        Err(_) => Err(GatewayError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }),
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
