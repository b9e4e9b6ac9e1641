//! HTTP client for the remote document service.
//!
//! Speaks the gist flavour of the API: `GET <base>/<id>` returns the
//! document with a `files` map, `PATCH <base>/<id>` overwrites the named
//! files. Requests authenticate with `Authorization: token <token>`.

use crate::config::{RemoteEndpoint, SyncCredentials};
use crate::error::{SyncError, SyncResult};
use crate::transport::{status_error, RemoteDocumentClient};
use fieldsync_sync_protocol::{DocumentUpdate, RemoteDocument};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

const ACCEPT_VALUE: &str = "application/vnd.github.v3+json";
const MAX_ERROR_BODY: usize = 300;

/// `reqwest`-backed [`RemoteDocumentClient`].
#[derive(Debug, Clone)]
pub struct GistClient {
    endpoint: RemoteEndpoint,
    client: reqwest::Client,
}

impl GistClient {
    /// Creates a client for an endpoint.
    pub fn new(endpoint: RemoteEndpoint) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .user_agent(endpoint.user_agent.clone())
            .build()
            .map_err(|e| SyncError::unreachable(None, format!("cannot build HTTP client: {e}")))?;
        Ok(Self { endpoint, client })
    }

    /// Returns the endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    fn headers(credentials: &SyncCredentials) -> SyncResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&format!("token {}", credentials.auth_token))
            .map_err(|_| SyncError::unreachable(None, "auth token contains invalid characters"))?;
        headers.insert(AUTHORIZATION, token);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        Ok(headers)
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection error: {err}")
    } else {
        err.to_string()
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

impl RemoteDocumentClient for GistClient {
    async fn fetch(&self, credentials: &SyncCredentials) -> SyncResult<RemoteDocument> {
        let url = self.endpoint.document_url(&credentials.document_id);
        tracing::debug!(%url, "fetching remote document");

        let response = self
            .client
            .get(&url)
            .headers(Self::headers(credentials)?)
            .send()
            .await
            .map_err(|e| SyncError::unreachable(None, describe(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %truncate(body), "fetch rejected");
            return Err(status_error(status.as_u16(), &credentials.document_id));
        }

        let text = response
            .text()
            .await
            .map_err(|e| SyncError::unreachable(Some(status.as_u16()), describe(&e)))?;
        serde_json::from_str(&text)
            .map_err(|e| SyncError::InvalidRemoteData(format!("unreadable remote document: {e}")))
    }

    async fn update(&self, credentials: &SyncCredentials, update: &DocumentUpdate) -> SyncResult<()> {
        let url = self.endpoint.document_url(&credentials.document_id);
        tracing::debug!(%url, files = update.files.len(), "uploading remote document");

        let response = self
            .client
            .patch(&url)
            .headers(Self::headers(credentials)?)
            .json(update)
            .send()
            .await
            .map_err(|e| SyncError::UploadFailed {
                status: None,
                message: describe(&e),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SyncError::UploadFailed {
            status: Some(status.as_u16()),
            message: truncate(body),
        })
    }
}
