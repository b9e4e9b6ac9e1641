//! Remote document client abstraction.

use crate::config::SyncCredentials;
use crate::error::{SyncError, SyncResult};
use fieldsync_sync_protocol::{DocumentUpdate, RemoteDocument};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// A client of the remote document service.
///
/// This trait abstracts the network layer so the orchestrator runs the
/// same against the HTTP service and against [`MemoryRemote`].
pub trait RemoteDocumentClient: Send + Sync {
    /// Fetches a whole document.
    ///
    /// Fails with `NotFound` for a missing document and
    /// `RemoteUnreachable` for any other failure.
    fn fetch(&self, credentials: &SyncCredentials) -> impl Future<Output = SyncResult<RemoteDocument>> + Send;

    /// Overwrites the files named by `update`.
    ///
    /// Fails with `UploadFailed`.
    fn update(
        &self,
        credentials: &SyncCredentials,
        update: &DocumentUpdate,
    ) -> impl Future<Output = SyncResult<()>> + Send;
}

/// An in-memory remote for tests and offline demos.
///
/// Documents are keyed by id. Failures are injected per operation as HTTP
/// statuses, and every accepted upload is recorded.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    documents: Mutex<HashMap<String, RemoteDocument>>,
    required_token: Mutex<Option<String>>,
    fetch_status: Mutex<Option<u16>>,
    update_status: Mutex<Option<u16>>,
    delay: Mutex<Option<Duration>>,
    uploads: Mutex<Vec<(String, DocumentUpdate)>>,
    fetches: Mutex<usize>,
}

impl MemoryRemote {
    /// Creates an empty remote.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a document.
    pub fn insert(&self, document_id: impl Into<String>, document: RemoteDocument) {
        self.documents.lock().insert(document_id.into(), document);
    }

    /// Returns a copy of a document.
    #[must_use]
    pub fn document(&self, document_id: &str) -> Option<RemoteDocument> {
        self.documents.lock().get(document_id).cloned()
    }

    /// Rejects requests whose token differs, with HTTP 401.
    pub fn require_token(&self, token: impl Into<String>) {
        *self.required_token.lock() = Some(token.into());
    }

    /// Makes every fetch fail with `status`; `None` restores success.
    pub fn fail_fetches(&self, status: Option<u16>) {
        *self.fetch_status.lock() = status;
    }

    /// Makes every update fail with `status`; `None` restores success.
    pub fn fail_updates(&self, status: Option<u16>) {
        *self.update_status.lock() = status;
    }

    /// Delays every request.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock() = delay;
    }

    /// Returns every accepted upload, oldest first.
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, DocumentUpdate)> {
        self.uploads.lock().clone()
    }

    /// Returns the number of fetches served or rejected.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock()
    }

    async fn pause(&self) {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn authorized(&self, credentials: &SyncCredentials) -> bool {
        match self.required_token.lock().as_deref() {
            Some(token) => token == credentials.auth_token,
            None => true,
        }
    }
}

impl RemoteDocumentClient for MemoryRemote {
    async fn fetch(&self, credentials: &SyncCredentials) -> SyncResult<RemoteDocument> {
        self.pause().await;
        *self.fetches.lock() += 1;

        if let Some(status) = *self.fetch_status.lock() {
            return Err(status_error(status, &credentials.document_id));
        }
        if !self.authorized(credentials) {
            return Err(SyncError::unreachable(Some(401), "Bad credentials"));
        }
        self.documents
            .lock()
            .get(&credentials.document_id)
            .cloned()
            .ok_or_else(|| SyncError::NotFound {
                document_id: credentials.document_id.clone(),
            })
    }

    async fn update(&self, credentials: &SyncCredentials, update: &DocumentUpdate) -> SyncResult<()> {
        self.pause().await;

        if let Some(status) = *self.update_status.lock() {
            return Err(SyncError::UploadFailed {
                status: Some(status),
                message: "rejected by memory remote".into(),
            });
        }
        if !self.authorized(credentials) {
            return Err(SyncError::UploadFailed {
                status: Some(401),
                message: "Bad credentials".into(),
            });
        }

        let mut documents = self.documents.lock();
        let Some(document) = documents.get_mut(&credentials.document_id) else {
            return Err(SyncError::UploadFailed {
                status: Some(404),
                message: "Not Found".into(),
            });
        };
        document.apply(update);
        self.uploads
            .lock()
            .push((credentials.document_id.clone(), update.clone()));
        Ok(())
    }
}

/// Maps a non-2xx fetch status to an error.
pub(crate) fn status_error(status: u16, document_id: &str) -> SyncError {
    if status == 404 {
        SyncError::NotFound {
            document_id: document_id.to_string(),
        }
    } else {
        SyncError::unreachable(Some(status), format!("HTTP {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> SyncCredentials {
        SyncCredentials::new("doc", "tok").unwrap()
    }

    #[tokio::test]
    async fn fetch_missing_document_is_not_found() {
        let remote = MemoryRemote::new();
        let err = remote.fetch(&creds()).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
        assert_eq!(remote.fetch_count(), 1);
    }

    #[tokio::test]
    async fn injected_status_maps_to_errors() {
        let remote = MemoryRemote::new();
        remote.insert("doc", RemoteDocument::new());

        remote.fail_fetches(Some(404));
        assert!(matches!(remote.fetch(&creds()).await, Err(SyncError::NotFound { .. })));

        remote.fail_fetches(Some(503));
        let err = remote.fetch(&creds()).await.unwrap_err();
        assert_eq!(err.status(), Some(503));

        remote.fail_fetches(None);
        assert!(remote.fetch(&creds()).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let remote = MemoryRemote::new();
        remote.insert("doc", RemoteDocument::new());
        remote.require_token("other");

        let err = remote.fetch(&creds()).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn update_records_upload() {
        let remote = MemoryRemote::new();
        remote.insert("doc", RemoteDocument::new().with_file("keep.txt", "x"));

        let update = DocumentUpdate::single("desc", "sales_data.json", "{}");
        remote.update(&creds(), &update).await.unwrap();

        let doc = remote.document("doc").unwrap();
        assert_eq!(doc.content("sales_data.json"), Some("{}"));
        assert_eq!(doc.content("keep.txt"), Some("x"));
        assert_eq!(remote.uploads().len(), 1);

        remote.fail_updates(Some(500));
        let err = remote.update(&creds(), &update).await.unwrap_err();
        assert!(matches!(err, SyncError::UploadFailed { status: Some(500), .. }));
        assert_eq!(remote.uploads().len(), 1);
    }
}
