//! Error types for the sync engine.

use fieldsync_core::CoreError;
use fieldsync_sync_protocol::ProtocolError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Remote document id or token is not configured.
    #[error("sync is not configured for module '{module}'")]
    ConfigMissing {
        /// Module name.
        module: String,
    },

    /// The remote service could not be reached or answered non-2xx.
    #[error("remote unreachable (status {status:?}): {message}")]
    RemoteUnreachable {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Error detail.
        message: String,
    },

    /// The remote document does not exist.
    #[error("remote document '{document_id}' not found")]
    NotFound {
        /// Requested document id.
        document_id: String,
    },

    /// The remote service rejected the upload.
    #[error("upload failed (status {status:?}): {message}")]
    UploadFailed {
        /// HTTP status, if a response was received.
        status: Option<u16>,
        /// Error detail.
        message: String,
    },

    /// Remote content cannot replace local data.
    #[error("invalid remote data: {0}")]
    InvalidRemoteData(String),

    /// Another sync holds the module's lock.
    #[error("sync already in progress for '{module}' ({running})")]
    SyncInProgress {
        /// Module that was requested.
        module: String,
        /// Description of the running sync.
        running: String,
    },

    /// Local store error.
    #[error("store error: {0}")]
    Store(#[from] CoreError),

    /// Snapshot encoding error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl SyncError {
    /// Creates a non-2xx fetch error.
    pub fn unreachable(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteUnreachable {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::RemoteUnreachable { status, .. } | SyncError::UploadFailed { status, .. } => *status,
            SyncError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Renders the short notification shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SyncError::ConfigMissing { module } => {
                format!("Configure the remote document id and token for {module} first.")
            }
            SyncError::RemoteUnreachable {
                status: Some(status),
                ..
            } => format!("Could not read the remote document (HTTP {status})."),
            SyncError::RemoteUnreachable { status: None, message } => {
                format!("Could not reach the remote service: {message}")
            }
            SyncError::NotFound { .. } => {
                "Remote document not found or token invalid (HTTP 404).".to_string()
            }
            SyncError::UploadFailed {
                status: Some(status),
                ..
            } => format!("Upload failed (HTTP {status})."),
            SyncError::UploadFailed { status: None, message } => format!("Upload failed: {message}"),
            SyncError::InvalidRemoteData(message) => {
                format!("Remote data is invalid, local data was not changed: {message}")
            }
            SyncError::SyncInProgress { running, .. } => {
                format!("A {running} is already running, try again when it finishes.")
            }
            SyncError::Store(err) if err.is_constraint_violation() => {
                format!("Duplicate record rejected: {err}")
            }
            SyncError::Store(err) => format!("Local store error: {err}"),
            SyncError::Protocol(err) => format!("Could not prepare the upload: {err}"),
        }
    }
}
