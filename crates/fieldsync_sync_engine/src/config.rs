//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use fieldsync_core::{Record, RecordId, Store};
use fieldsync_sync_protocol::ModuleSyncSpec;
use std::fmt;
use std::time::Duration;

/// Collection holding `{id, value}` configuration records.
pub const CONFIG_COLLECTION: &str = "config";

const VALUE_FIELD: &str = "value";

/// Where the remote document service lives.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    /// Base URL; documents are addressed as `<base_url>/<document_id>`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl RemoteEndpoint {
    /// Default base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.github.com/gists";

    /// Creates an endpoint for a base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            user_agent: format!("fieldsync/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Returns the URL of a document.
    #[must_use]
    pub fn document_url(&self, document_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), document_id)
    }
}

impl Default for RemoteEndpoint {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}

/// Remote document id and auth token of one module.
#[derive(Clone, PartialEq, Eq)]
pub struct SyncCredentials {
    /// Remote document id.
    pub document_id: String,
    /// Auth token.
    pub auth_token: String,
}

impl SyncCredentials {
    /// Creates credentials from trimmed values; `None` if either is empty.
    pub fn new(document_id: impl AsRef<str>, auth_token: impl AsRef<str>) -> Option<Self> {
        let document_id = document_id.as_ref().trim();
        let auth_token = auth_token.as_ref().trim();
        if document_id.is_empty() || auth_token.is_empty() {
            return None;
        }
        Some(Self {
            document_id: document_id.to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    /// Reads a module's credentials from the config collection.
    ///
    /// # Errors
    ///
    /// `ConfigMissing` if either value is absent or blank.
    pub fn load(store: &Store, spec: &ModuleSyncSpec) -> SyncResult<Self> {
        let document_id = read_value(store, &spec.remote_id_key)?;
        let auth_token = read_value(store, &spec.remote_token_key)?;

        document_id
            .zip(auth_token)
            .and_then(|(id, token)| Self::new(id, token))
            .ok_or_else(|| SyncError::ConfigMissing {
                module: spec.name.clone(),
            })
    }

    /// Writes a module's credentials to the config collection.
    pub fn save(&self, store: &Store, spec: &ModuleSyncSpec) -> SyncResult<()> {
        store.transaction(|txn| {
            txn.put(CONFIG_COLLECTION, config_record(&spec.remote_id_key, &self.document_id))?;
            txn.put(CONFIG_COLLECTION, config_record(&spec.remote_token_key, &self.auth_token))?;
            Ok(())
        })?;
        Ok(())
    }
}

impl fmt::Debug for SyncCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncCredentials")
            .field("document_id", &self.document_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

fn config_record(key: &str, value: &str) -> Record {
    Record::new().with("id", key).with(VALUE_FIELD, value)
}

fn read_value(store: &Store, key: &str) -> SyncResult<Option<String>> {
    let record = store.get_by_id(CONFIG_COLLECTION, &RecordId::from(key))?;
    Ok(record
        .and_then(|r| r.get(VALUE_FIELD).and_then(|v| v.as_str()).map(str::to_string)))
}
