//! Per-module sync descriptions.

use fieldsync_core::Record;
use std::fmt;
use std::sync::Arc;

/// Check run on every pulled record before anything local is replaced.
///
/// Returns a short reason when the record is unusable.
#[derive(Clone)]
pub struct RecordValidator(Arc<dyn Fn(&Record) -> Result<(), String> + Send + Sync>);

impl RecordValidator {
    /// Wraps a check function.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Runs the check.
    pub fn check(&self, record: &Record) -> Result<(), String> {
        (self.0)(record)
    }
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordValidator(..)")
    }
}

impl PartialEq for RecordValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RecordValidator {}

/// One local collection taking part in a module's sync.
///
/// Whether pulled ids are kept or renumbered is decided by the store
/// schema of the local collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedCollection {
    /// Local collection name.
    pub store: String,
    /// Key of the array in the remote snapshot.
    pub snapshot_key: String,
    /// Shape check for pulled records.
    pub validator: Option<RecordValidator>,
}

impl SyncedCollection {
    /// Creates a synced collection whose snapshot key differs from its name.
    pub fn new(store: impl Into<String>, snapshot_key: impl Into<String>) -> Self {
        Self {
            store: store.into(),
            snapshot_key: snapshot_key.into(),
            validator: None,
        }
    }

    /// Creates a synced collection stored under its own name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name)
    }

    /// Sets the check applied to pulled records.
    #[must_use]
    pub fn validated_by(mut self, validator: RecordValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Runs the validator, if any, on a pulled record.
    pub fn check(&self, record: &Record) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator.check(record),
            None => Ok(()),
        }
    }
}

/// Everything the orchestrator needs to know about one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSyncSpec {
    /// Module name, e.g. `sales`.
    pub name: String,
    /// File holding the snapshot inside the remote document.
    pub file_name: String,
    /// Description written with every upload.
    pub description: String,
    /// Config key of the remote document id.
    pub remote_id_key: String,
    /// Config key of the auth token.
    pub remote_token_key: String,
    /// Whether uploads carry a `timestamp` field.
    pub stamp_uploads: bool,
    /// Synced collections, in snapshot order.
    pub collections: Vec<SyncedCollection>,
}

impl ModuleSyncSpec {
    /// Creates a module with the conventional file and config key names.
    ///
    /// A module named `sales` uses `sales_data.json`, `sales.remoteId` and
    /// `sales.remoteToken`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file_name: format!("{name}_data.json"),
            description: format!("fieldsync {name} data"),
            remote_id_key: format!("{name}.remoteId"),
            remote_token_key: format!("{name}.remoteToken"),
            stamp_uploads: false,
            collections: Vec::new(),
            name,
        }
    }

    /// Sets the remote file name.
    #[must_use]
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Sets the upload description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Enables the upload timestamp.
    #[must_use]
    pub fn stamped(mut self) -> Self {
        self.stamp_uploads = true;
        self
    }

    /// Adds a synced collection.
    #[must_use]
    pub fn with_collection(mut self, collection: SyncedCollection) -> Self {
        self.collections.push(collection);
        self
    }

    /// Returns the snapshot keys in order.
    pub fn snapshot_keys(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.snapshot_key.as_str())
    }

    /// Returns the collection synced under a snapshot key.
    #[must_use]
    pub fn by_snapshot_key(&self, key: &str) -> Option<&SyncedCollection> {
        self.collections.iter().find(|c| c.snapshot_key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_names() {
        let spec = ModuleSyncSpec::new("sales");
        assert_eq!(spec.file_name, "sales_data.json");
        assert_eq!(spec.remote_id_key, "sales.remoteId");
        assert_eq!(spec.remote_token_key, "sales.remoteToken");
        assert!(!spec.stamp_uploads);
    }

    #[test]
    fn snapshot_key_lookup() {
        let spec = ModuleSyncSpec::new("attendance")
            .with_collection(SyncedCollection::new("promoters", "users"))
            .with_collection(SyncedCollection::named("evidences"));

        let keys: Vec<_> = spec.snapshot_keys().collect();
        assert_eq!(keys, vec!["users", "evidences"]);

        let users = spec.by_snapshot_key("users").unwrap();
        assert_eq!(users.store, "promoters");
        assert!(spec.by_snapshot_key("promoters").is_none());
    }
}
