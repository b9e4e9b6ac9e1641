//! Store facade.

use crate::collection::{CollectionData, Schema};
use crate::config::StoreConfig;
use crate::dir::StoreDir;
use crate::error::{CoreError, CoreResult};
use crate::image;
use crate::migration::{self, MigrationReport};
use crate::record::{Record, RecordId};
use crate::transaction::Transaction;
use fieldsync_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

struct StoreState {
    schema_version: u32,
    collections: BTreeMap<String, CollectionData>,
    revision: u64,
}

/// The local record store.
///
/// A `Store` holds every collection named by its [`Schema`] in memory and
/// writes a full image through its storage backend after each committed
/// transaction. Reads never block on a persist in progress for longer
/// than the swap of the committed state.
///
/// # Opening
///
/// ```rust,ignore
/// use fieldsync_core::{CollectionSchema, Schema, Store, StoreConfig};
///
/// let schema = Schema::new(1).with_collection(CollectionSchema::auto_increment("sales"));
/// let store = Store::open(Path::new("data"), schema, StoreConfig::default())?;
///
/// store.transaction(|txn| {
///     txn.put("sales", Record::new().with("quantity", 3))?;
///     Ok(())
/// })?;
/// ```
pub struct Store {
    config: StoreConfig,
    schema: Schema,
    /// Holds the directory lock. None for in-memory stores.
    dir: Mutex<Option<StoreDir>>,
    backend: Mutex<Box<dyn StorageBackend>>,
    state: RwLock<StoreState>,
    upgrade: MigrationReport,
    is_open: RwLock<bool>,
}

impl Store {
    /// Opens or creates a store in a directory.
    ///
    /// # Errors
    ///
    /// - `DatabaseLocked` if another handle holds the directory
    /// - `InvalidFormat` if the image is unreadable or newer than `schema`
    pub fn open(path: &Path, schema: Schema, config: StoreConfig) -> CoreResult<Self> {
        let dir = StoreDir::open(path, config.create_if_missing)?;
        let backend = FileBackend::open(&dir.image_path())?.sync_on_write(config.sync_on_commit);
        Self::open_inner(Box::new(backend), schema, config, Some(dir))
    }

    /// Opens an empty store that lives only in memory.
    pub fn open_in_memory(schema: Schema) -> CoreResult<Self> {
        Self::open_with_backend(InMemoryBackend::new(), schema, StoreConfig::default())
    }

    /// Opens a store over an arbitrary storage backend.
    pub fn open_with_backend<B>(backend: B, schema: Schema, config: StoreConfig) -> CoreResult<Self>
    where
        B: StorageBackend + 'static,
    {
        Self::open_inner(Box::new(backend), schema, config, None)
    }

    fn open_inner(
        mut backend: Box<dyn StorageBackend>,
        schema: Schema,
        config: StoreConfig,
        dir: Option<StoreDir>,
    ) -> CoreResult<Self> {
        let (persisted_version, mut collections) = match backend.load()? {
            Some(bytes) => image::decode(&bytes)?,
            None => (schema.version, BTreeMap::new()),
        };

        let upgrade = migration::upgrade(persisted_version, &mut collections, &schema)?;
        if !upgrade.is_noop() {
            let bytes = image::encode(
                schema.version,
                collections.iter().map(|(name, data)| (name.as_str(), data)),
            )?;
            backend.store(&bytes)?;
            tracing::info!(
                from = upgrade.from_version,
                to = upgrade.to_version,
                created = ?upgrade.created,
                "store schema upgraded"
            );
        }

        tracing::debug!(
            collections = collections.len(),
            version = schema.version,
            "store opened"
        );

        Ok(Self {
            config,
            state: RwLock::new(StoreState {
                schema_version: schema.version,
                collections,
                revision: 0,
            }),
            schema,
            dir: Mutex::new(dir),
            backend: Mutex::new(backend),
            upgrade,
            is_open: RwLock::new(true),
        })
    }

    /// Runs `f` inside a transaction.
    ///
    /// If `f` returns `Ok`, every staged change is persisted in one image
    /// write and then made visible. If `f` returns `Err`, or the write
    /// fails, nothing changes.
    ///
    /// `f` must not call back into the store; use the transaction handle.
    pub fn transaction<F, T>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Transaction<'_>) -> CoreResult<T>,
    {
        self.ensure_open()?;
        let mut state = self.state.write();

        let (value, staged) = {
            let mut txn = Transaction::new(&self.schema, &state.collections);
            let value = f(&mut txn)?;
            (value, txn.into_staged())
        };

        if staged.is_empty() {
            return Ok(value);
        }

        let bytes = {
            let overlay = state
                .collections
                .iter()
                .map(|(name, data)| (name.as_str(), staged.get(name).unwrap_or(data)));
            image::encode(state.schema_version, overlay)?
        };

        if let Err(err) = self.persist(&bytes) {
            tracing::warn!(error = %err, "commit failed, changes discarded");
            return Err(err);
        }

        let touched = staged.len();
        state.collections.extend(staged);
        state.revision += 1;
        tracing::trace!(revision = state.revision, touched, "transaction committed");
        Ok(value)
    }

    fn persist(&self, bytes: &[u8]) -> CoreResult<()> {
        let mut backend = self.backend.lock();
        backend.store(bytes)?;
        if self.config.sync_on_commit {
            backend.sync()?;
        }
        Ok(())
    }

    fn read<T>(&self, collection: &str, f: impl FnOnce(&CollectionData) -> T) -> CoreResult<T> {
        self.ensure_open()?;
        if self.schema.collection(collection).is_none() {
            return Err(CoreError::collection_not_found(collection));
        }
        let state = self.state.read();
        let data = state
            .collections
            .get(collection)
            .ok_or_else(|| CoreError::collection_not_found(collection))?;
        Ok(f(data))
    }

    /// Returns every record of a collection, ordered by id.
    pub fn get_all(&self, collection: &str) -> CoreResult<Vec<Record>> {
        self.read(collection, |data| data.records().cloned().collect())
    }

    /// Returns the record stored under `id`.
    pub fn get_by_id(&self, collection: &str, id: &RecordId) -> CoreResult<Option<Record>> {
        self.read(collection, |data| data.get(id).cloned())
    }

    /// Inserts or replaces a single record.
    pub fn put(&self, collection: &str, record: Record) -> CoreResult<RecordId> {
        self.transaction(|txn| txn.put(collection, record))
    }

    /// Removes a single record.
    pub fn remove(&self, collection: &str, id: &RecordId) -> CoreResult<()> {
        self.transaction(|txn| txn.remove(collection, id))
    }

    /// Replaces the content of one collection atomically.
    ///
    /// See [`Transaction::replace_all`] for id handling.
    pub fn replace_all(&self, collection: &str, records: Vec<Record>) -> CoreResult<usize> {
        self.transaction(|txn| txn.replace_all(collection, records))
    }

    /// Returns records whose index key equals `key`.
    pub fn find_by_index(&self, collection: &str, index: &str, key: &[Value]) -> CoreResult<Vec<Record>> {
        let spec = self
            .schema
            .collection(collection)
            .ok_or_else(|| CoreError::collection_not_found(collection))?
            .index(index)
            .ok_or_else(|| CoreError::IndexNotFound {
                collection: collection.to_string(),
                index: index.to_string(),
            })?;
        self.read(collection, |data| data.find(spec, key))
    }

    /// Returns the number of records in a collection.
    pub fn count(&self, collection: &str) -> CoreResult<usize> {
        self.read(collection, CollectionData::len)
    }

    /// Returns the collections declared by the schema, in declaration order.
    #[must_use]
    pub fn collection_names(&self) -> Vec<String> {
        self.schema.collections.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the schema the store was opened with.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the persisted schema version.
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.state.read().schema_version
    }

    /// Returns what happened to the schema when the store was opened.
    #[must_use]
    pub fn upgrade_report(&self) -> &MigrationReport {
        &self.upgrade
    }

    /// Returns a counter bumped by every committed transaction.
    ///
    /// Caches keyed on the revision are stale once it changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Closes the store and releases the directory lock.
    ///
    /// Every later operation fails with `StoreUnavailable`.
    pub fn close(&self) -> CoreResult<()> {
        let mut is_open = self.is_open.write();
        if !*is_open {
            return Ok(());
        }
        self.backend.lock().sync()?;
        self.dir.lock().take();
        *is_open = false;
        tracing::debug!("store closed");
        Ok(())
    }

    /// Checks if the store is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.is_open.read()
    }

    fn ensure_open(&self) -> CoreResult<()> {
        if *self.is_open.read() {
            Ok(())
        } else {
            Err(CoreError::StoreUnavailable)
        }
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("schema_version", &self.schema.version)
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{CollectionSchema, IndexSpec};

    fn schema() -> Schema {
        Schema::new(1)
            .with_collection(
                CollectionSchema::auto_increment("goals")
                    .with_index(IndexSpec::unique("goal_key", ["month", "branch", "product"])),
            )
            .with_collection(CollectionSchema::explicit("config"))
    }

    fn goal(month: i64, branch: &str) -> Record {
        Record::new()
            .with("month", month)
            .with("branch", branch)
            .with("product", "Plan A")
            .with("target", 10)
    }

    #[test]
    fn put_and_get() {
        let store = Store::open_in_memory(schema()).unwrap();
        let id = store.put("goals", goal(1, "Centro")).unwrap();
        assert_eq!(id, RecordId::Int(1));

        let found = store.get_by_id("goals", &id).unwrap().unwrap();
        assert_eq!(found.get("branch").unwrap(), "Centro");
    }

    #[test]
    fn failed_transaction_changes_nothing() {
        let store = Store::open_in_memory(schema()).unwrap();
        store.put("goals", goal(1, "Centro")).unwrap();

        let result: CoreResult<()> = store.transaction(|txn| {
            txn.put("goals", goal(2, "Norte"))?;
            txn.put("goals", goal(1, "Centro"))?;
            Ok(())
        });

        assert!(result.unwrap_err().is_constraint_violation());
        assert_eq!(store.count("goals").unwrap(), 1);
    }

    #[test]
    fn revision_advances_only_on_change() {
        let store = Store::open_in_memory(schema()).unwrap();
        assert_eq!(store.revision(), 0);

        store.put("goals", goal(1, "Centro")).unwrap();
        assert_eq!(store.revision(), 1);

        store.remove("goals", &RecordId::Int(99)).unwrap();
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn write_failure_rolls_back() {
        let backend = InMemoryBackend::new();
        let store = Store::open_with_backend(backend.clone(), schema(), StoreConfig::default()).unwrap();
        store.put("goals", goal(1, "Centro")).unwrap();

        backend.set_fail_writes(true);
        let result = store.replace_all("goals", vec![goal(2, "Sur"), goal(3, "Sur")]);
        assert!(result.is_err());

        let all = store.get_all("goals").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get("branch").unwrap(), "Centro");
    }

    #[test]
    fn find_by_index() {
        let store = Store::open_in_memory(schema()).unwrap();
        store.put("goals", goal(1, "Centro")).unwrap();
        store.put("goals", goal(2, "Centro")).unwrap();

        let key = [Value::from(2), Value::from("Centro"), Value::from("Plan A")];
        let found = store.find_by_index("goals", "goal_key", &key).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("month").unwrap(), 2);
    }

    #[test]
    fn closed_store_is_unavailable() {
        let store = Store::open_in_memory(schema()).unwrap();
        store.close().unwrap();

        assert!(!store.is_open());
        assert!(matches!(store.get_all("goals"), Err(CoreError::StoreUnavailable)));
        assert!(matches!(
            store.put("goals", goal(1, "Centro")),
            Err(CoreError::StoreUnavailable)
        ));
    }

    #[test]
    fn unknown_collection() {
        let store = Store::open_in_memory(schema()).unwrap();
        assert!(matches!(
            store.get_all("missing"),
            Err(CoreError::CollectionNotFound { .. })
        ));
    }
}
