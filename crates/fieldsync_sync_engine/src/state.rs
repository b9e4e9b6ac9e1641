//! Sync engine state machine.

use crate::applier::{ReplaceEngine, ReplacedCollection};
use crate::config::SyncCredentials;
use crate::error::{SyncError, SyncResult};
use crate::transport::RemoteDocumentClient;
use chrono::{DateTime, Utc};
use fieldsync_core::{CoreError, Record, Store};
use fieldsync_sync_protocol::{
    merge_with_stats, DocumentUpdate, LenientParse, MergeStats, ModuleSyncSpec, Snapshot,
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;

/// Direction of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncDirection {
    /// Merge local into remote and upload.
    Push,
    /// Replace local with remote.
    Pull,
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDirection::Push => f.write_str("push"),
            SyncDirection::Pull => f.write_str("pull"),
        }
    }
}

/// The current state of a sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No sync has run yet.
    Idle,
    /// A push is in flight.
    Pushing,
    /// A pull is in flight.
    Pulling,
    /// The last sync succeeded.
    Synced,
    /// The last sync failed.
    Error,
}

impl SyncState {
    /// Returns true if a sync is in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, SyncState::Pushing | SyncState::Pulling)
    }
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Successful pushes.
    pub pushes_completed: u64,
    /// Successful pulls.
    pub pulls_completed: u64,
    /// Failed syncs.
    pub failures: u64,
    /// User message of the last failure.
    pub last_error: Option<String>,
    /// Time of the last successful sync.
    pub last_sync_time: Option<DateTime<Utc>>,
}

/// Result of one collection in a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPush {
    /// Snapshot key.
    pub snapshot_key: String,
    /// Merge counters.
    pub stats: MergeStats,
}

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    /// Module name.
    pub module: String,
    /// Per-collection merge results, in module order.
    pub collections: Vec<CollectionPush>,
    /// True if remote content was unreadable and treated as empty.
    pub remote_unreadable: bool,
    /// True if the remote document had no file for the module yet.
    pub remote_file_missing: bool,
    /// Snapshot keys that were absent remotely and treated as empty.
    pub defaulted_keys: Vec<String>,
}

impl PushReport {
    /// Total records uploaded.
    #[must_use]
    pub fn uploaded(&self) -> usize {
        self.collections.iter().map(|c| c.stats.merged).sum()
    }

    /// Total records left out of the upload for lacking a usable id.
    ///
    /// Only integer and string ids identify a record; anything else is
    /// dropped by the merge and disappears from the remote document.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.collections.iter().map(|c| c.stats.dropped).sum()
    }
}

/// Result of a successful pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// Module name.
    pub module: String,
    /// Per-collection replacement counts, in module order.
    pub collections: Vec<ReplacedCollection>,
    /// Upload timestamp carried by the remote snapshot.
    pub remote_timestamp: Option<i64>,
}

impl PullReport {
    /// Total records written locally.
    #[must_use]
    pub fn replaced(&self) -> usize {
        self.collections.iter().map(|c| c.replaced).sum()
    }
}

#[derive(Debug, Clone)]
struct Running {
    module: String,
    direction: SyncDirection,
}

/// Mutual exclusion token for syncs.
///
/// Clones share the token. While one sync holds it, any other request
/// fails with `SyncInProgress` instead of waiting.
#[derive(Debug, Clone, Default)]
pub struct SyncLock {
    running: Arc<Mutex<Option<Running>>>,
}

impl SyncLock {
    /// Creates a free lock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lock for `module`, or reports who holds it.
    pub fn try_acquire(&self, module: &str, direction: SyncDirection) -> SyncResult<SyncGuard> {
        let mut running = self.running.lock();
        if let Some(current) = running.as_ref() {
            return Err(SyncError::SyncInProgress {
                module: module.to_string(),
                running: format!("{} {}", current.module, current.direction),
            });
        }
        *running = Some(Running {
            module: module.to_string(),
            direction,
        });
        Ok(SyncGuard {
            running: Arc::clone(&self.running),
        })
    }

    /// Returns true if a sync holds the lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.running.lock().is_some()
    }
}

/// Releases its [`SyncLock`] on drop.
#[derive(Debug)]
pub struct SyncGuard {
    running: Arc<Mutex<Option<Running>>>,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.running.lock().take();
    }
}

/// Push and pull of one module against one remote document.
pub struct SyncEngine<C: RemoteDocumentClient> {
    store: Arc<Store>,
    spec: ModuleSyncSpec,
    client: Arc<C>,
    lock: SyncLock,
    state: RwLock<SyncState>,
    stats: RwLock<SyncStats>,
}

impl<C: RemoteDocumentClient> SyncEngine<C> {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// `Store(CollectionNotFound)` if a synced collection is not part of
    /// the store schema.
    pub fn new(store: Arc<Store>, spec: ModuleSyncSpec, client: Arc<C>) -> SyncResult<Self> {
        for collection in &spec.collections {
            if store.schema().collection(&collection.store).is_none() {
                return Err(CoreError::collection_not_found(collection.store.clone()).into());
            }
        }
        Ok(Self {
            store,
            spec,
            client,
            lock: SyncLock::new(),
            state: RwLock::new(SyncState::Idle),
            stats: RwLock::new(SyncStats::default()),
        })
    }

    /// Shares a lock with other engines.
    #[must_use]
    pub fn with_lock(mut self, lock: SyncLock) -> Self {
        self.lock = lock;
        self
    }

    /// Returns the module description.
    #[must_use]
    pub fn spec(&self) -> &ModuleSyncSpec {
        &self.spec
    }

    /// Returns the module name.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.spec.name
    }

    /// Returns the lock guarding this engine.
    #[must_use]
    pub fn lock(&self) -> &SyncLock {
        &self.lock
    }

    /// Gets the current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        *self.state.read()
    }

    /// Gets the current stats.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs a sync in the given direction, discarding the report.
    pub async fn run(&self, direction: SyncDirection) -> SyncResult<()> {
        match direction {
            SyncDirection::Push => self.push().await.map(|_| ()),
            SyncDirection::Pull => self.pull().await.map(|_| ()),
        }
    }

    /// Merges local data into the remote snapshot and uploads it.
    ///
    /// Local data is never modified.
    pub async fn push(&self) -> SyncResult<PushReport> {
        let _guard = self.lock.try_acquire(&self.spec.name, SyncDirection::Push)?;
        self.set_state(SyncState::Pushing);
        tracing::info!(module = %self.spec.name, "push started");

        let result = self.run_push().await;
        self.finish(SyncDirection::Push, result.as_ref().map(|_| ()));
        result
    }

    /// Replaces local data with the remote snapshot.
    ///
    /// Nothing local changes unless the remote content is complete.
    pub async fn pull(&self) -> SyncResult<PullReport> {
        let _guard = self.lock.try_acquire(&self.spec.name, SyncDirection::Pull)?;
        self.set_state(SyncState::Pulling);
        tracing::info!(module = %self.spec.name, "pull started");

        let result = self.run_pull().await;
        self.finish(SyncDirection::Pull, result.as_ref().map(|_| ()));
        result
    }

    async fn run_push(&self) -> SyncResult<PushReport> {
        let credentials = SyncCredentials::load(&self.store, &self.spec)?;
        let local = self.read_local()?;

        let document = self.client.fetch(&credentials).await?;
        let remote_file_missing = document.content(&self.spec.file_name).is_none();
        let remote = match document.content(&self.spec.file_name) {
            Some(content) => {
                let parsed = Snapshot::parse_lenient(content, &self.spec);
                if parsed.unreadable {
                    tracing::warn!(
                        module = %self.spec.name,
                        file = %self.spec.file_name,
                        "remote content unreadable, treating as empty"
                    );
                }
                parsed
            }
            None => {
                tracing::debug!(file = %self.spec.file_name, "remote file absent, treating as empty");
                LenientParse {
                    snapshot: Snapshot::empty(&self.spec),
                    unreadable: false,
                    defaulted: self.spec.snapshot_keys().map(str::to_string).collect(),
                }
            }
        };

        let mut merged = Snapshot::default();
        let mut collections = Vec::with_capacity(self.spec.collections.len());
        for (collection, records) in self.spec.collections.iter().zip(local) {
            let (result, stats) = merge_with_stats(remote.snapshot.records(&collection.snapshot_key), &records);
            tracing::debug!(
                key = %collection.snapshot_key,
                remote = stats.remote,
                local = stats.local,
                merged = stats.merged,
                overwritten = stats.overwritten,
                dropped = stats.dropped,
                "collection merged"
            );
            if stats.dropped > 0 {
                tracing::warn!(
                    module = %self.spec.name,
                    key = %collection.snapshot_key,
                    dropped = stats.dropped,
                    "records without a usable id left out of the upload"
                );
            }
            merged.insert(collection.snapshot_key.clone(), result);
            collections.push(CollectionPush {
                snapshot_key: collection.snapshot_key.clone(),
                stats,
            });
        }
        if self.spec.stamp_uploads {
            merged = merged.with_timestamp(Utc::now().timestamp_millis());
        }

        let update = DocumentUpdate::single(&self.spec.description, &self.spec.file_name, merged.to_content()?);
        self.client.update(&credentials, &update).await?;

        Ok(PushReport {
            module: self.spec.name.clone(),
            collections,
            remote_unreadable: remote.unreadable,
            remote_file_missing,
            defaulted_keys: remote.defaulted,
        })
    }

    async fn run_pull(&self) -> SyncResult<PullReport> {
        let credentials = SyncCredentials::load(&self.store, &self.spec)?;
        let document = self.client.fetch(&credentials).await?;

        let content = document.content(&self.spec.file_name).ok_or_else(|| {
            SyncError::InvalidRemoteData(format!("remote document has no '{}' file", self.spec.file_name))
        })?;
        let snapshot = Snapshot::parse_strict(content, &self.spec)
            .map_err(|e| SyncError::InvalidRemoteData(e.to_string()))?;
        let remote_timestamp = snapshot.timestamp();

        let collections = ReplaceEngine::new(&self.store).replace_module(&self.spec, snapshot)?;

        Ok(PullReport {
            module: self.spec.name.clone(),
            collections,
            remote_timestamp,
        })
    }

    fn read_local(&self) -> SyncResult<Vec<Vec<Record>>> {
        self.spec
            .collections
            .iter()
            .map(|c| self.store.get_all(&c.store).map_err(SyncError::from))
            .collect()
    }

    fn set_state(&self, state: SyncState) {
        *self.state.write() = state;
    }

    fn finish(&self, direction: SyncDirection, result: Result<(), &SyncError>) {
        let mut stats = self.stats.write();
        match result {
            Ok(()) => {
                match direction {
                    SyncDirection::Push => stats.pushes_completed += 1,
                    SyncDirection::Pull => stats.pulls_completed += 1,
                }
                stats.last_sync_time = Some(Utc::now());
                stats.last_error = None;
                self.set_state(SyncState::Synced);
                tracing::info!(module = %self.spec.name, %direction, "sync completed");
            }
            Err(err) => {
                stats.failures += 1;
                stats.last_error = Some(err.user_message());
                self.set_state(SyncState::Error);
                tracing::warn!(module = %self.spec.name, %direction, error = %err, "sync failed");
            }
        }
    }
}
