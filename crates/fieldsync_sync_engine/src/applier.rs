//! Replace engine.
//!
//! Pull never merges: the remote arrays overwrite the local collections.
//! Id handling belongs to the store schema: auto-increment collections get
//! fresh sequential ids in remote order, explicit-key collections keep the
//! ids they arrive with.

use crate::error::SyncResult;
use fieldsync_core::{Record, Store, Transaction};
use fieldsync_sync_protocol::{ModuleSyncSpec, Snapshot, SyncedCollection};

/// Number of records written into one collection by a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacedCollection {
    /// Local collection name.
    pub collection: String,
    /// Snapshot key the records came from.
    pub snapshot_key: String,
    /// Records written.
    pub replaced: usize,
}

/// Applies remote data to a [`Store`] by replacement.
///
/// # Example
///
/// ```ignore
/// let replacer = ReplaceEngine::new(&store);
/// replacer.replace_local(&collection, remote_records)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ReplaceEngine<'s> {
    store: &'s Store,
}

impl<'s> ReplaceEngine<'s> {
    /// Creates a replace engine over a store.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Replaces one collection atomically. Returns the number of records written.
    pub fn replace_local(&self, collection: &SyncedCollection, records: Vec<Record>) -> SyncResult<usize> {
        Ok(self.store.transaction(|txn| replace_in(txn, collection, records))?)
    }

    /// Replaces every collection of a module in one transaction.
    ///
    /// Either all collections take the snapshot content or none changes.
    pub fn replace_module(&self, spec: &ModuleSyncSpec, mut snapshot: Snapshot) -> SyncResult<Vec<ReplacedCollection>> {
        let replaced = self.store.transaction(|txn| {
            let mut replaced = Vec::with_capacity(spec.collections.len());
            for collection in &spec.collections {
                let records = snapshot.take(&collection.snapshot_key);
                let count = replace_in(txn, collection, records)?;
                replaced.push(ReplacedCollection {
                    collection: collection.store.clone(),
                    snapshot_key: collection.snapshot_key.clone(),
                    replaced: count,
                });
            }
            Ok(replaced)
        })?;

        for entry in &replaced {
            tracing::debug!(
                collection = %entry.collection,
                records = entry.replaced,
                "collection replaced"
            );
        }
        Ok(replaced)
    }
}

fn replace_in(
    txn: &mut Transaction<'_>,
    collection: &SyncedCollection,
    records: Vec<Record>,
) -> fieldsync_core::CoreResult<usize> {
    txn.replace_all(&collection.store, records)
}
