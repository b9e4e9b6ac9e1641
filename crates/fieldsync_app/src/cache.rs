//! Memoized promoter lookups.

use crate::error::AppResult;
use crate::model::Promoter;
use fieldsync_core::{Store, TypedCollection};
use parking_lot::Mutex;
use std::sync::Arc;

/// Promoter list cached until the store changes.
///
/// The cache is keyed on [`Store::revision`], so any commit, including a
/// pull, invalidates it.
#[derive(Default)]
pub struct PromoterDirectory {
    cached: Mutex<Option<(u64, Arc<Vec<Promoter>>)>>,
}

impl PromoterDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every promoter, reloading only after a store change.
    pub fn promoters(&self, store: &Store) -> AppResult<Arc<Vec<Promoter>>> {
        let revision = store.revision();
        let mut cached = self.cached.lock();
        if let Some((at, promoters)) = cached.as_ref() {
            if *at == revision {
                return Ok(Arc::clone(promoters));
            }
        }

        let promoters = Arc::new(TypedCollection::<Promoter>::new(store).all()?);
        tracing::trace!(revision, count = promoters.len(), "promoter directory reloaded");
        *cached = Some((revision, Arc::clone(&promoters)));
        Ok(promoters)
    }

    /// Returns a promoter's name.
    pub fn name_of(&self, store: &Store, id: i64) -> AppResult<Option<String>> {
        Ok(self
            .promoters(store)?
            .iter()
            .find(|p| p.id == Some(id))
            .map(|p| p.name.clone()))
    }

    /// Drops the cached list.
    pub fn invalidate(&self) {
        *self.cached.lock() = None;
    }
}
