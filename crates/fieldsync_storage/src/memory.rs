//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An in-memory storage backend.
///
/// This backend keeps the image in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// Clones share the same image, so a test can keep a handle after giving
/// the backend to a store and inspect (or sabotage) what was written.
///
/// # Example
///
/// ```rust
/// use fieldsync_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// let mut handle = backend.clone();
/// handle.store(b"image").unwrap();
/// assert_eq!(backend.data(), Some(b"image".to_vec()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    data: Arc<RwLock<Option<Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with a pre-existing image.
    ///
    /// Useful for testing upgrade and recovery scenarios.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(RwLock::new(Some(data))),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns a copy of the current image.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Makes every subsequent `store` fail until reset.
    ///
    /// Used to exercise rollback paths of the store.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn store(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteRejected(
                "in-memory backend is configured to fail".into(),
            ));
        }
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().as_ref().map_or(0, |d| d.len() as u64))
    }

    fn sync(&mut self) -> StorageResult<()> {
        // Nothing to make durable
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn memory_store_replaces_image() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"first").unwrap();
        backend.store(b"second image").unwrap();

        assert_eq!(backend.load().unwrap(), Some(b"second image".to_vec()));
        assert_eq!(backend.size().unwrap(), 12);
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"preloaded".to_vec());
        assert_eq!(backend.size().unwrap(), 9);
        assert_eq!(backend.load().unwrap(), Some(b"preloaded".to_vec()));
    }

    #[test]
    fn memory_clones_share_image() {
        let backend = InMemoryBackend::new();
        let mut writer = backend.clone();
        writer.store(b"shared").unwrap();
        assert_eq!(backend.data(), Some(b"shared".to_vec()));
    }

    #[test]
    fn memory_failed_write_keeps_previous_image() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"kept").unwrap();

        backend.set_fail_writes(true);
        let result = backend.store(b"lost");
        assert!(matches!(result, Err(StorageError::WriteRejected(_))));
        assert_eq!(backend.data(), Some(b"kept".to_vec()));

        backend.set_fail_writes(false);
        backend.store(b"now").unwrap();
        assert_eq!(backend.data(), Some(b"now".to_vec()));
    }

    #[test]
    fn memory_sync_succeeds() {
        let mut backend = InMemoryBackend::new();
        backend.store(b"data").unwrap();
        assert!(backend.sync().is_ok());
    }
}
