//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for the local store.
///
/// A backend holds a single opaque image. The store serializes its complete
/// state after every committed transaction and hands the bytes to
/// [`StorageBackend::store`].
///
/// # Invariants
///
/// - `load` returns exactly the bytes of the last successful `store`
/// - `store` is all-or-nothing: on error the previous image is intact
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Loads the current image.
    ///
    /// Returns `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the image exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the image with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The previous image must
    /// survive a failed write.
    fn store(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Returns the size of the current image in bytes (0 when empty).
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Syncs the image and its metadata to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;
}
