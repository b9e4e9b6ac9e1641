//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// The image lives in a single file. Writes go to a sibling temporary file
/// which is synced and then renamed over the image, so the image on disk is
/// always either the old or the new one.
///
/// # Durability
///
/// - With `sync_on_write` the temporary file and the parent directory are
///   fsynced around the rename
/// - Without it the rename still happens, but durability is left to the OS
///
/// # Example
///
/// ```no_run
/// use fieldsync_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("store.json")).unwrap();
/// backend.store(b"{}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    sync_on_write: bool,
}

impl FileBackend {
    /// Opens a file backend at the given path.
    ///
    /// The file is not created until the first `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path exists but is not a regular file.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if path.exists() && !path.is_file() {
            return Err(StorageError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let mut temp_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        temp_name.push(".tmp");

        Ok(Self {
            path: path.to_path_buf(),
            temp_path: path.with_file_name(temp_name),
            sync_on_write: true,
        })
    }

    /// Opens a file backend, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created.
    pub fn open_with_create_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Self::open(path)
    }

    /// Sets whether every write is fsynced before it is published.
    #[must_use]
    pub fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Returns the path to the image file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        // NTFS journaling covers the rename
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) if data.is_empty() => Ok(None),
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, data: &[u8]) -> StorageResult<()> {
        let mut file = File::create(&self.temp_path)?;
        file.write_all(data)?;
        if self.sync_on_write {
            file.sync_all()?;
        }
        drop(file);

        fs::rename(&self.temp_path, &self.path)?;

        if self.sync_on_write {
            self.sync_parent()?;
        }
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.path.exists() {
            File::open(&self.path)?.sync_all()?;
        }
        self.sync_parent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_does_not_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.load().unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn file_store_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.store(b"hello world").unwrap();

        assert_eq!(backend.size().unwrap(), 11);
        assert_eq!(backend.load().unwrap(), Some(b"hello world".to_vec()));
    }

    #[test]
    fn file_store_replaces_whole_image() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut backend = FileBackend::open(&path).unwrap();
        backend.store(b"a much longer first image").unwrap();
        backend.store(b"short").unwrap();

        assert_eq!(backend.load().unwrap(), Some(b"short".to_vec()));
        assert!(!dir.path().join("store.json.tmp").exists());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let mut backend = FileBackend::open(&path).unwrap();
            backend.store(b"persistent data").unwrap();
            backend.sync().unwrap();
        }

        {
            let backend = FileBackend::open(&path).unwrap();
            assert_eq!(backend.load().unwrap(), Some(b"persistent data".to_vec()));
        }
    }

    #[test]
    fn file_create_with_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("store.json");

        let mut backend = FileBackend::open_with_create_dirs(&path).unwrap();
        backend.store(b"x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_open_directory_fails() {
        let dir = tempdir().unwrap();
        assert!(FileBackend::open(dir.path()).is_err());
    }

    #[test]
    fn file_without_sync_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut backend = FileBackend::open(&path).unwrap().sync_on_write(false);
        backend.store(b"fast").unwrap();
        assert_eq!(backend.load().unwrap(), Some(b"fast".to_vec()));
    }

    #[test]
    fn file_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path);
    }
}
