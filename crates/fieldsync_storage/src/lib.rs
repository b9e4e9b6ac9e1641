//! # fieldsync storage
//!
//! Storage backend trait and implementations for the fieldsync local store.
//!
//! Backends are **opaque image stores**: they hold one serialized image of
//! the whole local store and know nothing about collections or records.
//!
//! ## Design Principles
//!
//! - A backend holds exactly one image; `store` replaces it as a whole
//! - A reader never observes a half-written image
//! - Must be `Send + Sync` so the store can be shared across tasks
//! - The store owns all interpretation of the bytes
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage using write-then-rename
//!
//! ## Example
//!
//! ```rust
//! use fieldsync_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.store(b"{\"collections\":{}}").unwrap();
//! assert_eq!(backend.load().unwrap().unwrap(), b"{\"collections\":{}}");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
