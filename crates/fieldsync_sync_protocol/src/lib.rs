//! # fieldsync sync protocol
//!
//! Sync vocabulary for fieldsync.
//!
//! This crate provides:
//! - [`ModuleSyncSpec`] describing which collections a module syncs and
//!   under which snapshot keys
//! - [`Snapshot`] with a lenient parser for push and a strict one for pull
//! - The merge engine ([`merge`], [`merge_with_stats`])
//! - Wire types of the remote document service
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod merge;
mod module;
mod remote;
mod snapshot;

pub use error::{ProtocolError, ProtocolResult};
pub use merge::{merge, merge_with_stats, MergeStats};
pub use module::{ModuleSyncSpec, RecordValidator, SyncedCollection};
pub use remote::{DocumentUpdate, RemoteDocument, RemoteFile};
pub use snapshot::{LenientParse, Snapshot};
