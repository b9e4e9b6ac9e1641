//! # fieldsync sync engine
//!
//! Manual push/pull between the local store and a remote document.
//!
//! This crate provides:
//! - Push: merge local data into the remote snapshot (local wins) and upload
//! - Pull: replace local collections with the remote snapshot
//! - A remote client trait, an HTTP client and an in-memory remote
//! - A per-module sync lock that rejects overlapping syncs
//! - Typed commands and broadcast events for callers
//!
//! ## Key Invariants
//!
//! - Push never modifies local data
//! - Push treats unreadable remote content as empty; pull refuses it
//! - Pull replaces every collection of a module in one transaction
//! - No retries and no background sync; every sync is requested explicitly

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod applier;
mod config;
mod dispatch;
mod error;
mod http;
mod state;
mod transport;

pub use applier::{ReplaceEngine, ReplacedCollection};
pub use config::{RemoteEndpoint, SyncCredentials, CONFIG_COLLECTION};
pub use dispatch::{SyncCommand, SyncDispatcher, SyncEvent, SyncOutcome};
pub use error::{SyncError, SyncResult};
pub use http::GistClient;
pub use state::{
    CollectionPush, PullReport, PushReport, SyncDirection, SyncEngine, SyncGuard, SyncLock, SyncState,
    SyncStats,
};
pub use transport::{MemoryRemote, RemoteDocumentClient};
