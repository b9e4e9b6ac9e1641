//! # fieldsync core
//!
//! Local record store for fieldsync.
//!
//! This crate provides:
//! - Named collections of JSON records with integer or string ids
//! - Auto-increment and explicit key strategies
//! - Secondary and unique indexes
//! - Atomic multi-collection transactions
//! - Additive schema upgrades on open
//!
//! The whole store is held in memory and rewritten through a
//! [`fieldsync_storage::StorageBackend`] on every commit.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod collection;
mod config;
mod dir;
mod error;
mod image;
mod migration;
mod record;
mod store;
mod transaction;

pub use collection::{CollectionSchema, Entity, IndexSpec, KeyStrategy, Schema, TypedCollection};
pub use config::StoreConfig;
pub use error::{CoreError, CoreResult};
pub use migration::MigrationReport;
pub use record::{Record, RecordId, ID_FIELD};
pub use store::Store;
pub use transaction::Transaction;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
