//! Collections: schemas, stored data and typed access.

mod data;
mod schema;
mod typed;

pub(crate) use data::CollectionData;
pub use schema::{CollectionSchema, IndexSpec, KeyStrategy, Schema};
pub use typed::{Entity, TypedCollection};
