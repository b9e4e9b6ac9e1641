//! Collections and indexes of the application store.

use fieldsync_core::{CollectionSchema, IndexSpec, Schema};

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 2;

/// Promoters (attendance calls them users).
pub const PROMOTERS: &str = "promoters";
/// Monthly sales goals.
pub const GOALS: &str = "goals";
/// Recorded sales.
pub const SALES: &str = "sales";
/// Daily attendance evidence, keyed `<userId>_<date>`.
pub const EVIDENCES: &str = "evidences";
/// Weekly schedules.
pub const SCHEDULES: &str = "schedules";
/// Weekly reports and incapacities.
pub const DOCUMENTS: &str = "documents";
/// Key/value configuration.
pub use fieldsync_sync_engine::CONFIG_COLLECTION as CONFIG;

/// Unique goal index over month, branch and product.
pub const GOAL_KEY_INDEX: &str = "goal_key";
/// Branch index of promoters and sales.
pub const BRANCH_INDEX: &str = "branch";
/// Date index of sales.
pub const DATE_INDEX: &str = "date";

/// Builds the application schema.
///
/// Version 1 held the sales collections only; version 2 added the
/// attendance collections.
#[must_use]
pub fn app_schema() -> Schema {
    Schema::new(SCHEMA_VERSION)
        .with_collection(CollectionSchema::auto_increment(PROMOTERS).with_index(IndexSpec::new(BRANCH_INDEX, ["branch"])))
        .with_collection(
            CollectionSchema::auto_increment(GOALS)
                .with_index(IndexSpec::unique(GOAL_KEY_INDEX, ["month", "branch", "product"])),
        )
        .with_collection(
            CollectionSchema::auto_increment(SALES)
                .with_index(IndexSpec::new(DATE_INDEX, ["date"]))
                .with_index(IndexSpec::new(BRANCH_INDEX, ["branch"])),
        )
        .with_collection(CollectionSchema::explicit(EVIDENCES))
        .with_collection(CollectionSchema::auto_increment(SCHEDULES))
        .with_collection(CollectionSchema::auto_increment(DOCUMENTS))
        .with_collection(CollectionSchema::explicit(CONFIG))
}
