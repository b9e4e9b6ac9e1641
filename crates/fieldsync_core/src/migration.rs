//! Schema upgrades on open.
//!
//! Upgrades are forward-only and additive: a newer schema may add
//! collections, which are created empty. Existing collections and their
//! records are never modified, and collections the schema no longer names
//! are preserved as they are.

use crate::collection::{CollectionData, Schema};
use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;

/// Outcome of opening a store against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Schema version found in the persisted image.
    pub from_version: u32,
    /// Schema version after the upgrade.
    pub to_version: u32,
    /// Collections created by the upgrade.
    pub created: Vec<String>,
}

impl MigrationReport {
    /// Returns true if nothing had to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from_version == self.to_version && self.created.is_empty()
    }
}

/// Brings persisted collections up to `schema`.
pub(crate) fn upgrade(
    persisted_version: u32,
    collections: &mut BTreeMap<String, CollectionData>,
    schema: &Schema,
) -> CoreResult<MigrationReport> {
    if persisted_version > schema.version {
        return Err(CoreError::invalid_format(format!(
            "store schema v{persisted_version} is newer than supported v{}",
            schema.version
        )));
    }

    let mut created = Vec::new();
    for collection in &schema.collections {
        if !collections.contains_key(&collection.name) {
            collections.insert(collection.name.clone(), CollectionData::default());
            created.push(collection.name.clone());
        }
    }

    Ok(MigrationReport {
        from_version: persisted_version,
        to_version: schema.version,
        created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionSchema;

    fn schema_v2() -> Schema {
        Schema::new(2)
            .with_collection(CollectionSchema::auto_increment("promoters"))
            .with_collection(CollectionSchema::explicit("evidences"))
    }

    #[test]
    fn upgrade_creates_missing_collections() {
        let mut collections = BTreeMap::new();
        collections.insert("promoters".to_string(), CollectionData::default());

        let report = upgrade(1, &mut collections, &schema_v2()).unwrap();
        assert_eq!(report.from_version, 1);
        assert_eq!(report.to_version, 2);
        assert_eq!(report.created, vec!["evidences".to_string()]);
        assert!(!report.is_noop());
        assert!(collections.contains_key("evidences"));
    }

    #[test]
    fn upgrade_keeps_unknown_collections() {
        let mut collections = BTreeMap::new();
        collections.insert("legacy".to_string(), CollectionData::default());

        upgrade(2, &mut collections, &schema_v2()).unwrap();
        assert!(collections.contains_key("legacy"));
    }

    #[test]
    fn same_version_is_noop() {
        let mut collections = BTreeMap::new();
        collections.insert("promoters".to_string(), CollectionData::default());
        collections.insert("evidences".to_string(), CollectionData::default());

        let report = upgrade(2, &mut collections, &schema_v2()).unwrap();
        assert!(report.is_noop());
    }

    #[test]
    fn newer_store_is_rejected() {
        let mut collections = BTreeMap::new();
        let err = upgrade(3, &mut collections, &schema_v2()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }
}
