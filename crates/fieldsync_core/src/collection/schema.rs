//! Collection and store schemas.

use crate::record::Record;
use serde_json::Value;

/// How a collection obtains record identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The store assigns sequential integer ids to records without one.
    AutoIncrement,
    /// The caller always supplies the id (composite or fixed keys).
    Explicit,
}

impl KeyStrategy {
    /// Returns true if the store assigns identifiers.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, KeyStrategy::AutoIncrement)
    }
}

/// A secondary index over one or more record fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Index name, unique within its collection.
    pub name: String,
    /// Indexed fields, in key order.
    pub fields: Vec<String>,
    /// Whether two records may share the same key.
    pub unique: bool,
}

impl IndexSpec {
    /// Creates a non-unique index.
    pub fn new<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    /// Creates a unique index.
    pub fn unique<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unique: true,
            ..Self::new(name, fields)
        }
    }

    /// Extracts the index key of a record.
    ///
    /// Records missing any indexed field are not part of the index.
    #[must_use]
    pub fn key_of(&self, record: &Record) -> Option<Vec<Value>> {
        self.fields
            .iter()
            .map(|field| match record.get(field) {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.clone()),
            })
            .collect()
    }
}

/// Schema of a single collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSchema {
    /// Collection name.
    pub name: String,
    /// Identifier strategy.
    pub key: KeyStrategy,
    /// Secondary indexes.
    pub indexes: Vec<IndexSpec>,
}

impl CollectionSchema {
    /// Creates an auto-increment collection.
    pub fn auto_increment(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: KeyStrategy::AutoIncrement,
            indexes: Vec::new(),
        }
    }

    /// Creates a collection whose ids are always supplied by the caller.
    pub fn explicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: KeyStrategy::Explicit,
            indexes: Vec::new(),
        }
    }

    /// Adds an index.
    #[must_use]
    pub fn with_index(mut self, index: IndexSpec) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indexes.iter().find(|i| i.name == name)
    }
}

/// The versioned set of collections a store holds.
///
/// Bumping `version` and adding a collection is the only supported
/// migration: on open, collections missing from the persisted image are
/// created empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Schema version.
    pub version: u32,
    /// Collections, in declaration order.
    pub collections: Vec<CollectionSchema>,
}

impl Schema {
    /// Creates an empty schema with the given version.
    #[must_use]
    pub fn new(version: u32) -> Self {
        Self {
            version,
            collections: Vec::new(),
        }
    }

    /// Adds a collection.
    #[must_use]
    pub fn with_collection(mut self, collection: CollectionSchema) -> Self {
        self.collections.push(collection);
        self
    }

    /// Looks up a collection by name.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.iter().find(|c| c.name == name)
    }
}
