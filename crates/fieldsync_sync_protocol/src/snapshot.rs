//! Module snapshots.
//!
//! A snapshot is the JSON object stored as the content of a module's
//! remote file: one array of records per snapshot key, plus an optional
//! `timestamp` in milliseconds since the epoch.
//!
//! ```text
//! {
//!   "promoters": [ { "id": 1, "name": "Ana", ... } ],
//!   "goals": [ ... ],
//!   "sales": [ ... ],
//!   "timestamp": 1715000000000
//! }
//! ```
//!
//! Push reads remote content leniently: anything unreadable counts as
//! empty so local data can still be uploaded. Pull reads strictly, since
//! the content is about to replace local data.

use crate::error::{ProtocolError, ProtocolResult};
use crate::module::ModuleSyncSpec;
use fieldsync_core::Record;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

const TIMESTAMP_FIELD: &str = "timestamp";

/// Arrays of records keyed by snapshot key, in module order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    collections: IndexMap<String, Vec<Record>>,
    timestamp: Option<i64>,
}

/// Outcome of a lenient parse.
#[derive(Debug, Clone, PartialEq)]
pub struct LenientParse {
    /// The parsed snapshot, with every key of the module present.
    pub snapshot: Snapshot,
    /// True if the whole content was unreadable and treated as empty.
    pub unreadable: bool,
    /// Keys that were absent or not arrays and were treated as empty.
    pub defaulted: Vec<String>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(flatten)]
    collections: &'a IndexMap<String, Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
}

impl Snapshot {
    /// Creates a snapshot with an empty array for every key of `spec`.
    #[must_use]
    pub fn empty(spec: &ModuleSyncSpec) -> Self {
        Self {
            collections: spec.snapshot_keys().map(|k| (k.to_string(), Vec::new())).collect(),
            timestamp: None,
        }
    }

    /// Parses content for a push.
    ///
    /// Never fails. Invalid JSON or a non-object document yields an empty
    /// snapshot; a missing or non-array entry yields an empty array for
    /// that key; array elements that are not objects are skipped.
    #[must_use]
    pub fn parse_lenient(content: &str, spec: &ModuleSyncSpec) -> LenientParse {
        let object = match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(object)) => object,
            _ => {
                return LenientParse {
                    snapshot: Self::empty(spec),
                    unreadable: true,
                    defaulted: spec.snapshot_keys().map(str::to_string).collect(),
                }
            }
        };

        let mut snapshot = Self::empty(spec);
        let mut defaulted = Vec::new();
        for key in spec.snapshot_keys() {
            match object.get(key) {
                Some(Value::Array(items)) => {
                    let records = items.iter().cloned().filter_map(Record::from_value).collect();
                    snapshot.collections.insert(key.to_string(), records);
                }
                _ => defaulted.push(key.to_string()),
            }
        }
        snapshot.timestamp = object.get(TIMESTAMP_FIELD).and_then(Value::as_i64);

        LenientParse {
            snapshot,
            unreadable: false,
            defaulted,
        }
    }

    /// Parses content for a pull.
    ///
    /// # Errors
    ///
    /// Fails if the content is not a JSON object, if any key of `spec` is
    /// absent or not an array, if an array holds a non-object, or if a
    /// record fails its collection's validator.
    pub fn parse_strict(content: &str, spec: &ModuleSyncSpec) -> ProtocolResult<Self> {
        let object = match serde_json::from_str::<Value>(content).map_err(ProtocolError::InvalidJson)? {
            Value::Object(object) => object,
            _ => return Err(ProtocolError::NotAnObject),
        };

        let mut snapshot = Self::default();
        for collection in &spec.collections {
            let key = collection.snapshot_key.as_str();
            let items = match object.get(key) {
                Some(Value::Array(items)) => items,
                Some(_) => return Err(ProtocolError::NotAnArray { key: key.to_string() }),
                None => return Err(ProtocolError::MissingCollection { key: key.to_string() }),
            };

            let records = items
                .iter()
                .enumerate()
                .map(|(index, item)| -> ProtocolResult<Record> {
                    let record = Record::from_value(item.clone()).ok_or_else(|| ProtocolError::InvalidRecord {
                        key: key.to_string(),
                        index,
                    })?;
                    collection
                        .check(&record)
                        .map_err(|reason| ProtocolError::RejectedRecord {
                            key: key.to_string(),
                            index,
                            reason,
                        })?;
                    Ok(record)
                })
                .collect::<ProtocolResult<Vec<_>>>()?;
            snapshot.collections.insert(key.to_string(), records);
        }
        snapshot.timestamp = object.get(TIMESTAMP_FIELD).and_then(Value::as_i64);
        Ok(snapshot)
    }

    /// Returns the records under a key; empty if the key is absent.
    #[must_use]
    pub fn records(&self, key: &str) -> &[Record] {
        self.collections.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sets the records under a key.
    pub fn insert(&mut self, key: impl Into<String>, records: Vec<Record>) {
        self.collections.insert(key.into(), records);
    }

    /// Removes and returns the records under a key.
    pub fn take(&mut self, key: &str) -> Vec<Record> {
        self.collections.get_mut(key).map(std::mem::take).unwrap_or_default()
    }

    /// Returns the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Returns the upload timestamp, if any.
    #[must_use]
    pub fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }

    /// Sets the upload timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Returns the total number of records.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Encodes the snapshot as pretty-printed JSON with two-space indents.
    pub fn to_content(&self) -> ProtocolResult<String> {
        serde_json::to_string_pretty(&Content {
            collections: &self.collections,
            timestamp: self.timestamp,
        })
        .map_err(ProtocolError::Encode)
    }

    /// Encodes the snapshot as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        for (key, records) in &self.collections {
            let items = records.iter().cloned().map(Record::into_value).collect();
            object.insert(key.clone(), Value::Array(items));
        }
        if let Some(ts) = self.timestamp {
            object.insert(TIMESTAMP_FIELD.to_string(), Value::from(ts));
        }
        Value::Object(object)
    }
}
