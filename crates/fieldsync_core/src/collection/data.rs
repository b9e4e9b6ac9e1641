//! In-memory contents of one collection.

use crate::collection::schema::CollectionSchema;
use crate::error::{CoreError, CoreResult};
use crate::record::{Record, RecordId};
use serde_json::Value;
use std::collections::BTreeMap;

/// First id handed out by an auto-increment collection.
pub(crate) const FIRST_AUTO_ID: i64 = 1;

/// Records of one collection keyed by id, plus its id generator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CollectionData {
    records: BTreeMap<RecordId, Record>,
    next_id: i64,
}

impl Default for CollectionData {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: FIRST_AUTO_ID,
        }
    }
}

impl CollectionData {
    /// Rebuilds a collection from persisted parts.
    pub(crate) fn from_parts(records: Vec<Record>, next_id: i64) -> CoreResult<Self> {
        let mut data = Self {
            records: BTreeMap::new(),
            next_id: next_id.max(FIRST_AUTO_ID),
        };
        for record in records {
            let id = record
                .id()
                .ok_or_else(|| CoreError::invalid_format("persisted record without a valid id"))?;
            data.records.insert(id, record);
        }
        Ok(data)
    }

    pub(crate) fn next_id(&self) -> i64 {
        self.next_id
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub(crate) fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    /// Inserts or overwrites a record, assigning an id when the collection
    /// generates them and the record carries none.
    pub(crate) fn put(&mut self, schema: &CollectionSchema, mut record: Record) -> CoreResult<RecordId> {
        let id = if record.has_no_id() {
            if !schema.key.is_auto() {
                return Err(CoreError::invalid_record(format!(
                    "collection {} requires an explicit id",
                    schema.name
                )));
            }
            let id = RecordId::Int(self.next_id);
            record.set_id(&id);
            id
        } else {
            record.id().ok_or_else(|| {
                CoreError::invalid_record(format!(
                    "id must be an integer or a string in collection {}",
                    schema.name
                ))
            })?
        };

        self.check_unique(schema, &id, &record)?;

        if schema.key.is_auto() {
            if let RecordId::Int(n) = id {
                if n >= self.next_id {
                    self.next_id = n.saturating_add(1);
                }
            }
        }

        self.records.insert(id.clone(), record);
        Ok(id)
    }

    /// Removes a record. Returns whether it existed.
    pub(crate) fn remove(&mut self, id: &RecordId) -> bool {
        self.records.remove(id).is_some()
    }

    /// Removes every record and restarts the id generator.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.next_id = FIRST_AUTO_ID;
    }

    /// Records whose index key equals `key`.
    pub(crate) fn find(&self, index: &crate::collection::IndexSpec, key: &[Value]) -> Vec<Record> {
        self.records
            .values()
            .filter(|r| index.key_of(r).as_deref() == Some(key))
            .cloned()
            .collect()
    }

    fn check_unique(&self, schema: &CollectionSchema, id: &RecordId, record: &Record) -> CoreResult<()> {
        for index in schema.indexes.iter().filter(|i| i.unique) {
            let Some(key) = index.key_of(record) else {
                continue;
            };
            let clash = self
                .records
                .iter()
                .any(|(other_id, other)| other_id != id && index.key_of(other).as_ref() == Some(&key));
            if clash {
                return Err(CoreError::ConstraintViolation {
                    collection: schema.name.clone(),
                    index: index.name.clone(),
                });
            }
        }
        Ok(())
    }
}
