//! Transactions over the record store.
//!
//! A transaction reads from the committed collections and stages every
//! write into a private copy of the collection it touches. Nothing becomes
//! visible to other readers until [`Store::transaction`] persists the
//! staged collections and swaps them in.
//!
//! [`Store::transaction`]: crate::Store::transaction

use crate::collection::{CollectionData, CollectionSchema, Schema};
use crate::error::{CoreError, CoreResult};
use crate::record::{Record, RecordId};
use serde_json::Value;
use std::collections::BTreeMap;

/// An open transaction.
///
/// Obtained through [`Store::transaction`](crate::Store::transaction).
pub struct Transaction<'a> {
    schema: &'a Schema,
    committed: &'a BTreeMap<String, CollectionData>,
    staged: BTreeMap<String, CollectionData>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(schema: &'a Schema, committed: &'a BTreeMap<String, CollectionData>) -> Self {
        Self {
            schema,
            committed,
            staged: BTreeMap::new(),
        }
    }

    fn schema_of(&self, collection: &str) -> CoreResult<&'a CollectionSchema> {
        self.schema
            .collection(collection)
            .ok_or_else(|| CoreError::collection_not_found(collection))
    }

    fn read(&self, collection: &str) -> CoreResult<&CollectionData> {
        self.schema_of(collection)?;
        if let Some(data) = self.staged.get(collection) {
            return Ok(data);
        }
        self.committed
            .get(collection)
            .ok_or_else(|| CoreError::collection_not_found(collection))
    }

    fn write(&mut self, collection: &str) -> CoreResult<(&'a CollectionSchema, &mut CollectionData)> {
        let schema = self.schema_of(collection)?;
        let committed = self.committed;
        let data = self
            .staged
            .entry(collection.to_string())
            .or_insert_with(|| committed.get(collection).cloned().unwrap_or_default());
        Ok((schema, data))
    }

    /// Returns every record of a collection, ordered by id.
    pub fn get_all(&self, collection: &str) -> CoreResult<Vec<Record>> {
        Ok(self.read(collection)?.records().cloned().collect())
    }

    /// Returns the record stored under `id`, if any.
    pub fn get_by_id(&self, collection: &str, id: &RecordId) -> CoreResult<Option<Record>> {
        Ok(self.read(collection)?.get(id).cloned())
    }

    /// Inserts or replaces a record and returns its id.
    pub fn put(&mut self, collection: &str, record: Record) -> CoreResult<RecordId> {
        let (schema, data) = self.write(collection)?;
        data.put(schema, record)
    }

    /// Removes a record. Removing an absent id is not an error.
    pub fn remove(&mut self, collection: &str, id: &RecordId) -> CoreResult<()> {
        if self.read(collection)?.get(id).is_none() {
            return Ok(());
        }
        let (_, data) = self.write(collection)?;
        data.remove(id);
        Ok(())
    }

    /// Removes every record and resets the id generator.
    pub fn clear(&mut self, collection: &str) -> CoreResult<()> {
        let (_, data) = self.write(collection)?;
        data.clear();
        Ok(())
    }

    /// Replaces the whole content of a collection.
    ///
    /// Auto-increment collections drop the incoming ids and number the
    /// records 1..n in input order. Explicit-key collections keep them.
    /// Returns the number of records written.
    pub fn replace_all<I>(&mut self, collection: &str, records: I) -> CoreResult<usize>
    where
        I: IntoIterator<Item = Record>,
    {
        let (schema, data) = self.write(collection)?;
        data.clear();

        let mut written = 0;
        for record in records {
            let record = if schema.key.is_auto() {
                record.without_id()
            } else {
                record
            };
            data.put(schema, record)?;
            written += 1;
        }
        Ok(written)
    }

    /// Returns records whose index key equals `key`.
    pub fn find_by_index(&self, collection: &str, index: &str, key: &[Value]) -> CoreResult<Vec<Record>> {
        let schema = self.schema_of(collection)?;
        let spec = schema.index(index).ok_or_else(|| CoreError::IndexNotFound {
            collection: collection.to_string(),
            index: index.to_string(),
        })?;
        Ok(self.read(collection)?.find(spec, key))
    }

    /// Returns the number of records in a collection.
    pub fn count(&self, collection: &str) -> CoreResult<usize> {
        Ok(self.read(collection)?.len())
    }

    /// Returns true if the transaction staged any change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    pub(crate) fn into_staged(self) -> BTreeMap<String, CollectionData> {
        self.staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::IndexSpec;

    fn schema() -> Schema {
        Schema::new(1)
            .with_collection(
                CollectionSchema::auto_increment("sales").with_index(IndexSpec::new("branch", ["branch"])),
            )
            .with_collection(CollectionSchema::explicit("config"))
    }

    fn committed(schema: &Schema) -> BTreeMap<String, CollectionData> {
        schema
            .collections
            .iter()
            .map(|c| (c.name.clone(), CollectionData::default()))
            .collect()
    }

    #[test]
    fn reads_see_staged_writes() {
        let schema = schema();
        let base = committed(&schema);
        let mut txn = Transaction::new(&schema, &base);

        let id = txn.put("sales", Record::new().with("branch", "Centro")).unwrap();
        assert_eq!(txn.count("sales").unwrap(), 1);
        assert!(txn.get_by_id("sales", &id).unwrap().is_some());
        // The committed view is untouched
        assert_eq!(base["sales"].len(), 0);
    }

    #[test]
    fn unknown_collection_is_rejected() {
        let schema = schema();
        let base = committed(&schema);
        let mut txn = Transaction::new(&schema, &base);

        let err = txn.put("nope", Record::new()).unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { .. }));
    }

    #[test]
    fn replace_all_renumbers_auto_collections() {
        let schema = schema();
        let base = committed(&schema);
        let mut txn = Transaction::new(&schema, &base);
        txn.put("sales", Record::new().with("branch", "old")).unwrap();

        let incoming = vec![
            Record::new().with("id", 40).with("branch", "Norte"),
            Record::new().with("id", 7).with("branch", "Sur"),
        ];
        assert_eq!(txn.replace_all("sales", incoming).unwrap(), 2);

        let all = txn.get_all("sales").unwrap();
        assert_eq!(all[0].id(), Some(RecordId::Int(1)));
        assert_eq!(all[0].get("branch").unwrap(), "Norte");
        assert_eq!(all[1].id(), Some(RecordId::Int(2)));
    }

    #[test]
    fn replace_all_keeps_explicit_ids() {
        let schema = schema();
        let base = committed(&schema);
        let mut txn = Transaction::new(&schema, &base);

        let incoming = vec![Record::new().with("id", "sales.remoteId").with("value", "abc")];
        txn.replace_all("config", incoming).unwrap();

        let found = txn.get_by_id("config", &RecordId::from("sales.remoteId")).unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn remove_absent_stages_nothing() {
        let schema = schema();
        let base = committed(&schema);
        let mut txn = Transaction::new(&schema, &base);

        txn.remove("sales", &RecordId::Int(9)).unwrap();
        assert!(!txn.has_changes());
    }

    #[test]
    fn find_by_unknown_index_fails() {
        let schema = schema();
        let base = committed(&schema);
        let txn = Transaction::new(&schema, &base);

        let err = txn.find_by_index("sales", "date", &[Value::from("x")]).unwrap_err();
        assert!(matches!(err, CoreError::IndexNotFound { .. }));
    }
}
