//! Typed access to collections.

use crate::error::CoreResult;
use crate::record::{Record, RecordId};
use crate::store::Store;
use crate::transaction::Transaction;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A type stored as records of one collection.
///
/// The type serializes to a JSON object. Its `id` field, when present,
/// is the record id.
pub trait Entity: Serialize + DeserializeOwned {
    /// Collection holding this type.
    const COLLECTION: &'static str;

    /// Encodes the entity into a record.
    fn to_record(&self) -> CoreResult<Record> {
        Ok(Record::encode(self)?)
    }

    /// Decodes an entity from a record.
    fn from_record(record: &Record) -> CoreResult<Self> {
        Ok(record.decode()?)
    }
}

/// A typed view over a collection of a [`Store`].
///
/// Filtering is done with iterator adapters over [`TypedCollection::all`]:
///
/// ```rust,ignore
/// let goals: TypedCollection<Goal> = TypedCollection::new(&store);
/// let january: Vec<Goal> = goals.all()?.into_iter().filter(|g| g.month == 1).collect();
/// ```
pub struct TypedCollection<'s, T: Entity> {
    store: &'s Store,
    _marker: PhantomData<T>,
}

impl<'s, T: Entity> TypedCollection<'s, T> {
    /// Creates a typed view.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    /// Gets an entity by id.
    pub fn get(&self, id: &RecordId) -> CoreResult<Option<T>> {
        self.store
            .get_by_id(T::COLLECTION, id)?
            .map(|record| T::from_record(&record))
            .transpose()
    }

    /// Returns every entity, ordered by id.
    pub fn all(&self) -> CoreResult<Vec<T>> {
        self.store
            .get_all(T::COLLECTION)?
            .iter()
            .map(T::from_record)
            .collect()
    }

    /// Inserts or replaces an entity and returns its id.
    pub fn put(&self, entity: &T) -> CoreResult<RecordId> {
        self.store.put(T::COLLECTION, entity.to_record()?)
    }

    /// Gets an entity by id inside an open transaction, seeing its staged writes.
    pub fn get_in_txn(&self, txn: &Transaction<'_>, id: &RecordId) -> CoreResult<Option<T>> {
        txn.get_by_id(T::COLLECTION, id)?.as_ref().map(T::from_record).transpose()
    }

    /// Inserts or replaces an entity inside an open transaction.
    pub fn put_in_txn(&self, txn: &mut Transaction<'_>, entity: &T) -> CoreResult<RecordId> {
        txn.put(T::COLLECTION, entity.to_record()?)
    }

    /// Removes an entity by id.
    pub fn remove(&self, id: &RecordId) -> CoreResult<()> {
        self.store.remove(T::COLLECTION, id)
    }

    /// Returns the number of stored entities.
    pub fn count(&self) -> CoreResult<usize> {
        self.store.count(T::COLLECTION)
    }
}
