use super::{int_id, refers_to};
use crate::error::{AppError, AppResult};
use crate::model::Promoter;
use crate::schema::{BRANCH_INDEX, DOCUMENTS, EVIDENCES, PROMOTERS, SCHEDULES};
use fieldsync_core::{CoreResult, Entity, RecordId, Store, Transaction, TypedCollection};
use serde_json::Value;

/// Records removed along with a promoter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Attendance evidences removed.
    pub evidences: usize,
    /// Schedule rows removed.
    pub schedules: usize,
    /// Documents removed.
    pub documents: usize,
}

impl CascadeReport {
    /// Total dependent records removed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.evidences + self.schedules + self.documents
    }
}

/// Promoter registry.
pub struct PromoterService<'s> {
    store: &'s Store,
}

impl<'s> PromoterService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    fn typed(&self) -> TypedCollection<'s, Promoter> {
        TypedCollection::new(self.store)
    }

    /// Adds a promoter and returns its id.
    pub fn add(&self, promoter: &Promoter) -> AppResult<i64> {
        promoter.validate()?;
        let fresh = Promoter {
            id: None,
            ..promoter.clone()
        };
        let id = self.typed().put(&fresh)?;
        tracing::debug!(%id, branch = %fresh.branch, "promoter added");
        int_id(PROMOTERS, &id)
    }

    /// Overwrites an existing promoter.
    pub fn update(&self, promoter: &Promoter) -> AppResult<()> {
        promoter.validate()?;
        let id = promoter
            .id
            .ok_or_else(|| AppError::validation("promoter has no id"))?;
        if self.get(id)?.is_none() {
            return Err(AppError::not_found(PROMOTERS, id));
        }
        self.typed().put(promoter)?;
        Ok(())
    }

    /// Gets a promoter.
    pub fn get(&self, id: i64) -> AppResult<Option<Promoter>> {
        Ok(self.typed().get(&RecordId::Int(id))?)
    }

    /// Lists every promoter ordered by id.
    pub fn list(&self) -> AppResult<Vec<Promoter>> {
        Ok(self.typed().all()?)
    }

    /// Lists the promoters of a branch.
    pub fn by_branch(&self, branch: &str) -> AppResult<Vec<Promoter>> {
        let records = self
            .store
            .find_by_index(PROMOTERS, BRANCH_INDEX, &[Value::from(branch)])?;
        Ok(records
            .iter()
            .map(Promoter::from_record)
            .collect::<CoreResult<_>>()?)
    }

    /// Removes a promoter with its evidences, schedules and documents.
    pub fn delete_cascade(&self, id: i64) -> AppResult<CascadeReport> {
        let report = self.store.transaction(|txn| {
            let key = RecordId::Int(id);
            if txn.get_by_id(PROMOTERS, &key)?.is_none() {
                return Ok(None);
            }
            txn.remove(PROMOTERS, &key)?;
            Ok(Some(CascadeReport {
                evidences: remove_owned_by(txn, EVIDENCES, id)?,
                schedules: remove_owned_by(txn, SCHEDULES, id)?,
                documents: remove_owned_by(txn, DOCUMENTS, id)?,
            }))
        })?;

        let report = report.ok_or_else(|| AppError::not_found(PROMOTERS, id))?;
        tracing::info!(promoter = id, dependents = report.total(), "promoter deleted");
        Ok(report)
    }
}

fn remove_owned_by(txn: &mut Transaction<'_>, collection: &str, user_id: i64) -> CoreResult<usize> {
    let owned: Vec<RecordId> = txn
        .get_all(collection)?
        .iter()
        .filter(|record| refers_to(record, "userId", user_id))
        .filter_map(|record| record.id())
        .collect();
    for id in &owned {
        txn.remove(collection, id)?;
    }
    Ok(owned.len())
}
