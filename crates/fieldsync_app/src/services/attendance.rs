use crate::error::{AppError, AppResult};
use crate::model::{AttendanceEvidence, Promoter};
use crate::schema::PROMOTERS;
use chrono::NaiveDate;
use fieldsync_core::{RecordId, Store, TypedCollection};

/// Daily attendance evidence.
pub struct AttendanceService<'s> {
    store: &'s Store,
}

impl<'s> AttendanceService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    fn typed(&self) -> TypedCollection<'s, AttendanceEvidence> {
        TypedCollection::new(self.store)
    }

    /// Saves the evidence of a promoter's day, replacing any earlier one.
    ///
    /// The record id is always derived from the user and date. The first
    /// save of a day bumps the promoter's attendance counter.
    pub fn save_evidence(&self, evidence: &AttendanceEvidence) -> AppResult<()> {
        evidence.validate()?;
        let evidence = AttendanceEvidence {
            id: AttendanceEvidence::key(evidence.user_id, evidence.date),
            ..evidence.clone()
        };
        let promoters = TypedCollection::<Promoter>::new(self.store);
        let evidences = self.typed();

        let first_of_day = self.store.transaction(|txn| {
            let Some(mut promoter) = promoters.get_in_txn(txn, &RecordId::Int(evidence.user_id))? else {
                return Ok(None);
            };
            let first_of_day = evidences
                .get_in_txn(txn, &RecordId::from(evidence.id.as_str()))?
                .is_none();
            evidences.put_in_txn(txn, &evidence)?;
            if first_of_day {
                promoter.total_assists += 1;
                promoter.last_assistance = promoter.last_assistance.max(Some(evidence.date));
                promoters.put_in_txn(txn, &promoter)?;
            }
            Ok(Some(first_of_day))
        })?;
        let first_of_day = first_of_day.ok_or_else(|| AppError::not_found(PROMOTERS, evidence.user_id))?;
        tracing::debug!(id = %evidence.id, first_of_day, "evidence saved");
        Ok(())
    }

    /// Gets the evidence of a promoter's day.
    pub fn evidence_for(&self, user_id: i64, date: NaiveDate) -> AppResult<Option<AttendanceEvidence>> {
        let key = AttendanceEvidence::key(user_id, date);
        Ok(self.typed().get(&RecordId::from(key))?)
    }

    /// Returns a promoter's evidence, newest first.
    pub fn history(&self, user_id: i64) -> AppResult<Vec<AttendanceEvidence>> {
        let mut history: Vec<_> = self
            .typed()
            .all()?
            .into_iter()
            .filter(|e| e.user_id == user_id)
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(history)
    }
}
