//! The two syncable modules.

use crate::error::{AppError, AppResult};
use crate::model::{AttendanceEvidence, Document, Goal, Promoter, Sale, Schedule};
use crate::schema::{DOCUMENTS, EVIDENCES, GOALS, PROMOTERS, SALES, SCHEDULES};
use fieldsync_core::Entity;
use fieldsync_sync_protocol::{ModuleSyncSpec, RecordValidator, SyncedCollection};
use std::fmt;
use std::str::FromStr;

/// A module with its own remote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Module {
    /// Promoters, goals and sales.
    Sales,
    /// Promoters (as users), evidences, schedules and documents.
    Attendance,
}

impl Module {
    /// Every module.
    pub const ALL: [Module; 2] = [Module::Sales, Module::Attendance];

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Module::Sales => "sales",
            Module::Attendance => "attendance",
        }
    }

    /// Returns how the module syncs.
    #[must_use]
    pub fn sync_spec(&self) -> ModuleSyncSpec {
        match self {
            Module::Sales => ModuleSyncSpec::new(self.name())
                .with_description("fieldsync sales data (merge)")
                .with_collection(typed::<Promoter>(SyncedCollection::named(PROMOTERS), Promoter::validate))
                .with_collection(typed::<Goal>(SyncedCollection::named(GOALS), Goal::validate))
                .with_collection(typed::<Sale>(SyncedCollection::named(SALES), Sale::validate)),
            Module::Attendance => ModuleSyncSpec::new(self.name())
                .with_description("fieldsync attendance backup")
                .stamped()
                .with_collection(typed::<Promoter>(SyncedCollection::new(PROMOTERS, "users"), Promoter::validate))
                .with_collection(typed::<AttendanceEvidence>(
                    SyncedCollection::named(EVIDENCES),
                    AttendanceEvidence::validate,
                ))
                .with_collection(typed::<Schedule>(SyncedCollection::named(SCHEDULES), Schedule::validate))
                .with_collection(typed::<Document>(SyncedCollection::named(DOCUMENTS), Document::validate)),
        }
    }
}

/// Accepts a pulled record only if it decodes as `T` and passes `validate`.
fn typed<T: Entity + 'static>(collection: SyncedCollection, validate: fn(&T) -> AppResult<()>) -> SyncedCollection {
    collection.validated_by(RecordValidator::new(move |record| {
        let entity = T::from_record(record).map_err(|err| err.to_string())?;
        validate(&entity).map_err(|err| err.to_string())
    }))
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Module {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sales" => Ok(Module::Sales),
            "attendance" => Ok(Module::Attendance),
            other => Err(AppError::UnknownModule(other.to_string())),
        }
    }
}
