//! Operations over the application collections.
//!
//! Each service borrows the store and validates input before writing.

mod attendance;
mod documents;
mod goals;
mod promoters;
mod sales;
mod schedules;

pub use attendance::AttendanceService;
pub use documents::DocumentService;
pub use goals::GoalService;
pub use promoters::{CascadeReport, PromoterService};
pub use sales::SaleService;
pub use schedules::ScheduleService;

use crate::error::{AppError, AppResult};
use fieldsync_core::{Record, RecordId};
use serde_json::Value;

/// Returns the integer id assigned by an auto-increment collection.
pub(crate) fn int_id(collection: &'static str, id: &RecordId) -> AppResult<i64> {
    id.as_int()
        .ok_or_else(|| AppError::Validation(format!("{collection} id {id} is not an integer")))
}

/// Returns true if `field` holds `id` as a number or as a string.
pub(crate) fn refers_to(record: &Record, field: &str, id: i64) -> bool {
    record.field_equals(field, &Value::from(id)) || record.field_equals(field, &Value::from(id.to_string()))
}
