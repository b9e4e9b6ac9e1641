//! Typed records.
//!
//! Field names are camelCase on disk and in remote snapshots. Dates are
//! ISO `YYYY-MM-DD`, times `HH:MM`.

use crate::error::{AppError, AppResult};
use crate::schema::{DOCUMENTS, EVIDENCES, GOALS, PROMOTERS, SALES, SCHEDULES};
use chrono::{NaiveDate, NaiveTime, Weekday};
use fieldsync_core::Entity;
use serde::{Deserialize, Serialize};

const TIME_FORMAT: &str = "%H:%M";

fn require(value: &str, what: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        Err(AppError::validation(format!("{what} is required")))
    } else {
        Ok(())
    }
}

/// Parses an `HH:MM` time.
pub(crate) fn parse_time(value: &str, what: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| AppError::validation(format!("{what} must be HH:MM, got '{value}'")))
}

/// A promoter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promoter {
    /// Store id; `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Full name.
    pub name: String,
    /// Branch the promoter works at.
    pub branch: String,
    /// National id number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    /// Attendance counter.
    #[serde(default)]
    pub total_assists: u32,
    /// Date of the last attendance.
    #[serde(default)]
    pub last_assistance: Option<NaiveDate>,
}

impl Promoter {
    /// Creates an unsaved promoter.
    pub fn new(name: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            branch: branch.into(),
            dni: None,
            total_assists: 0,
            last_assistance: None,
        }
    }

    /// Sets the national id number.
    #[must_use]
    pub fn with_dni(mut self, dni: impl Into<String>) -> Self {
        self.dni = Some(dni.into());
        self
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        require(&self.name, "promoter name")?;
        require(&self.branch, "promoter branch")
    }
}

impl Entity for Promoter {
    const COLLECTION: &'static str = PROMOTERS;
}

/// A monthly sales goal for one product at one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    /// Store id; `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Month, 1 to 12.
    pub month: u32,
    /// Branch.
    pub branch: String,
    /// Product.
    pub product: String,
    /// Units to sell.
    pub target_quantity: u32,
}

impl Goal {
    /// Creates an unsaved goal.
    pub fn new(month: u32, branch: impl Into<String>, product: impl Into<String>, target_quantity: u32) -> Self {
        Self {
            id: None,
            month,
            branch: branch.into(),
            product: product.into(),
            target_quantity,
        }
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        if !(1..=12).contains(&self.month) {
            return Err(AppError::validation(format!("month must be 1-12, got {}", self.month)));
        }
        if self.target_quantity == 0 {
            return Err(AppError::validation("target quantity must be greater than zero"));
        }
        require(&self.branch, "goal branch")?;
        require(&self.product, "goal product")
    }
}

impl Entity for Goal {
    const COLLECTION: &'static str = GOALS;
}

/// A recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Store id; `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Day of the sale.
    pub date: NaiveDate,
    /// Branch.
    pub branch: String,
    /// Product.
    pub product: String,
    /// Promoter who sold.
    #[serde(default)]
    pub promoter_id: Option<i64>,
    /// Units sold.
    pub quantity: u32,
}

impl Sale {
    /// Creates an unsaved sale.
    pub fn new(date: NaiveDate, branch: impl Into<String>, product: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: None,
            date,
            branch: branch.into(),
            product: product.into(),
            promoter_id: None,
            quantity,
        }
    }

    /// Sets the selling promoter.
    #[must_use]
    pub fn by(mut self, promoter_id: i64) -> Self {
        self.promoter_id = Some(promoter_id);
        self
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        if self.quantity == 0 {
            return Err(AppError::validation("quantity must be greater than zero"));
        }
        require(&self.branch, "sale branch")?;
        require(&self.product, "sale product")
    }
}

impl Entity for Sale {
    const COLLECTION: &'static str = SALES;
}

/// Check-in and check-out evidence of one promoter on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvidence {
    /// `<userId>_<date>`.
    pub id: String,
    /// Promoter id.
    pub user_id: i64,
    /// Day.
    pub date: NaiveDate,
    /// Check-in time.
    #[serde(default)]
    pub check_in_time: Option<String>,
    /// Check-out time.
    #[serde(default)]
    pub check_out_time: Option<String>,
    /// Whether the check-in photo was validated.
    #[serde(default)]
    pub check_in_validated: bool,
    /// Whether the check-out photo was validated.
    #[serde(default)]
    pub check_out_validated: bool,
}

impl AttendanceEvidence {
    /// Returns the record id of a promoter's day.
    #[must_use]
    pub fn key(user_id: i64, date: NaiveDate) -> String {
        format!("{user_id}_{}", date.format("%Y-%m-%d"))
    }

    /// Creates evidence with no times recorded.
    #[must_use]
    pub fn new(user_id: i64, date: NaiveDate) -> Self {
        Self {
            id: Self::key(user_id, date),
            user_id,
            date,
            check_in_time: None,
            check_out_time: None,
            check_in_validated: false,
            check_out_validated: false,
        }
    }

    /// Records the check-in.
    #[must_use]
    pub fn check_in(mut self, time: impl Into<String>, validated: bool) -> Self {
        self.check_in_time = Some(time.into());
        self.check_in_validated = validated;
        self
    }

    /// Records the check-out.
    #[must_use]
    pub fn check_out(mut self, time: impl Into<String>, validated: bool) -> Self {
        self.check_out_time = Some(time.into());
        self.check_out_validated = validated;
        self
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let check_in = match self.check_in_time.as_deref() {
            Some(time) if self.check_in_validated => parse_time(time, "check-in")?,
            _ => return Err(AppError::validation("a validated check-in is required")),
        };
        if let Some(time) = self.check_out_time.as_deref() {
            if !self.check_out_validated {
                return Err(AppError::validation("the check-out is not validated"));
            }
            if parse_time(time, "check-out")? < check_in {
                return Err(AppError::validation("check-out is before check-in"));
            }
        }
        Ok(())
    }
}

impl Entity for AttendanceEvidence {
    const COLLECTION: &'static str = EVIDENCES;
}

/// One working day of a promoter's weekly schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Store id; `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Promoter id.
    pub user_id: i64,
    /// Day of the week.
    pub weekday: Weekday,
    /// Shift start, `HH:MM`.
    pub start_time: String,
    /// Shift end, `HH:MM`.
    pub end_time: String,
}

impl Schedule {
    /// Creates an unsaved schedule row.
    pub fn new(user_id: i64, weekday: Weekday, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id,
            weekday,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let start = parse_time(&self.start_time, "shift start")?;
        let end = parse_time(&self.end_time, "shift end")?;
        if end <= start {
            return Err(AppError::validation(format!(
                "{} shift ends before it starts",
                self.weekday
            )));
        }
        Ok(())
    }
}

impl Entity for Schedule {
    const COLLECTION: &'static str = SCHEDULES;
}

/// Kind of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// Weekly activity report.
    WeeklyReport,
    /// Sick leave.
    Incapacity,
}

/// A document filed for a promoter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Store id; `None` before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Document kind.
    pub doc_type: DocType,
    /// Promoter id.
    pub user_id: i64,
    /// First day covered.
    pub date_start: NaiveDate,
    /// Last day covered.
    #[serde(default)]
    pub date_end: Option<NaiveDate>,
    /// Free text.
    #[serde(default)]
    pub description: String,
}

impl Document {
    /// Creates an unsaved document.
    pub fn new(doc_type: DocType, user_id: i64, date_start: NaiveDate) -> Self {
        Self {
            id: None,
            doc_type,
            user_id,
            date_start,
            date_end: None,
            description: String::new(),
        }
    }

    /// Sets the last covered day.
    #[must_use]
    pub fn until(mut self, date_end: NaiveDate) -> Self {
        self.date_end = Some(date_end);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the document covers `day`.
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        day >= self.date_start && self.date_end.map_or(day == self.date_start, |end| day <= end)
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        match (self.doc_type, self.date_end) {
            (DocType::Incapacity, None) => Err(AppError::validation("an incapacity needs an end date")),
            (_, Some(end)) if end < self.date_start => {
                Err(AppError::validation("end date is before start date"))
            }
            _ => Ok(()),
        }
    }
}

impl Entity for Document {
    const COLLECTION: &'static str = DOCUMENTS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldsync_core::Record;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn goal_wire_format_is_camel_case() {
        let record = Goal::new(3, "Centro", "Plan A", 40).to_record().unwrap();
        assert_eq!(
            record.into_value(),
            json!({"month": 3, "branch": "Centro", "product": "Plan A", "targetQuantity": 40})
        );
    }

    #[test]
    fn promoter_tolerates_sparse_records() {
        let record = Record::from_value(json!({"id": 4, "name": "Ana", "branch": "Sur", "extra": true})).unwrap();
        let promoter = Promoter::from_record(&record).unwrap();
        assert_eq!(promoter.id, Some(4));
        assert_eq!(promoter.total_assists, 0);
        assert_eq!(promoter.last_assistance, None);
    }

    #[test]
    fn goal_validation() {
        assert!(Goal::new(0, "X", "A", 1).validate().is_err());
        assert!(Goal::new(13, "X", "A", 1).validate().is_err());
        assert!(Goal::new(12, "X", "A", 0).validate().is_err());
        assert!(Goal::new(12, " ", "A", 1).validate().is_err());
        assert!(Goal::new(1, "X", "A", 1).validate().is_ok());
    }

    #[test]
    fn evidence_key_and_validation() {
        let date = day("2024-05-02");
        assert_eq!(AttendanceEvidence::key(7, date), "7_2024-05-02");

        assert!(AttendanceEvidence::new(7, date).validate().is_err());
        assert!(AttendanceEvidence::new(7, date).check_in("09:00", false).validate().is_err());
        assert!(AttendanceEvidence::new(7, date).check_in("9am", true).validate().is_err());
        assert!(AttendanceEvidence::new(7, date)
            .check_in("09:00", true)
            .check_out("18:00", false)
            .validate()
            .is_err());
        assert!(AttendanceEvidence::new(7, date)
            .check_in("09:00", true)
            .check_out("08:00", true)
            .validate()
            .is_err());
        assert!(AttendanceEvidence::new(7, date)
            .check_in("09:00", true)
            .check_out("18:00", true)
            .validate()
            .is_ok());
    }

    #[test]
    fn document_validation() {
        let start = day("2024-05-02");
        assert!(Document::new(DocType::Incapacity, 1, start).validate().is_err());
        assert!(Document::new(DocType::Incapacity, 1, start)
            .until(day("2024-05-01"))
            .validate()
            .is_err());
        assert!(Document::new(DocType::Incapacity, 1, start)
            .until(start)
            .validate()
            .is_ok());
        assert!(Document::new(DocType::WeeklyReport, 1, start).validate().is_ok());
    }

    #[test]
    fn document_coverage() {
        let doc = Document::new(DocType::Incapacity, 1, day("2024-05-02")).until(day("2024-05-05"));
        assert!(doc.covers(day("2024-05-05")));
        assert!(!doc.covers(day("2024-05-06")));
        assert!(!doc.covers(day("2024-05-01")));
    }

    #[test]
    fn doc_type_wire_names() {
        assert_eq!(serde_json::to_value(DocType::WeeklyReport).unwrap(), json!("WeeklyReport"));
    }

    #[test]
    fn schedule_validation() {
        assert!(Schedule::new(1, Weekday::Mon, "09:00", "18:00").validate().is_ok());
        assert!(Schedule::new(1, Weekday::Mon, "18:00", "09:00").validate().is_err());
        assert!(Schedule::new(1, Weekday::Mon, "nine", "18:00").validate().is_err());
    }
}
