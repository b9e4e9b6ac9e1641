use super::refers_to;
use crate::error::{AppError, AppResult};
use crate::model::Schedule;
use crate::schema::SCHEDULES;
use fieldsync_core::{CoreResult, Entity, RecordId, Store, TypedCollection};
use std::collections::HashSet;

/// Weekly schedules.
pub struct ScheduleService<'s> {
    store: &'s Store,
}

impl<'s> ScheduleService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Replaces a promoter's weekly schedule, keeping everyone else's.
    ///
    /// Each weekday may appear once. Returns the number of rows written.
    pub fn replace_for_user(&self, user_id: i64, days: &[Schedule]) -> AppResult<usize> {
        let mut seen = HashSet::new();
        for day in days {
            day.validate()?;
            if !seen.insert(day.weekday) {
                return Err(AppError::validation(format!("{} is scheduled twice", day.weekday)));
            }
        }

        let written = self.store.transaction(|txn| {
            let stale: Vec<RecordId> = txn
                .get_all(SCHEDULES)?
                .iter()
                .filter(|record| refers_to(record, "userId", user_id))
                .filter_map(|record| record.id())
                .collect();
            for id in &stale {
                txn.remove(SCHEDULES, id)?;
            }
            for day in days {
                let row = Schedule {
                    id: None,
                    user_id,
                    ..day.clone()
                };
                txn.put(SCHEDULES, row.to_record()?)?;
            }
            Ok(days.len())
        })?;
        tracing::debug!(user = user_id, days = written, "schedule replaced");
        Ok(written)
    }

    /// Returns a promoter's schedule from Monday to Sunday.
    pub fn for_user(&self, user_id: i64) -> AppResult<Vec<Schedule>> {
        let mut rows: Vec<Schedule> = TypedCollection::<Schedule>::new(self.store)
            .all()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        rows.sort_by_key(|s| s.weekday.num_days_from_monday());
        Ok(rows)
    }

    /// Lists every schedule row.
    pub fn list(&self) -> AppResult<Vec<Schedule>> {
        Ok(self
            .store
            .get_all(SCHEDULES)?
            .iter()
            .map(Schedule::from_record)
            .collect::<CoreResult<_>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::app_schema;
    use chrono::Weekday;

    #[test]
    fn replace_keeps_other_users() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let schedules = ScheduleService::new(&store);

        schedules
            .replace_for_user(1, &[Schedule::new(1, Weekday::Mon, "09:00", "17:00")])
            .unwrap();
        schedules
            .replace_for_user(
                2,
                &[
                    Schedule::new(2, Weekday::Fri, "10:00", "18:00"),
                    Schedule::new(2, Weekday::Tue, "10:00", "18:00"),
                ],
            )
            .unwrap();
        schedules
            .replace_for_user(1, &[Schedule::new(1, Weekday::Wed, "08:00", "12:00")])
            .unwrap();

        let ana = schedules.for_user(1).unwrap();
        assert_eq!(ana.len(), 1);
        assert_eq!(ana[0].weekday, Weekday::Wed);

        let luis: Vec<_> = schedules.for_user(2).unwrap().iter().map(|s| s.weekday).collect();
        assert_eq!(luis, vec![Weekday::Tue, Weekday::Fri]);
        assert_eq!(schedules.list().unwrap().len(), 3);
    }

    #[test]
    fn row_user_is_forced_to_target() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let schedules = ScheduleService::new(&store);
        schedules
            .replace_for_user(3, &[Schedule::new(9, Weekday::Sat, "09:00", "13:00")])
            .unwrap();
        assert_eq!(schedules.for_user(3).unwrap().len(), 1);
        assert!(schedules.for_user(9).unwrap().is_empty());
    }

    #[test]
    fn invalid_week_leaves_schedule_untouched() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let schedules = ScheduleService::new(&store);
        schedules
            .replace_for_user(1, &[Schedule::new(1, Weekday::Mon, "09:00", "17:00")])
            .unwrap();

        let twice = [
            Schedule::new(1, Weekday::Tue, "09:00", "12:00"),
            Schedule::new(1, Weekday::Tue, "13:00", "17:00"),
        ];
        assert!(matches!(schedules.replace_for_user(1, &twice), Err(AppError::Validation(_))));
        assert!(schedules
            .replace_for_user(1, &[Schedule::new(1, Weekday::Tue, "17:00", "09:00")])
            .is_err());

        assert_eq!(schedules.for_user(1).unwrap()[0].weekday, Weekday::Mon);
    }

    #[test]
    fn empty_week_clears_user() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let schedules = ScheduleService::new(&store);
        schedules
            .replace_for_user(1, &[Schedule::new(1, Weekday::Mon, "09:00", "17:00")])
            .unwrap();
        assert_eq!(schedules.replace_for_user(1, &[]).unwrap(), 0);
        assert!(schedules.for_user(1).unwrap().is_empty());
    }
}
