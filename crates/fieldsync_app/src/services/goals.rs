use super::int_id;
use crate::error::{AppError, AppResult};
use crate::model::Goal;
use crate::schema::GOALS;
use fieldsync_core::{RecordId, Store, TypedCollection};

/// Monthly sales goals.
pub struct GoalService<'s> {
    store: &'s Store,
}

impl<'s> GoalService<'s> {
    /// Creates the service.
    #[must_use]
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    fn typed(&self) -> TypedCollection<'s, Goal> {
        TypedCollection::new(self.store)
    }

    /// Adds a goal and returns its id.
    ///
    /// # Errors
    ///
    /// `DuplicateGoal` if a goal for the same month, branch and product
    /// exists.
    pub fn add(&self, goal: &Goal) -> AppResult<i64> {
        goal.validate()?;
        let fresh = Goal {
            id: None,
            ..goal.clone()
        };
        match self.typed().put(&fresh) {
            Ok(id) => int_id(GOALS, &id),
            Err(err) if err.is_constraint_violation() => Err(AppError::DuplicateGoal {
                month: fresh.month,
                branch: fresh.branch,
                product: fresh.product,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Lists every goal ordered by id.
    pub fn list(&self) -> AppResult<Vec<Goal>> {
        Ok(self.typed().all()?)
    }

    /// Lists the goals of a month.
    pub fn for_month(&self, month: u32) -> AppResult<Vec<Goal>> {
        Ok(self.list()?.into_iter().filter(|g| g.month == month).collect())
    }

    /// Removes a goal.
    pub fn remove(&self, id: i64) -> AppResult<()> {
        Ok(self.typed().remove(&RecordId::Int(id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::app_schema;

    #[test]
    fn duplicate_goal_is_reported_distinctly() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let goals = GoalService::new(&store);

        goals.add(&Goal::new(3, "Centro", "Plan A", 40)).unwrap();
        let err = goals.add(&Goal::new(3, "Centro", "Plan A", 10)).unwrap_err();
        assert!(matches!(err, AppError::DuplicateGoal { month: 3, .. }));

        goals.add(&Goal::new(4, "Centro", "Plan A", 10)).unwrap();
        assert_eq!(goals.list().unwrap().len(), 2);
        assert_eq!(goals.for_month(3).unwrap()[0].target_quantity, 40);
    }

    #[test]
    fn removed_goal_frees_its_key() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let goals = GoalService::new(&store);

        let id = goals.add(&Goal::new(1, "Sur", "Plan B", 5)).unwrap();
        goals.remove(id).unwrap();
        goals.add(&Goal::new(1, "Sur", "Plan B", 7)).unwrap();
        assert_eq!(goals.list().unwrap()[0].target_quantity, 7);
    }

    #[test]
    fn invalid_goal_is_not_written() {
        let store = Store::open_in_memory(app_schema()).unwrap();
        let goals = GoalService::new(&store);

        assert!(matches!(goals.add(&Goal::new(13, "Sur", "Plan B", 5)), Err(AppError::Validation(_))));
        assert_eq!(store.revision(), 0);
    }
}
