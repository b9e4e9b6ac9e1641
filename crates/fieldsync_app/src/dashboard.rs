//! Monthly goal progress.

use crate::error::{AppError, AppResult};
use crate::model::{Goal, Sale};
use chrono::Datelike;
use fieldsync_core::{Store, TypedCollection};
use std::collections::BTreeMap;

/// Target and achieved units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Units targeted by goals.
    pub target: u64,
    /// Units sold.
    pub sold: u64,
}

impl Progress {
    /// Percentage of the target reached, rounded; 0 without a target.
    #[must_use]
    pub fn pct(&self) -> u64 {
        if self.target == 0 {
            return 0;
        }
        (self.sold * 100 + self.target / 2) / self.target
    }

    fn add(&mut self, other: Progress) {
        self.target += other.target;
        self.sold += other.sold;
    }
}

/// Progress of one month, in total and broken down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyProgress {
    /// Month, 1 to 12.
    pub month: u32,
    /// Year.
    pub year: i32,
    /// Sum over every product and branch.
    pub total: Progress,
    /// Per product.
    pub by_product: BTreeMap<String, Progress>,
    /// Per branch.
    pub by_branch: BTreeMap<String, Progress>,
}

impl MonthlyProgress {
    fn record(&mut self, product: &str, branch: &str, delta: Progress) {
        self.total.add(delta);
        self.by_product.entry(product.to_string()).or_default().add(delta);
        self.by_branch.entry(branch.to_string()).or_default().add(delta);
    }
}

/// Sums the goals of `month` and the sales dated in `month` of `year`.
///
/// Goals carry no year and apply to the month of every year.
pub fn monthly_progress(store: &Store, month: u32, year: i32) -> AppResult<MonthlyProgress> {
    if !(1..=12).contains(&month) {
        return Err(AppError::validation(format!("month must be 1-12, got {month}")));
    }

    let mut progress = MonthlyProgress {
        month,
        year,
        ..MonthlyProgress::default()
    };

    for goal in TypedCollection::<Goal>::new(store).all()? {
        if goal.month == month {
            let delta = Progress {
                target: u64::from(goal.target_quantity),
                sold: 0,
            };
            progress.record(&goal.product, &goal.branch, delta);
        }
    }

    for sale in TypedCollection::<Sale>::new(store).all()? {
        if sale.date.month() == month && sale.date.year() == year {
            let delta = Progress {
                target: 0,
                sold: u64::from(sale.quantity),
            };
            progress.record(&sale.product, &sale.branch, delta);
        }
    }

    Ok(progress)
}
