use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shelf_types::{Isbn, StudentId};

/// How long a book may be kept and what each late day costs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    /// Days a loan may run before fines start.
    pub grace_days: i64,
    /// Fine charged per whole day beyond the grace period.
    pub daily_fine: Decimal,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            grace_days: 15,
            daily_fine: Decimal::new(50, 2),
        }
    }
}

impl FinePolicy {
    /// Whole days past the grace period; zero while still within it.
    pub fn days_overdue(&self, elapsed_days: i64) -> i64 {
        (elapsed_days - self.grace_days).max(0)
    }

    /// Fine owed after `elapsed_days`; `None` when the amount overflows.
    pub fn fine_for(&self, elapsed_days: i64) -> Option<Decimal> {
        Decimal::from(self.days_overdue(elapsed_days)).checked_mul(self.daily_fine)
    }

    pub fn is_overdue(&self, elapsed_days: i64) -> bool {
        elapsed_days > self.grace_days
    }
}

/// One line of the overdue report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OverdueEntry {
    pub title: String,
    pub isbn: Isbn,
    pub borrower: Option<StudentId>,
    pub issued_at: DateTime<Utc>,
    pub days_overdue: i64,
    pub fine: Decimal,
}
