//! Budget data types.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expense::{ExpenseCategory, ExpenseRecord};

/// Threshold used when a budget is created without one.
pub const DEFAULT_ALERT_THRESHOLD: i32 = 80;

/// Identifies the budget an expense contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BudgetKey {
    /// Budget owner.
    pub user_id: Uuid,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1..=12.
    pub month: u32,
}

impl BudgetKey {
    /// The key an expense record falls under.
    #[must_use]
    pub fn for_record(record: &ExpenseRecord) -> Self {
        Self {
            user_id: record.user_id,
            category: record.category,
            year: record.expense_date.year(),
            month: record.expense_date.month(),
        }
    }
}

/// Signed change to apply to one budget's `current_spent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetDelta {
    /// Budget the change applies to.
    pub key: BudgetKey,
    /// Amount to add (negative to subtract).
    pub delta: Decimal,
}

/// Editable budget fields, validated together.
#[derive(Debug, Clone, Copy)]
pub struct BudgetFields {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Spending limit.
    pub limit_amount: Decimal,
    /// Alert threshold percent.
    pub alert_threshold: i32,
}

/// Derived view of a budget's health.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Limit minus spent; negative once over budget.
    pub remaining: Decimal,
    /// Spent as a percentage of the limit, 2 dp.
    pub utilization_percent: Decimal,
    /// Spent exceeds the limit.
    pub is_over_budget: bool,
    /// Utilization has reached the alert threshold.
    pub is_near_limit: bool,
}

/// Alert raised when a write pushes spending over a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAlert {
    /// Utilization crossed the alert threshold.
    Warning,
    /// Spending crossed the limit.
    Exceeded,
}
