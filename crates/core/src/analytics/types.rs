//! Analytics data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::expense::ExpenseCategory;

/// Spending in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpending {
    /// Category.
    pub category: ExpenseCategory,
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of expenses.
    pub count: u64,
    /// Share of the grand total, percent, 2 dp.
    pub percentage: Decimal,
}

/// Trend bucket size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar day.
    #[default]
    Day,
    /// One bucket per calendar month.
    Month,
}

/// One bucket of a spending trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// First day covered by the bucket.
    pub period_start: NaiveDate,
    /// `YYYY-MM-DD` or `YYYY-MM`.
    pub label: String,
    /// Sum of amounts.
    pub total: Decimal,
    /// Number of expenses.
    pub count: u64,
}

/// Month-end projection for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProjection {
    /// Category.
    pub category: ExpenseCategory,
    /// Spent so far.
    pub spent: Decimal,
    /// Projected month-end spending.
    pub projected: Decimal,
    /// Limit of the matching budget, if one exists.
    pub budget_limit: Option<Decimal>,
    /// Projection exceeds the budget limit.
    pub projected_over_budget: bool,
}

/// Month-end projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    /// Year projected.
    pub year: i32,
    /// Month projected.
    pub month: u32,
    /// Days in the month.
    pub days_in_month: u32,
    /// Days of data the projection is based on.
    pub days_elapsed: u32,
    /// Spent so far.
    pub spent: Decimal,
    /// Spent per elapsed day, 2 dp.
    pub daily_average: Decimal,
    /// Projected month-end total, 2 dp.
    pub projected_total: Decimal,
    /// Per-category breakdown.
    pub categories: Vec<CategoryProjection>,
}

/// Dashboard numbers for the current month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendingOverview {
    /// Year covered.
    pub year: i32,
    /// Month covered.
    pub month: u32,
    /// Pending plus approved spending this month.
    pub month_total: Decimal,
    /// Pending expenses this month.
    pub pending_count: u64,
    /// Pending amount this month.
    pub pending_total: Decimal,
    /// Approved amount this month.
    pub approved_total: Decimal,
    /// Budgets this month whose spending exceeds the limit.
    pub budgets_over_limit: u64,
    /// Unread notifications.
    pub unread_notifications: u64,
}
