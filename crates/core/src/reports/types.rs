//! Report data types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::expense::{ExpenseCategory, ExpenseRecord, ExpenseStatus};

/// Which expenses a report covers. Stored verbatim with the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    /// Earliest expense date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Latest expense date, inclusive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    /// Only this category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    /// Only this status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ExpenseStatus>,
    /// Only expenses attributed to this team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
}

impl ReportFilters {
    /// Returns true if the record passes every set filter.
    #[must_use]
    pub fn matches(&self, record: &ExpenseRecord) -> bool {
        self.date_from.is_none_or(|from| record.expense_date >= from)
            && self.date_to.is_none_or(|to| record.expense_date <= to)
            && self.category.is_none_or(|c| record.category == c)
            && self.status.is_none_or(|s| record.status == s)
            && self.team_id.is_none_or(|t| record.team_id == Some(t))
    }
}

/// Count and total of one slice of the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Number of expenses.
    pub count: u64,
    /// Sum of amounts.
    pub total: Decimal,
}

impl BreakdownEntry {
    pub(crate) fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.total += amount;
    }
}

/// Aggregates stored with a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStatistics {
    /// Number of matching expenses.
    pub count: u64,
    /// Sum of amounts.
    pub total: Decimal,
    /// Mean amount, 2 dp. Zero for an empty report.
    pub average: Decimal,
    /// Smallest amount.
    pub min: Option<Decimal>,
    /// Largest amount.
    pub max: Option<Decimal>,
    /// Breakdown per category.
    pub by_category: BTreeMap<ExpenseCategory, BreakdownEntry>,
    /// Breakdown per status.
    pub by_status: BTreeMap<ExpenseStatus, BreakdownEntry>,
}
