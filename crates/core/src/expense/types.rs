//! Expense status, category, and the budget-relevant view of an expense.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Expense status in the review workflow.
///
/// Valid transitions:
/// - Pending → Approved (approve)
/// - Pending → Rejected (reject)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    /// Submitted and awaiting review.
    Pending,
    /// Approved by the team manager.
    Approved,
    /// Rejected by the team manager.
    Rejected,
}

impl ExpenseStatus {
    /// All statuses in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if an expense in this status counts toward budget spending.
    #[must_use]
    pub const fn counts_toward_budget(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Returns true if the owner may still edit the expense.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the owner may delete the expense.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        !matches!(self, Self::Approved)
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Spending category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Flights, hotels, and other trip costs.
    Travel,
    /// Food and drink.
    Meals,
    /// Local transport, taxis, fuel.
    Transport,
    /// Stationery and consumables.
    OfficeSupplies,
    /// Software licences and subscriptions.
    Software,
    /// Hardware and durable equipment.
    Equipment,
    /// Phone, internet, power.
    Utilities,
    /// Client entertainment.
    Entertainment,
    /// Courses, books, conferences.
    Training,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// All categories in display order.
    pub const ALL: [Self; 10] = [
        Self::Travel,
        Self::Meals,
        Self::Transport,
        Self::OfficeSupplies,
        Self::Software,
        Self::Equipment,
        Self::Utilities,
        Self::Entertainment,
        Self::Training,
        Self::Other,
    ];

    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Meals => "meals",
            Self::Transport => "transport",
            Self::OfficeSupplies => "office_supplies",
            Self::Software => "software",
            Self::Equipment => "equipment",
            Self::Utilities => "utilities",
            Self::Entertainment => "entertainment",
            Self::Training => "training",
            Self::Other => "other",
        }
    }

    /// Parses a category, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == lowered)
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fields of an expense that budgets, analytics, and reports look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    /// Expense owner.
    pub user_id: Uuid,
    /// Team the expense is attributed to.
    pub team_id: Option<Uuid>,
    /// Spending category.
    pub category: ExpenseCategory,
    /// Amount spent.
    pub amount: Decimal,
    /// Review status.
    pub status: ExpenseStatus,
    /// Date the money was spent.
    pub expense_date: NaiveDate,
}

impl ExpenseRecord {
    /// Amount this expense adds to its budget's `current_spent`.
    #[must_use]
    pub fn budget_contribution(&self) -> Decimal {
        if self.status.counts_toward_budget() {
            self.amount
        } else {
            Decimal::ZERO
        }
    }

    /// Returns true if the expense falls in the given calendar month.
    #[must_use]
    pub fn is_in_month(&self, year: i32, month: u32) -> bool {
        self.expense_date.year() == year && self.expense_date.month() == month
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_round_trip_and_rules() {
        for status in ExpenseStatus::ALL {
            assert_eq!(ExpenseStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ExpenseStatus::parse("approved"), Some(ExpenseStatus::Approved));
        assert_eq!(ExpenseStatus::parse("draft"), None);

        assert!(ExpenseStatus::Pending.counts_toward_budget());
        assert!(ExpenseStatus::Approved.counts_toward_budget());
        assert!(!ExpenseStatus::Rejected.counts_toward_budget());

        assert!(ExpenseStatus::Pending.is_editable());
        assert!(!ExpenseStatus::Rejected.is_editable());
        assert!(ExpenseStatus::Rejected.is_deletable());
        assert!(!ExpenseStatus::Approved.is_deletable());
    }

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&ExpenseStatus::Pending).unwrap(),
            "\"PENDING\""
        );
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            ExpenseCategory::parse("Office_Supplies"),
            Some(ExpenseCategory::OfficeSupplies)
        );
        assert_eq!(ExpenseCategory::parse("groceries"), None);
        assert_eq!(
            serde_json::to_string(&ExpenseCategory::OfficeSupplies).unwrap(),
            "\"office_supplies\""
        );
    }

    #[test]
    fn test_rejected_expense_contributes_nothing() {
        let mut record = ExpenseRecord {
            user_id: Uuid::nil(),
            team_id: None,
            category: ExpenseCategory::Meals,
            amount: dec!(42.50),
            status: ExpenseStatus::Pending,
            expense_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        };
        assert_eq!(record.budget_contribution(), dec!(42.50));
        assert!(record.is_in_month(2026, 3));
        assert!(!record.is_in_month(2026, 4));

        record.status = ExpenseStatus::Rejected;
        assert_eq!(record.budget_contribution(), Decimal::ZERO);
    }
}
