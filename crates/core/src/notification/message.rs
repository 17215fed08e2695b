//! In-app notification messages.
//!
//! Builders return the title and body for each event; the repository layer
//! attaches the recipient and reference id and stores them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::budget::BudgetAlert;
use crate::expense::ExpenseCategory;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A team member submitted an expense for review.
    ExpenseSubmitted,
    /// The recipient's expense was approved.
    ExpenseApproved,
    /// The recipient's expense was rejected.
    ExpenseRejected,
    /// A budget passed its alert threshold.
    BudgetWarning,
    /// A budget passed its limit.
    BudgetExceeded,
    /// The recipient was added to a team.
    TeamAdded,
}

impl NotificationKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ExpenseSubmitted => "expense_submitted",
            Self::ExpenseApproved => "expense_approved",
            Self::ExpenseRejected => "expense_rejected",
            Self::BudgetWarning => "budget_warning",
            Self::BudgetExceeded => "budget_exceeded",
            Self::TeamAdded => "team_added",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BudgetAlert> for NotificationKind {
    fn from(alert: BudgetAlert) -> Self {
        match alert {
            BudgetAlert::Warning => Self::BudgetWarning,
            BudgetAlert::Exceeded => Self::BudgetExceeded,
        }
    }
}

/// Title and body of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// Kind.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
}

impl NotificationMessage {
    /// Sent to a team manager when a member submits an expense.
    #[must_use]
    pub fn expense_submitted(
        submitter: &str,
        amount: Decimal,
        currency: &str,
        description: &str,
    ) -> Self {
        Self {
            kind: NotificationKind::ExpenseSubmitted,
            title: "New expense awaiting approval".to_string(),
            message: format!("{submitter} submitted {amount} {currency}: {description}"),
        }
    }

    /// Sent to the submitter when an expense is approved.
    #[must_use]
    pub fn expense_approved(amount: Decimal, currency: &str, notes: Option<&str>) -> Self {
        let message = match notes {
            Some(notes) => format!("Your expense of {amount} {currency} was approved. Notes: {notes}"),
            None => format!("Your expense of {amount} {currency} was approved."),
        };
        Self {
            kind: NotificationKind::ExpenseApproved,
            title: "Expense approved".to_string(),
            message,
        }
    }

    /// Sent to the submitter when an expense is rejected.
    #[must_use]
    pub fn expense_rejected(amount: Decimal, currency: &str, reason: &str) -> Self {
        Self {
            kind: NotificationKind::ExpenseRejected,
            title: "Expense rejected".to_string(),
            message: format!("Your expense of {amount} {currency} was rejected. Reason: {reason}"),
        }
    }

    /// Sent to a budget owner when a write crosses a budget line.
    #[must_use]
    pub fn budget_alert(
        alert: BudgetAlert,
        category: ExpenseCategory,
        year: i32,
        month: u32,
        spent: Decimal,
        limit: Decimal,
        utilization_percent: Decimal,
    ) -> Self {
        let (title, message) = match alert {
            BudgetAlert::Warning => (
                format!("Budget warning: {category}"),
                format!(
                    "You have used {utilization_percent}% of your {category} budget for \
                     {year}-{month:02} ({spent} of {limit})."
                ),
            ),
            BudgetAlert::Exceeded => (
                format!("Budget exceeded: {category}"),
                format!(
                    "Your {category} spending for {year}-{month:02} is {spent}, over the \
                     limit of {limit}."
                ),
            ),
        };
        Self {
            kind: alert.into(),
            title,
            message,
        }
    }

    /// Sent to a user added to a team.
    #[must_use]
    pub fn team_added(team_name: &str, manager_name: &str) -> Self {
        Self {
            kind: NotificationKind::TeamAdded,
            title: format!("Added to {team_name}"),
            message: format!("{manager_name} added you to the team {team_name}."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_strings() {
        assert_eq!(NotificationKind::BudgetExceeded.to_string(), "budget_exceeded");
        assert_eq!(
            serde_json::to_string(&NotificationKind::TeamAdded).unwrap(),
            "\"team_added\""
        );
        assert_eq!(
            NotificationKind::from(BudgetAlert::Warning),
            NotificationKind::BudgetWarning
        );
    }

    #[test]
    fn test_budget_alert_messages() {
        let warning = NotificationMessage::budget_alert(
            BudgetAlert::Warning,
            ExpenseCategory::OfficeSupplies,
            2025,
            3,
            dec!(85),
            dec!(100),
            dec!(85.00),
        );
        assert_eq!(warning.kind, NotificationKind::BudgetWarning);
        assert_eq!(warning.title, "Budget warning: office_supplies");
        assert!(warning.message.contains("2025-03"));
        assert!(warning.message.contains("85.00%"));

        let exceeded = NotificationMessage::budget_alert(
            BudgetAlert::Exceeded,
            ExpenseCategory::Meals,
            2025,
            11,
            dec!(120),
            dec!(100),
            dec!(120.00),
        );
        assert_eq!(exceeded.kind, NotificationKind::BudgetExceeded);
        assert!(exceeded.message.contains("over the limit of 100"));
    }

    #[test]
    fn test_review_messages() {
        let approved = NotificationMessage::expense_approved(dec!(12.50), "USD", None);
        assert_eq!(approved.message, "Your expense of 12.50 USD was approved.");

        let rejected = NotificationMessage::expense_rejected(dec!(12.50), "EUR", "no receipt");
        assert_eq!(rejected.kind, NotificationKind::ExpenseRejected);
        assert!(rejected.message.ends_with("Reason: no receipt"));
    }
}
