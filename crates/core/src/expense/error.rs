//! Expense rule violations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::ExpenseStatus;

/// Errors raised when an expense operation breaks a domain rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpenseRuleError {
    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has more fractional digits than the store keeps.
    #[error("Amount cannot have more than {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum allowed scale.
        max: u32,
    },

    /// Amount is larger than the store accepts.
    #[error("Amount cannot exceed {max}")]
    AmountTooLarge {
        /// Largest accepted amount.
        max: Decimal,
    },

    /// Currency is not a three-letter code.
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    /// Description is blank.
    #[error("Description is required")]
    EmptyDescription,

    /// Description exceeds the maximum length.
    #[error("Description cannot exceed {max} characters")]
    DescriptionTooLong {
        /// Maximum allowed length.
        max: usize,
    },

    /// Expense date lies in the future.
    #[error("Expense date {0} is in the future")]
    FutureDate(NaiveDate),

    /// Date range start is after its end.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange {
        /// Range start.
        from: NaiveDate,
        /// Range end.
        to: NaiveDate,
    },

    /// Status transition is not allowed.
    #[error("Cannot change expense status from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ExpenseStatus,
        /// Requested status.
        to: ExpenseStatus,
    },

    /// Only pending expenses can be edited.
    #[error("Expense is {0} and can no longer be edited")]
    NotEditable(ExpenseStatus),

    /// Approved expenses cannot be deleted.
    #[error("Expense is {0} and cannot be deleted")]
    NotDeletable(ExpenseStatus),

    /// A reviewer cannot review their own expense.
    #[error("You cannot review your own expense")]
    SelfReview,

    /// Rejections must carry a reason.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// Expense is not attributed to a team, so nobody can review it.
    #[error("Expense is not attributed to a team")]
    NoTeam,
}

impl ExpenseRuleError {
    /// True for bad input fields, false for workflow violations.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NonPositiveAmount
                | Self::TooManyDecimalPlaces { .. }
                | Self::AmountTooLarge { .. }
                | Self::InvalidCurrency(_)
                | Self::EmptyDescription
                | Self::DescriptionTooLong { .. }
                | Self::FutureDate(_)
                | Self::InvalidDateRange { .. }
                | Self::RejectionReasonRequired
        )
    }
}
