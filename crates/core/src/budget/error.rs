//! Budget rule violations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Budget field errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetRuleError {
    /// Month outside 1..=12.
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// Year outside the supported window.
    #[error("Year must be between {min} and {max}, got {got}")]
    InvalidYear {
        /// Lowest accepted year.
        min: i32,
        /// Highest accepted year.
        max: i32,
        /// Year supplied.
        got: i32,
    },

    /// Limit is zero or negative.
    #[error("Budget limit must be greater than zero")]
    NonPositiveLimit,

    /// Limit has more fractional digits than the store keeps.
    #[error("Budget limit cannot have more than {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum allowed scale.
        max: u32,
    },

    /// Limit is larger than the store accepts.
    #[error("Budget limit cannot exceed {max}")]
    LimitTooLarge {
        /// Largest accepted limit.
        max: Decimal,
    },

    /// Alert threshold outside 1..=100.
    #[error("Alert threshold must be between 1 and 100, got {0}")]
    InvalidThreshold(i32),
}
