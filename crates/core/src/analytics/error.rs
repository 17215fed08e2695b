//! Analytics error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Invalid analytics requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// Start after end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Daily trend over too many days.
    #[error("Daily trend range is limited to {max_days} days")]
    RangeTooLarge {
        /// Longest accepted range.
        max_days: i64,
    },

    /// Month outside 1..=12 or unrepresentable.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        /// Year requested.
        year: i32,
        /// Month requested.
        month: u32,
    },

    /// Projection asked for a month that has not started.
    #[error("Cannot project a future month: {year}-{month:02}")]
    FutureMonth {
        /// Year requested.
        year: i32,
        /// Month requested.
        month: u32,
    },
}
