//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// TTL outside the accepted window.
    #[error("Report TTL must be between 1 and {max} days, got {got}")]
    InvalidTtl {
        /// Longest accepted TTL.
        max: u32,
        /// TTL requested.
        got: u32,
    },

    /// Blank report name.
    #[error("Report name must not be empty")]
    EmptyName,

    /// Report name too long.
    #[error("Report name must be at most {max} characters")]
    NameTooLong {
        /// Longest accepted name.
        max: usize,
    },
}
