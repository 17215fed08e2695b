//! Expense report snapshots.
//!
//! A report is a named, expiring snapshot of statistics over the caller's
//! expenses that match a filter. This module computes the statistics and
//! the expiry; the db crate stores them.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::{MAX_REPORT_NAME_LEN, ReportService};
pub use types::*;
