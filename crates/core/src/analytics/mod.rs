//! Spending analytics over already-fetched expense records.
//!
//! The db crate narrows the rows by owner and date range; everything here is
//! grouping, summing, and the naive linear month-end projection.

pub mod error;
pub mod service;
pub mod types;


pub use error::AnalyticsError;
pub use service::{AnalyticsService, MAX_DAILY_TREND_DAYS, days_in_month};
pub use types::{
    CategoryProjection, CategorySpending, Granularity, MonthlyProjection, SpendingOverview,
    TrendPoint,
};
