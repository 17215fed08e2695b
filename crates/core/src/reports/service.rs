//! Report generation service.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{ReportFilters, ReportStatistics};
use crate::expense::ExpenseRecord;

/// Longest report name accepted.
pub const MAX_REPORT_NAME_LEN: usize = 255;

/// Service for generating expense reports.
pub struct ReportService;

impl ReportService {
    /// Validates a report request before any data is read.
    pub fn validate(name: &str, filters: &ReportFilters) -> Result<(), ReportError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReportError::EmptyName);
        }
        if name.chars().count() > MAX_REPORT_NAME_LEN {
            return Err(ReportError::NameTooLong {
                max: MAX_REPORT_NAME_LEN,
            });
        }
        if let (Some(start), Some(end)) = (filters.date_from, filters.date_to) {
            if start > end {
                return Err(ReportError::InvalidDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Resolves the requested TTL against the configured default and ceiling.
    pub fn resolve_ttl(
        requested: Option<u32>,
        default_days: u32,
        max_days: u32,
    ) -> Result<u32, ReportError> {
        let ttl = requested.unwrap_or(default_days);
        if ttl == 0 || ttl > max_days {
            return Err(ReportError::InvalidTtl {
                max: max_days,
                got: ttl,
            });
        }
        Ok(ttl)
    }

    /// Expiry timestamp for a report generated at `now`.
    #[must_use]
    pub fn expires_at(now: DateTime<Utc>, ttl_days: u32) -> DateTime<Utc> {
        now + Duration::days(i64::from(ttl_days))
    }

    /// A report is gone once its expiry has passed.
    #[must_use]
    pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        expires_at <= now
    }

    /// Computes statistics over the records matching `filters`.
    #[must_use]
    pub fn compute_statistics<'a, I>(records: I, filters: &ReportFilters) -> ReportStatistics
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let mut stats = ReportStatistics::default();

        for record in records.into_iter().filter(|r| filters.matches(r)) {
            stats.count += 1;
            stats.total += record.amount;
            stats.min = Some(stats.min.map_or(record.amount, |m| m.min(record.amount)));
            stats.max = Some(stats.max.map_or(record.amount, |m| m.max(record.amount)));
            stats
                .by_category
                .entry(record.category)
                .or_default()
                .add(record.amount);
            stats
                .by_status
                .entry(record.status)
                .or_default()
                .add(record.amount);
        }

        stats.average = if stats.count == 0 {
            Decimal::ZERO
        } else {
            (stats.total / Decimal::from(stats.count)).round_dp(2)
        };

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case(None, Ok(30))]
    #[case(Some(1), Ok(1))]
    #[case(Some(365), Ok(365))]
    #[case(Some(0), Err(ReportError::InvalidTtl { max: 365, got: 0 }))]
    #[case(Some(366), Err(ReportError::InvalidTtl { max: 365, got: 366 }))]
    fn test_resolve_ttl(#[case] requested: Option<u32>, #[case] expected: Result<u32, ReportError>) {
        assert_eq!(ReportService::resolve_ttl(requested, 30, 365), expected);
    }

    #[test]
    fn test_validate_name_and_range() {
        let filters = ReportFilters::default();
        assert_eq!(ReportService::validate("  ", &filters), Err(ReportError::EmptyName));
        assert_eq!(
            ReportService::validate(&"x".repeat(256), &filters),
            Err(ReportError::NameTooLong { max: 255 })
        );

        let start = NaiveDate::from_ymd_opt(2025, 5, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let backwards = ReportFilters {
            date_from: Some(start),
            date_to: Some(end),
            ..ReportFilters::default()
        };
        assert_eq!(
            ReportService::validate("May", &backwards),
            Err(ReportError::InvalidDateRange { start, end })
        );
        assert!(ReportService::validate("May", &filters).is_ok());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let expires = ReportService::expires_at(now, 30);
        assert_eq!(expires - now, Duration::days(30));
        assert!(!ReportService::is_expired(expires, now));
        assert!(ReportService::is_expired(expires, expires));
    }
}
