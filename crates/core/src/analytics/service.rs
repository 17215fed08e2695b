//! Analytics calculations.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use super::error::AnalyticsError;
use super::types::{
    CategoryProjection, CategorySpending, Granularity, MonthlyProjection, SpendingOverview,
    TrendPoint,
};
use crate::expense::{ExpenseCategory, ExpenseRecord, ExpenseStatus};

/// Longest range a daily trend may cover, in days.
pub const MAX_DAILY_TREND_DAYS: i64 = 366;

/// Number of days in a calendar month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, AnalyticsError> {
    let first = first_of_month(year, month)?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or(AnalyticsError::InvalidMonth { year, month })?;
    u32::try_from((next - first).num_days()).map_err(|_| AnalyticsError::InvalidMonth { year, month })
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(AnalyticsError::InvalidMonth { year, month })
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        (part / whole * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

/// Stateless analytics over expense records.
pub struct AnalyticsService;

impl AnalyticsService {
    /// Checks a date range, applying the daily-trend size limit when asked.
    pub fn validate_range(
        from: NaiveDate,
        to: NaiveDate,
        granularity: Option<Granularity>,
    ) -> Result<(), AnalyticsError> {
        if from > to {
            return Err(AnalyticsError::InvalidDateRange { start: from, end: to });
        }
        if granularity == Some(Granularity::Day) && (to - from).num_days() + 1 > MAX_DAILY_TREND_DAYS
        {
            return Err(AnalyticsError::RangeTooLarge {
                max_days: MAX_DAILY_TREND_DAYS,
            });
        }
        Ok(())
    }

    /// Totals per category, largest first.
    ///
    /// Rejected expenses never count; pending ones count when `include_pending`.
    #[must_use]
    pub fn spending_by_category<'a, I>(records: I, include_pending: bool) -> Vec<CategorySpending>
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let mut totals: BTreeMap<ExpenseCategory, (Decimal, u64)> = BTreeMap::new();
        for record in records {
            let counted = match record.status {
                ExpenseStatus::Approved => true,
                ExpenseStatus::Pending => include_pending,
                ExpenseStatus::Rejected => false,
            };
            if counted {
                let entry = totals.entry(record.category).or_default();
                entry.0 += record.amount;
                entry.1 += 1;
            }
        }

        let grand_total: Decimal = totals.values().map(|(total, _)| *total).sum();

        let mut result: Vec<CategorySpending> = totals
            .into_iter()
            .map(|(category, (total, count))| CategorySpending {
                category,
                total,
                count,
                percentage: percent_of(total, grand_total),
            })
            .collect();
        result.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
        result
    }

    /// Totals per day or month across `[from, to]`, with empty buckets filled.
    pub fn spending_trend<'a, I>(
        records: I,
        from: NaiveDate,
        to: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<TrendPoint>, AnalyticsError>
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        Self::validate_range(from, to, Some(granularity))?;

        let bucket_of = |date: NaiveDate| match granularity {
            Granularity::Day => date,
            Granularity::Month => month_start(date),
        };

        let mut buckets: BTreeMap<NaiveDate, (Decimal, u64)> = BTreeMap::new();
        let mut cursor = bucket_of(from);
        let last = bucket_of(to);
        while cursor <= last {
            buckets.insert(cursor, (Decimal::ZERO, 0));
            let next = match granularity {
                Granularity::Day => cursor.succ_opt(),
                Granularity::Month => cursor.checked_add_months(Months::new(1)),
            };
            match next {
                Some(n) => cursor = n,
                None => break,
            }
        }

        for record in records {
            if record.status == ExpenseStatus::Rejected
                || record.expense_date < from
                || record.expense_date > to
            {
                continue;
            }
            if let Some(entry) = buckets.get_mut(&bucket_of(record.expense_date)) {
                entry.0 += record.amount;
                entry.1 += 1;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(period_start, (total, count))| TrendPoint {
                label: match granularity {
                    Granularity::Day => period_start.format("%Y-%m-%d").to_string(),
                    Granularity::Month => period_start.format("%Y-%m").to_string(),
                },
                period_start,
                total,
                count,
            })
            .collect())
    }

    /// Naive linear projection of a month's spending to month end.
    ///
    /// The current month uses today's day-of-month as elapsed days; past
    /// months use the whole month. `budgets` lists the caller's budget limits
    /// for that month by category.
    pub fn project_month<'a, I>(
        records: I,
        year: i32,
        month: u32,
        today: NaiveDate,
        budgets: &[(ExpenseCategory, Decimal)],
    ) -> Result<MonthlyProjection, AnalyticsError>
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let first = first_of_month(year, month)?;
        let current = month_start(today);
        if first > current {
            return Err(AnalyticsError::FutureMonth { year, month });
        }

        let days_in_month = days_in_month(year, month)?;
        let days_elapsed = if first == current {
            today.day()
        } else {
            days_in_month
        };
        let elapsed = Decimal::from(days_elapsed);
        let full = Decimal::from(days_in_month);
        let project = |spent: Decimal| (spent / elapsed * full).round_dp(2);

        let mut by_category: BTreeMap<ExpenseCategory, Decimal> = BTreeMap::new();
        for record in records {
            if record.is_in_month(year, month) && record.status.counts_toward_budget() {
                *by_category.entry(record.category).or_default() += record.amount;
            }
        }
        for (category, _) in budgets {
            by_category.entry(*category).or_default();
        }

        let spent: Decimal = by_category.values().copied().sum();

        let mut categories: Vec<CategoryProjection> = by_category
            .into_iter()
            .map(|(category, spent)| {
                let projected = project(spent);
                let budget_limit = budgets
                    .iter()
                    .find(|(c, _)| *c == category)
                    .map(|(_, limit)| *limit);
                CategoryProjection {
                    category,
                    spent,
                    projected,
                    budget_limit,
                    projected_over_budget: budget_limit.is_some_and(|limit| projected > limit),
                }
            })
            .collect();
        categories.sort_by(|a, b| b.projected.cmp(&a.projected).then(a.category.cmp(&b.category)));

        Ok(MonthlyProjection {
            year,
            month,
            days_in_month,
            days_elapsed,
            spent,
            daily_average: (spent / elapsed).round_dp(2),
            projected_total: project(spent),
            categories,
        })
    }

    /// Builds the dashboard overview from one month's records.
    #[must_use]
    pub fn overview<'a, I>(
        records: I,
        year: i32,
        month: u32,
        budgets_over_limit: u64,
        unread_notifications: u64,
    ) -> SpendingOverview
    where
        I: IntoIterator<Item = &'a ExpenseRecord>,
    {
        let mut overview = SpendingOverview {
            year,
            month,
            budgets_over_limit,
            unread_notifications,
            ..SpendingOverview::default()
        };

        for record in records.into_iter().filter(|r| r.is_in_month(year, month)) {
            match record.status {
                ExpenseStatus::Pending => {
                    overview.pending_count += 1;
                    overview.pending_total += record.amount;
                }
                ExpenseStatus::Approved => overview.approved_total += record.amount,
                ExpenseStatus::Rejected => continue,
            }
            overview.month_total += record.amount;
        }

        overview
    }
}
