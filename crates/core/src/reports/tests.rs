//! Tests for report statistics.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::service::ReportService;
use super::types::{BreakdownEntry, ReportFilters};
use crate::expense::{ExpenseCategory, ExpenseRecord, ExpenseStatus};

fn expense(
    amount: Decimal,
    category: ExpenseCategory,
    status: ExpenseStatus,
    day: u32,
) -> ExpenseRecord {
    ExpenseRecord {
        user_id: Uuid::nil(),
        team_id: None,
        category,
        amount,
        status,
        expense_date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
    }
}

fn sample() -> Vec<ExpenseRecord> {
    vec![
        expense(dec!(10.00), ExpenseCategory::Meals, ExpenseStatus::Approved, 1),
        expense(dec!(25.50), ExpenseCategory::Meals, ExpenseStatus::Pending, 5),
        expense(dec!(300), ExpenseCategory::Travel, ExpenseStatus::Rejected, 10),
        expense(dec!(4.49), ExpenseCategory::Transport, ExpenseStatus::Approved, 20),
    ]
}

#[test]
fn test_statistics_over_all_expenses() {
    let stats = ReportService::compute_statistics(&sample(), &ReportFilters::default());

    assert_eq!(stats.count, 4);
    assert_eq!(stats.total, dec!(339.99));
    assert_eq!(stats.average, dec!(85.00));
    assert_eq!(stats.min, Some(dec!(4.49)));
    assert_eq!(stats.max, Some(dec!(300)));
    assert_eq!(
        stats.by_category[&ExpenseCategory::Meals],
        BreakdownEntry { count: 2, total: dec!(35.50) }
    );
    assert_eq!(stats.by_status[&ExpenseStatus::Rejected].count, 1);
    assert!(!stats.by_category.contains_key(&ExpenseCategory::Software));
}

#[test]
fn test_statistics_respect_filters() {
    let filters = ReportFilters {
        date_from: NaiveDate::from_ymd_opt(2025, 6, 2),
        date_to: NaiveDate::from_ymd_opt(2025, 6, 30),
        status: Some(ExpenseStatus::Approved),
        ..ReportFilters::default()
    };

    let stats = ReportService::compute_statistics(&sample(), &filters);

    assert_eq!(stats.count, 1);
    assert_eq!(stats.total, dec!(4.49));
}

#[test]
fn test_team_filter_excludes_unattributed() {
    let team = Uuid::new_v4();
    let mut records = sample();
    records[0].team_id = Some(team);

    let filters = ReportFilters {
        team_id: Some(team),
        ..ReportFilters::default()
    };
    let stats = ReportService::compute_statistics(&records, &filters);

    assert_eq!(stats.count, 1);
    assert_eq!(stats.total, dec!(10.00));
}

#[test]
fn test_empty_report() {
    let stats = ReportService::compute_statistics(&Vec::<ExpenseRecord>::new(), &ReportFilters::default());

    assert_eq!(stats.count, 0);
    assert_eq!(stats.total, Decimal::ZERO);
    assert_eq!(stats.average, Decimal::ZERO);
    assert_eq!(stats.min, None);
    assert_eq!(stats.max, None);
}

#[test]
fn test_statistics_serialize_with_readable_keys() {
    let stats = ReportService::compute_statistics(&sample(), &ReportFilters::default());
    let json = serde_json::to_value(&stats).unwrap();

    assert!(json["by_category"].get("meals").is_some());
    assert!(json["by_status"].get("APPROVED").is_some());
}

proptest! {
    /// Breakdown totals always add back up to the report total.
    #[test]
    fn prop_breakdowns_sum_to_total(
        amounts in prop::collection::vec((1i64..1_000_000, 0usize..10, 0usize..3), 0..30)
    ) {
        let records: Vec<ExpenseRecord> = amounts
            .into_iter()
            .map(|(cents, c, s)| expense(
                Decimal::new(cents, 2),
                ExpenseCategory::ALL[c],
                ExpenseStatus::ALL[s],
                1,
            ))
            .collect();

        let stats = ReportService::compute_statistics(&records, &ReportFilters::default());

        let by_category: Decimal = stats.by_category.values().map(|e| e.total).sum();
        let by_status: Decimal = stats.by_status.values().map(|e| e.total).sum();
        let category_count: u64 = stats.by_category.values().map(|e| e.count).sum();

        prop_assert_eq!(by_category, stats.total);
        prop_assert_eq!(by_status, stats.total);
        prop_assert_eq!(category_count, stats.count);
        if let (Some(min), Some(max)) = (stats.min, stats.max) {
            prop_assert!(min <= stats.average && stats.average <= max);
        }
    }
}
