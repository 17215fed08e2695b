//! Property-based tests for budget reconciliation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::reconcile::{recompute_spent, reconcile};
use super::service::BudgetService;
use super::types::{BudgetAlert, BudgetKey};
use crate::expense::{ExpenseCategory, ExpenseRecord, ExpenseStatus};

fn status_strategy() -> impl Strategy<Value = ExpenseStatus> {
    prop_oneof![
        Just(ExpenseStatus::Pending),
        Just(ExpenseStatus::Approved),
        Just(ExpenseStatus::Rejected),
    ]
}

fn category_strategy() -> impl Strategy<Value = ExpenseCategory> {
    (0..ExpenseCategory::ALL.len()).prop_map(|i| ExpenseCategory::ALL[i])
}

fn record_strategy(user: Uuid) -> impl Strategy<Value = ExpenseRecord> {
    (
        1i64..10_000_000,
        status_strategy(),
        category_strategy(),
        1u32..=3,
        1u32..=28,
    )
        .prop_map(move |(cents, status, category, month, day)| ExpenseRecord {
            user_id: user,
            team_id: None,
            category,
            amount: Decimal::new(cents, 2),
            status,
            expense_date: NaiveDate::from_ymd_opt(2025, month, day).unwrap(),
        })
}

fn all_keys(user: Uuid) -> Vec<BudgetKey> {
    let mut keys = Vec::new();
    for category in ExpenseCategory::ALL {
        for month in 1..=3 {
            keys.push(BudgetKey { user_id: user, category, year: 2025, month });
        }
    }
    keys
}

proptest! {
    /// Applying reconcile deltas for any edit keeps every budget equal to a
    /// from-scratch recomputation.
    #[test]
    fn prop_deltas_match_recomputation(
        existing in prop::collection::vec(record_strategy(Uuid::nil()), 0..8),
        before in record_strategy(Uuid::nil()),
        after in proptest::option::of(record_strategy(Uuid::nil())),
    ) {
        let user = Uuid::nil();
        let mut old_set = existing.clone();
        old_set.push(before.clone());
        let mut new_set = existing;
        if let Some(a) = &after {
            new_set.push(a.clone());
        }

        let deltas = reconcile(Some(&before), after.as_ref());

        for key in all_keys(user) {
            let old_spent = recompute_spent(&key, &old_set);
            let new_spent = recompute_spent(&key, &new_set);
            let applied: Decimal = deltas.iter().filter(|d| d.key == key).map(|d| d.delta).sum();
            prop_assert_eq!(old_spent + applied, new_spent);
        }
    }

    /// Reconcile never emits a zero delta or two deltas for the same key.
    #[test]
    fn prop_deltas_are_merged(
        (before, after) in (record_strategy(Uuid::nil()), record_strategy(Uuid::nil()))
    ) {
        let deltas = reconcile(Some(&before), Some(&after));
        prop_assert!(deltas.len() <= 2);
        prop_assert!(deltas.iter().all(|d| !d.delta.is_zero()));
        if deltas.len() == 2 {
            prop_assert_ne!(deltas[0].key, deltas[1].key);
        }
    }

    /// Exceeded fires exactly when spending crosses the limit upward.
    #[test]
    fn prop_exceeded_iff_crossing_limit(
        limit in 1i64..100_000,
        threshold in 1i32..=100,
        previous in 0i64..200_000,
        increase in 1i64..100_000,
    ) {
        let limit = Decimal::from(limit);
        let previous = Decimal::from(previous);
        let current = previous + Decimal::from(increase);

        let alert = BudgetService::evaluate_alert(limit, threshold, previous, current);
        let crossed = previous <= limit && current > limit;

        prop_assert_eq!(alert == Some(BudgetAlert::Exceeded), crossed);
    }
}
