//! Budget reconciliation.
//!
//! Every expense write is described as a before/after pair of records
//! (`None` for a create or delete). The signed difference in contribution
//! per [`BudgetKey`] is what has to be added to the matching budgets.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::types::{BudgetDelta, BudgetKey};
use crate::expense::ExpenseRecord;

/// Computes the budget deltas caused by replacing `before` with `after`.
///
/// Deltas on the same key are merged and zero deltas are dropped, so an edit
/// that only changes the description yields nothing.
#[must_use]
pub fn reconcile(before: Option<&ExpenseRecord>, after: Option<&ExpenseRecord>) -> Vec<BudgetDelta> {
    let mut deltas: BTreeMap<BudgetKey, Decimal> = BTreeMap::new();

    if let Some(old) = before {
        *deltas.entry(BudgetKey::for_record(old)).or_default() -= old.budget_contribution();
    }
    if let Some(new) = after {
        *deltas.entry(BudgetKey::for_record(new)).or_default() += new.budget_contribution();
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| !delta.is_zero())
        .map(|(key, delta)| BudgetDelta { key, delta })
        .collect()
}

/// Recomputes a budget's spent amount from scratch.
#[must_use]
pub fn recompute_spent<'a, I>(key: &BudgetKey, records: I) -> Decimal
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    records
        .into_iter()
        .filter(|r| BudgetKey::for_record(r) == *key)
        .map(ExpenseRecord::budget_contribution)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::{ExpenseCategory, ExpenseStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn record(user: Uuid, amount: Decimal, status: ExpenseStatus, date: (i32, u32, u32)) -> ExpenseRecord {
        ExpenseRecord {
            user_id: user,
            team_id: None,
            category: ExpenseCategory::Meals,
            amount,
            status,
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        }
    }

    #[test]
    fn test_create_adds_contribution() {
        let user = Uuid::new_v4();
        let new = record(user, dec!(42.50), ExpenseStatus::Pending, (2025, 3, 10));

        let deltas = reconcile(None, Some(&new));

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].delta, dec!(42.50));
        assert_eq!(deltas[0].key.month, 3);
    }

    #[test]
    fn test_delete_subtracts_contribution() {
        let user = Uuid::new_v4();
        let old = record(user, dec!(10), ExpenseStatus::Pending, (2025, 3, 10));

        let deltas = reconcile(Some(&old), None);

        assert_eq!(deltas, vec![BudgetDelta { key: BudgetKey::for_record(&old), delta: dec!(-10) }]);
    }

    #[test]
    fn test_rejection_removes_contribution() {
        let user = Uuid::new_v4();
        let old = record(user, dec!(75), ExpenseStatus::Pending, (2025, 3, 10));
        let new = ExpenseRecord { status: ExpenseStatus::Rejected, ..old.clone() };

        let deltas = reconcile(Some(&old), Some(&new));

        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].delta, dec!(-75));
    }

    #[test]
    fn test_approval_is_neutral() {
        let user = Uuid::new_v4();
        let old = record(user, dec!(75), ExpenseStatus::Pending, (2025, 3, 10));
        let new = ExpenseRecord { status: ExpenseStatus::Approved, ..old.clone() };

        assert!(reconcile(Some(&old), Some(&new)).is_empty());
    }

    #[test]
    fn test_moving_month_touches_both_budgets() {
        let user = Uuid::new_v4();
        let old = record(user, dec!(20), ExpenseStatus::Pending, (2025, 3, 31));
        let new = record(user, dec!(25), ExpenseStatus::Pending, (2025, 4, 1));

        let deltas = reconcile(Some(&old), Some(&new));

        assert_eq!(deltas.len(), 2);
        let march = deltas.iter().find(|d| d.key.month == 3).unwrap();
        let april = deltas.iter().find(|d| d.key.month == 4).unwrap();
        assert_eq!(march.delta, dec!(-20));
        assert_eq!(april.delta, dec!(25));
    }

    #[test]
    fn test_recompute_ignores_other_keys_and_rejected() {
        let user = Uuid::new_v4();
        let key = BudgetKey {
            user_id: user,
            category: ExpenseCategory::Meals,
            year: 2025,
            month: 3,
        };
        let records = vec![
            record(user, dec!(10), ExpenseStatus::Pending, (2025, 3, 1)),
            record(user, dec!(15), ExpenseStatus::Approved, (2025, 3, 2)),
            record(user, dec!(100), ExpenseStatus::Rejected, (2025, 3, 3)),
            record(user, dec!(7), ExpenseStatus::Pending, (2025, 4, 1)),
            record(Uuid::new_v4(), dec!(9), ExpenseStatus::Pending, (2025, 3, 1)),
        ];

        assert_eq!(recompute_spent(&key, &records), dec!(25));
    }
}
