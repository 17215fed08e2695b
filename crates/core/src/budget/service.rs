//! Budget status and alert rules.

use rust_decimal::Decimal;

use super::error::BudgetRuleError;
use super::types::{BudgetAlert, BudgetFields, BudgetStatus};
use crate::expense::{MAX_AMOUNT, MAX_AMOUNT_SCALE};

/// Lowest year a budget may be created for.
pub const MIN_YEAR: i32 = 2000;
/// Highest year a budget may be created for.
pub const MAX_YEAR: i32 = 2100;

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Validates the fields of a new or edited budget.
    pub fn validate(fields: &BudgetFields) -> Result<(), BudgetRuleError> {
        if !(1..=12).contains(&fields.month) {
            return Err(BudgetRuleError::InvalidMonth(fields.month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&fields.year) {
            return Err(BudgetRuleError::InvalidYear {
                min: MIN_YEAR,
                max: MAX_YEAR,
                got: fields.year,
            });
        }
        Self::validate_limit(fields.limit_amount)?;
        Self::validate_threshold(fields.alert_threshold)
    }

    /// Limit must be strictly positive and fit the stored precision.
    pub fn validate_limit(limit: Decimal) -> Result<(), BudgetRuleError> {
        if limit <= Decimal::ZERO {
            return Err(BudgetRuleError::NonPositiveLimit);
        }
        if limit.normalize().scale() > MAX_AMOUNT_SCALE {
            return Err(BudgetRuleError::TooManyDecimalPlaces {
                max: MAX_AMOUNT_SCALE,
            });
        }
        if limit > MAX_AMOUNT {
            return Err(BudgetRuleError::LimitTooLarge { max: MAX_AMOUNT });
        }
        Ok(())
    }

    /// Threshold is a percentage in 1..=100.
    pub fn validate_threshold(threshold: i32) -> Result<(), BudgetRuleError> {
        if !(1..=100).contains(&threshold) {
            return Err(BudgetRuleError::InvalidThreshold(threshold));
        }
        Ok(())
    }

    /// Spent as a percentage of limit, rounded to 2 dp. Zero when the limit is zero.
    #[must_use]
    pub fn utilization_percent(limit: Decimal, spent: Decimal) -> Decimal {
        if limit.is_zero() {
            Decimal::ZERO
        } else {
            (spent / limit * Decimal::ONE_HUNDRED).round_dp(2)
        }
    }

    /// Computes the derived status of a budget.
    #[must_use]
    pub fn status(limit: Decimal, spent: Decimal, threshold: i32) -> BudgetStatus {
        BudgetStatus {
            remaining: limit - spent,
            utilization_percent: Self::utilization_percent(limit, spent),
            is_over_budget: spent > limit,
            is_near_limit: Self::at_or_above_threshold(limit, spent, threshold),
        }
    }

    /// Decides which alert, if any, a move from `previous` to `current` spent raises.
    ///
    /// Only increases alert. Crossing the limit wins over crossing the
    /// threshold when one write does both.
    #[must_use]
    pub fn evaluate_alert(
        limit: Decimal,
        threshold: i32,
        previous: Decimal,
        current: Decimal,
    ) -> Option<BudgetAlert> {
        if current <= previous {
            return None;
        }
        if previous <= limit && current > limit {
            return Some(BudgetAlert::Exceeded);
        }
        if !Self::at_or_above_threshold(limit, previous, threshold)
            && Self::at_or_above_threshold(limit, current, threshold)
        {
            return Some(BudgetAlert::Warning);
        }
        None
    }

    // spent / limit * 100 >= threshold, without the division
    fn at_or_above_threshold(limit: Decimal, spent: Decimal, threshold: i32) -> bool {
        if limit.is_zero() {
            return false;
        }
        spent * Decimal::ONE_HUNDRED >= limit * Decimal::from(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_under_budget() {
        let status = BudgetService::status(dec!(500), dec!(123.45), 80);

        assert_eq!(status.remaining, dec!(376.55));
        assert_eq!(status.utilization_percent, dec!(24.69));
        assert!(!status.is_over_budget);
        assert!(!status.is_near_limit);
    }

    #[test]
    fn test_status_over_budget() {
        let status = BudgetService::status(dec!(100), dec!(150), 80);

        assert_eq!(status.remaining, dec!(-50));
        assert_eq!(status.utilization_percent, dec!(150.00));
        assert!(status.is_over_budget);
        assert!(status.is_near_limit);
    }

    #[test]
    fn test_near_limit_at_threshold() {
        let status = BudgetService::status(dec!(100), dec!(80), 80);
        assert!(status.is_near_limit);
        assert!(!status.is_over_budget);
    }

    #[test]
    fn test_zero_limit_utilization() {
        assert_eq!(BudgetService::utilization_percent(dec!(0), dec!(50)), dec!(0));
    }

    #[rstest]
    #[case(dec!(0), dec!(50), None)]
    #[case(dec!(70), dec!(85), Some(BudgetAlert::Warning))]
    #[case(dec!(80), dec!(90), None)]
    #[case(dec!(90), dec!(101), Some(BudgetAlert::Exceeded))]
    #[case(dec!(10), dec!(120), Some(BudgetAlert::Exceeded))]
    #[case(dec!(100), dec!(100.01), Some(BudgetAlert::Exceeded))]
    #[case(dec!(110), dec!(130), None)]
    #[case(dec!(95), dec!(60), None)]
    fn test_evaluate_alert(
        #[case] previous: Decimal,
        #[case] current: Decimal,
        #[case] expected: Option<BudgetAlert>,
    ) {
        assert_eq!(
            BudgetService::evaluate_alert(dec!(100), 80, previous, current),
            expected
        );
    }

    #[rstest]
    #[case(2025, 0, dec!(10), 80, Err(BudgetRuleError::InvalidMonth(0)))]
    #[case(2025, 13, dec!(10), 80, Err(BudgetRuleError::InvalidMonth(13)))]
    #[case(1999, 1, dec!(10), 80, Err(BudgetRuleError::InvalidYear { min: 2000, max: 2100, got: 1999 }))]
    #[case(2025, 1, dec!(0), 80, Err(BudgetRuleError::NonPositiveLimit))]
    #[case(2025, 1, dec!(10), 0, Err(BudgetRuleError::InvalidThreshold(0)))]
    #[case(2025, 1, dec!(10), 101, Err(BudgetRuleError::InvalidThreshold(101)))]
    #[case(2025, 1, dec!(0.00001), 80, Err(BudgetRuleError::TooManyDecimalPlaces { max: 4 }))]
    #[case(2025, 1, dec!(10000000000000000), 80, Err(BudgetRuleError::LimitTooLarge { max: MAX_AMOUNT }))]
    #[case(2025, 12, dec!(0.01), 100, Ok(()))]
    #[case(2025, 12, dec!(0.10000), 100, Ok(()))]
    #[case(2025, 12, dec!(1000000000000), 100, Ok(()))]
    fn test_validate(
        #[case] year: i32,
        #[case] month: u32,
        #[case] limit_amount: Decimal,
        #[case] alert_threshold: i32,
        #[case] expected: Result<(), BudgetRuleError>,
    ) {
        let fields = BudgetFields { year, month, limit_amount, alert_threshold };
        assert_eq!(BudgetService::validate(&fields), expected);
    }
}
