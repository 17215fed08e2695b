//! Field rules for expense submission and edits.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::ExpenseRuleError;

/// Currency used when the client does not send one.
pub const DEFAULT_CURRENCY: &str = "USD";
/// Longest accepted description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;
/// Amounts are stored as NUMERIC(19, 4).
pub const MAX_AMOUNT_SCALE: u32 = 4;
/// Largest amount a single expense or budget limit may carry (10^12).
///
/// Leaves room under the NUMERIC(19, 4) ceiling for monthly sums.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// The user-editable fields that carry rules.
#[derive(Debug, Clone)]
pub struct ExpenseFields<'a> {
    /// Amount spent.
    pub amount: Decimal,
    /// Description text.
    pub description: &'a str,
    /// Date the money was spent.
    pub expense_date: NaiveDate,
}

/// Validates expense fields against `today`.
pub fn validate_expense_fields(
    fields: &ExpenseFields<'_>,
    today: NaiveDate,
) -> Result<(), ExpenseRuleError> {
    if fields.amount <= Decimal::ZERO {
        return Err(ExpenseRuleError::NonPositiveAmount);
    }
    if fields.amount.normalize().scale() > MAX_AMOUNT_SCALE {
        return Err(ExpenseRuleError::TooManyDecimalPlaces {
            max: MAX_AMOUNT_SCALE,
        });
    }
    validate_amount_bound(fields.amount)?;

    let description = fields.description.trim();
    if description.is_empty() {
        return Err(ExpenseRuleError::EmptyDescription);
    }
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ExpenseRuleError::DescriptionTooLong {
            max: MAX_DESCRIPTION_LEN,
        });
    }

    if fields.expense_date > today {
        return Err(ExpenseRuleError::FutureDate(fields.expense_date));
    }

    Ok(())
}

/// Rejects amounts above `MAX_AMOUNT`. Also applied to listing filter bounds.
pub fn validate_amount_bound(amount: Decimal) -> Result<(), ExpenseRuleError> {
    if amount > MAX_AMOUNT {
        return Err(ExpenseRuleError::AmountTooLarge { max: MAX_AMOUNT });
    }
    Ok(())
}

/// Normalizes a currency code to upper case, defaulting to `DEFAULT_CURRENCY`.
pub fn normalize_currency(currency: Option<&str>) -> Result<String, ExpenseRuleError> {
    let Some(raw) = currency else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };

    let code = raw.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(code)
    } else {
        Err(ExpenseRuleError::InvalidCurrency(raw.to_string()))
    }
}

/// Checks that an optional date range is ordered.
pub fn validate_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(), ExpenseRuleError> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(ExpenseRuleError::InvalidDateRange { from, to }),
        _ => Ok(()),
    }
}
