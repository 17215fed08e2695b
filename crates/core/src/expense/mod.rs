//! Expense domain: categories, statuses, field rules and the review workflow.
//!
//! # Modules
//!
//! - `types` - Expense status/category enums and the budget-relevant record
//! - `rules` - Field validation for expense submission and edits
//! - `workflow` - Approve/reject transitions and visibility rules
//! - `error` - Expense rule violations

pub mod error;
pub mod rules;
pub mod types;
pub mod workflow;

pub use error::ExpenseRuleError;
pub use rules::{
    DEFAULT_CURRENCY, ExpenseFields, MAX_AMOUNT, MAX_AMOUNT_SCALE, MAX_DESCRIPTION_LEN,
    normalize_currency, validate_amount_bound, validate_date_range, validate_expense_fields,
};
pub use types::{ExpenseCategory, ExpenseRecord, ExpenseStatus};
pub use workflow::{ExpenseWorkflow, ReviewDecision, ReviewOutcome};
