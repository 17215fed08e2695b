//! Monthly category budgets.
//!
//! A budget's `current_spent` is denormalized: it mirrors the sum of the
//! owner's counting expenses for its (category, year, month). This module
//! holds the arithmetic that keeps it honest; persistence applies the deltas.

pub mod error;
pub mod reconcile;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BudgetRuleError;
pub use reconcile::{recompute_spent, reconcile};
pub use service::BudgetService;
pub use types::{
    BudgetAlert, BudgetDelta, BudgetFields, BudgetKey, BudgetStatus, DEFAULT_ALERT_THRESHOLD,
};
