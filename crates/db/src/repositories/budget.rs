//! Budget repository and budget reconciliation.
//!
//! `apply_deltas` is the only writer of `current_spent` outside of create and
//! recalculate. It runs on the caller's transaction so the expense write and
//! the budget adjustment commit together.

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::{debug, info};
use uuid::Uuid;

use outlay_core::budget::{
    BudgetAlert, BudgetDelta, BudgetFields, BudgetKey, BudgetRuleError, BudgetService,
    BudgetStatus, DEFAULT_ALERT_THRESHOLD, recompute_spent,
};
use outlay_core::expense::{ExpenseCategory, ExpenseRecord};
use outlay_core::notification::NotificationMessage;
use outlay_shared::AppError;

use super::notification::insert_notification;
use crate::entities::{budgets, expenses, sea_orm_active_enums::ExpenseCategory as DbCategory};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Budget not found (or not the caller's).
    #[error("Budget not found: {0}")]
    NotFound(Uuid),

    /// A budget already exists for this category and month.
    #[error("A budget for {category} in {year}-{month:02} already exists")]
    Duplicate {
        /// Category.
        category: ExpenseCategory,
        /// Year.
        year: i32,
        /// Month.
        month: u32,
    },

    /// Field rule violated.
    #[error(transparent)]
    Rule(#[from] BudgetRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<BudgetError> for AppError {
    fn from(e: BudgetError) -> Self {
        match e {
            BudgetError::NotFound(_) => Self::NotFound(e.to_string()),
            BudgetError::Duplicate { .. } => Self::Conflict(e.to_string()),
            BudgetError::Rule(_) => Self::Validation(e.to_string()),
            BudgetError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Category.
    pub category: ExpenseCategory,
    /// Year.
    pub year: i32,
    /// Month, 1..=12.
    pub month: u32,
    /// Spending limit.
    pub limit_amount: Decimal,
    /// Alert threshold percent; defaults to 80.
    pub alert_threshold: Option<i32>,
}

/// Input for updating a budget.
#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetInput {
    /// New limit.
    pub limit_amount: Option<Decimal>,
    /// New alert threshold.
    pub alert_threshold: Option<i32>,
}

/// A budget together with its derived status.
#[derive(Debug, Clone)]
pub struct BudgetWithStatus {
    /// Stored budget.
    pub budget: budgets::Model,
    /// Derived status.
    pub status: BudgetStatus,
}

impl From<budgets::Model> for BudgetWithStatus {
    fn from(budget: budgets::Model) -> Self {
        let status = BudgetService::status(
            budget.limit_amount,
            budget.current_spent,
            budget.alert_threshold,
        );
        Self { budget, status }
    }
}

/// A budget alert raised while applying deltas.
#[derive(Debug, Clone)]
pub struct RaisedAlert {
    /// Budget that crossed a line.
    pub budget_id: Uuid,
    /// Which line.
    pub alert: BudgetAlert,
}

/// First and last day of a month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

pub(crate) fn month_to_db(month: u32) -> i32 {
    i32::try_from(month).unwrap_or_default()
}

fn key_condition(key: &BudgetKey) -> Condition {
    Condition::all()
        .add(budgets::Column::UserId.eq(key.user_id))
        .add(budgets::Column::Category.eq(DbCategory::from(key.category)))
        .add(budgets::Column::Year.eq(key.year))
        .add(budgets::Column::Month.eq(month_to_db(key.month)))
}

/// Loads the records that can contribute to `key`'s budget.
async fn records_for_key<C: ConnectionTrait>(
    conn: &C,
    key: &BudgetKey,
) -> Result<Vec<ExpenseRecord>, DbErr> {
    let Some((first, last)) = month_bounds(key.year, key.month) else {
        return Ok(Vec::new());
    };

    let rows = expenses::Entity::find()
        .filter(expenses::Column::UserId.eq(key.user_id))
        .filter(expenses::Column::Category.eq(DbCategory::from(key.category)))
        .filter(expenses::Column::ExpenseDate.between(first, last))
        .all(conn)
        .await?;

    Ok(rows.iter().map(expenses::Model::record).collect())
}

/// Applies reconciliation deltas with atomic increments and emits alerts.
///
/// Keys without a budget are skipped. Alerts only fire on increases.
pub(crate) async fn apply_deltas<C: ConnectionTrait>(
    conn: &C,
    deltas: &[BudgetDelta],
) -> Result<Vec<RaisedAlert>, DbErr> {
    let mut alerts = Vec::new();

    for delta in deltas {
        let result = budgets::Entity::update_many()
            .col_expr(
                budgets::Column::CurrentSpent,
                Expr::col(budgets::Column::CurrentSpent).add(delta.delta),
            )
            .col_expr(
                budgets::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(key_condition(&delta.key))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            continue;
        }
        debug!(
            user_id = %delta.key.user_id,
            category = %delta.key.category,
            year = delta.key.year,
            month = delta.key.month,
            delta = %delta.delta,
            "Budget reconciled"
        );

        if delta.delta <= Decimal::ZERO {
            continue;
        }

        let Some(budget) = budgets::Entity::find()
            .filter(key_condition(&delta.key))
            .one(conn)
            .await?
        else {
            continue;
        };

        let previous = budget.current_spent - delta.delta;
        if let Some(alert) = BudgetService::evaluate_alert(
            budget.limit_amount,
            budget.alert_threshold,
            previous,
            budget.current_spent,
        ) {
            let message = NotificationMessage::budget_alert(
                alert,
                delta.key.category,
                delta.key.year,
                delta.key.month,
                budget.current_spent,
                budget.limit_amount,
                BudgetService::utilization_percent(budget.limit_amount, budget.current_spent),
            );
            insert_notification(conn, budget.user_id, &message, Some(budget.id)).await?;
            info!(budget_id = %budget.id, alert = ?alert, "Budget alert raised");
            alerts.push(RaisedAlert {
                budget_id: budget.id,
                alert,
            });
        }
    }

    Ok(alerts)
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a budget, initialising `current_spent` from existing expenses.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateBudgetInput,
    ) -> Result<BudgetWithStatus, BudgetError> {
        let alert_threshold = input.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD);
        BudgetService::validate(&BudgetFields {
            year: input.year,
            month: input.month,
            limit_amount: input.limit_amount,
            alert_threshold,
        })?;

        let key = BudgetKey {
            user_id,
            category: input.category,
            year: input.year,
            month: input.month,
        };
        let duplicate = || BudgetError::Duplicate {
            category: input.category,
            year: input.year,
            month: input.month,
        };

        let txn = self.db.begin().await?;

        if budgets::Entity::find()
            .filter(key_condition(&key))
            .one(&txn)
            .await?
            .is_some()
        {
            return Err(duplicate());
        }

        let records = records_for_key(&txn, &key).await?;
        let now = Utc::now().into();
        let budget = budgets::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            category: Set(input.category.into()),
            year: Set(input.year),
            month: Set(month_to_db(input.month)),
            limit_amount: Set(input.limit_amount),
            current_spent: Set(recompute_spent(&key, &records)),
            alert_threshold: Set(alert_threshold),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let budget = budget.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => duplicate(),
            _ => BudgetError::Database(e),
        })?;
        txn.commit().await?;

        info!(budget_id = %budget.id, user_id = %user_id, "Budget created");
        Ok(budget.into())
    }

    /// Gets a budget owned by `user_id`.
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<BudgetWithStatus, BudgetError> {
        Ok(self.find_owned(id, user_id).await?.into())
    }

    /// Lists a user's budgets, newest month first.
    pub async fn list(
        &self,
        user_id: Uuid,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<BudgetWithStatus>, BudgetError> {
        let mut query = budgets::Entity::find().filter(budgets::Column::UserId.eq(user_id));
        if let Some(year) = year {
            query = query.filter(budgets::Column::Year.eq(year));
        }
        if let Some(month) = month {
            query = query.filter(budgets::Column::Month.eq(month_to_db(month)));
        }

        let budgets = query
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .order_by_asc(budgets::Column::Category)
            .all(&self.db)
            .await?;

        Ok(budgets.into_iter().map(Into::into).collect())
    }

    /// Updates a budget's limit and/or threshold.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateBudgetInput,
    ) -> Result<BudgetWithStatus, BudgetError> {
        let budget = self.find_owned(id, user_id).await?;

        if let Some(limit) = input.limit_amount {
            BudgetService::validate_limit(limit)?;
        }
        if let Some(threshold) = input.alert_threshold {
            BudgetService::validate_threshold(threshold)?;
        }

        let mut active: budgets::ActiveModel = budget.into();
        if let Some(limit) = input.limit_amount {
            active.limit_amount = Set(limit);
        }
        if let Some(threshold) = input.alert_threshold {
            active.alert_threshold = Set(threshold);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        info!(budget_id = %id, "Budget updated");
        Ok(updated.into())
    }

    /// Deletes a budget.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), BudgetError> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(id))
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(BudgetError::NotFound(id));
        }
        info!(budget_id = %id, "Budget deleted");
        Ok(())
    }

    /// Recomputes `current_spent` from the expenses table.
    pub async fn recalculate(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<BudgetWithStatus, BudgetError> {
        let txn = self.db.begin().await?;

        let budget = budgets::Entity::find_by_id(id)
            .filter(budgets::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or(BudgetError::NotFound(id))?;

        let key = budget.key();
        let records = records_for_key(&txn, &key).await?;
        let spent = recompute_spent(&key, &records);
        let previous = budget.current_spent;

        let mut active: budgets::ActiveModel = budget.into();
        active.current_spent = Set(spent);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if previous != spent {
            info!(budget_id = %id, previous = %previous, current = %spent, "Budget drift corrected");
        }
        Ok(updated.into())
    }

    /// Number of the user's budgets for a month whose spending exceeds the limit.
    pub async fn count_over_limit(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<u64, BudgetError> {
        let budgets = self.list(user_id, Some(year), Some(month)).await?;
        let over = budgets.iter().filter(|b| b.status.is_over_budget).count();
        Ok(u64::try_from(over).unwrap_or(u64::MAX))
    }

    /// Budget limits for a month, by category.
    pub async fn limits_for_month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<(ExpenseCategory, Decimal)>, BudgetError> {
        let budgets = self.list(user_id, Some(year), Some(month)).await?;
        Ok(budgets
            .into_iter()
            .map(|b| (b.budget.category.into(), b.budget.limit_amount))
            .collect())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<budgets::Model, BudgetError> {
        budgets::Entity::find_by_id(id)
            .filter(budgets::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(BudgetError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_month_bounds() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(month_bounds(2024, 13).is_none());
    }

    #[test]
    fn test_error_mapping() {
        let duplicate = BudgetError::Duplicate {
            category: ExpenseCategory::Meals,
            year: 2025,
            month: 3,
        };
        assert_eq!(duplicate.to_string(), "A budget for meals in 2025-03 already exists");
        assert_eq!(AppError::from(duplicate).status_code(), 409);
        assert_eq!(
            AppError::from(BudgetError::Rule(BudgetRuleError::NonPositiveLimit)).status_code(),
            400
        );
    }

    #[test]
    fn test_status_attached_to_model() {
        let now = Utc::now().into();
        let model = budgets::Model {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            category: DbCategory::Travel,
            year: 2025,
            month: 4,
            limit_amount: dec!(200),
            current_spent: dec!(170),
            alert_threshold: 80,
            created_at: now,
            updated_at: now,
        };

        let with_status = BudgetWithStatus::from(model);

        assert_eq!(with_status.status.remaining, dec!(30));
        assert!(with_status.status.is_near_limit);
        assert_eq!(with_status.budget.key().month, 4);
    }
}
