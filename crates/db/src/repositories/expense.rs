//! Expense repository.
//!
//! Every write runs in one transaction that also reconciles the affected
//! budgets and stores the notifications the write causes.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use outlay_core::budget::reconcile;
use outlay_core::expense::{
    ExpenseCategory, ExpenseFields, ExpenseRuleError, ExpenseStatus,
    ExpenseWorkflow, ReviewDecision, normalize_currency, validate_amount_bound,
    validate_date_range, validate_expense_fields,
};
use outlay_core::notification::NotificationMessage;
use outlay_shared::{AppError, types::PageRequest};

use super::budget::{RaisedAlert, apply_deltas};
use super::notification::insert_notification;
use super::team::{is_member, managed_team_ids, manager_of};
use crate::entities::{
    expenses,
    sea_orm_active_enums::{ExpenseCategory as DbCategory, ExpenseStatus as DbStatus},
    users,
};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Caller may not see or change this expense.
    #[error("You do not have access to this expense")]
    Forbidden,

    /// Team not found.
    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    /// Caller is not in the team the expense is attributed to.
    #[error("You are not a member of team {0}")]
    NotTeamMember(Uuid),

    /// Caller does not manage the expense's team.
    #[error("Only the team manager can review this expense")]
    NotTeamManager,

    /// Amount range filter is backwards.
    #[error("Invalid amount range: {min} is greater than {max}")]
    InvalidAmountRange {
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },

    /// Expense rule violated.
    #[error(transparent)]
    Rule(#[from] ExpenseRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ExpenseError> for AppError {
    fn from(e: ExpenseError) -> Self {
        match e {
            ExpenseError::NotFound(_) | ExpenseError::TeamNotFound(_) => {
                Self::NotFound(e.to_string())
            }
            ExpenseError::Forbidden
            | ExpenseError::NotTeamMember(_)
            | ExpenseError::NotTeamManager => Self::Forbidden(e.to_string()),
            ExpenseError::InvalidAmountRange { .. } => Self::Validation(e.to_string()),
            ExpenseError::Rule(ref rule) if rule.is_validation() => {
                Self::Validation(e.to_string())
            }
            ExpenseError::Rule(_) => Self::BusinessRule(e.to_string()),
            ExpenseError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Amount spent.
    pub amount: Decimal,
    /// Currency code; defaults to USD.
    pub currency: Option<String>,
    /// Category.
    pub category: ExpenseCategory,
    /// What the money was for.
    pub description: String,
    /// When it was spent.
    pub expense_date: NaiveDate,
    /// Team to route approval through.
    pub team_id: Option<Uuid>,
    /// Link to the receipt.
    pub receipt_url: Option<String>,
}

/// Input for editing a pending expense. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency.
    pub currency: Option<String>,
    /// New category.
    pub category: Option<ExpenseCategory>,
    /// New description.
    pub description: Option<String>,
    /// New date.
    pub expense_date: Option<NaiveDate>,
    /// New team; `Some(None)` detaches the expense from its team.
    pub team_id: Option<Option<Uuid>>,
    /// New receipt link; `Some(None)` removes it.
    pub receipt_url: Option<Option<String>>,
}

/// Filter for expense listings.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Only this status.
    pub status: Option<ExpenseStatus>,
    /// Only this category.
    pub category: Option<ExpenseCategory>,
    /// Only this team.
    pub team_id: Option<Uuid>,
    /// Earliest date, inclusive.
    pub date_from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub date_to: Option<NaiveDate>,
    /// Smallest amount, inclusive.
    pub min_amount: Option<Decimal>,
    /// Largest amount, inclusive.
    pub max_amount: Option<Decimal>,
}

impl ExpenseFilter {
    fn validate(&self) -> Result<(), ExpenseError> {
        validate_date_range(self.date_from, self.date_to)?;
        for bound in [self.min_amount, self.max_amount].into_iter().flatten() {
            validate_amount_bound(bound)?;
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(ExpenseError::InvalidAmountRange { min, max });
            }
        }
        Ok(())
    }

    fn apply(&self, mut query: Select<expenses::Entity>) -> Select<expenses::Entity> {
        if let Some(status) = self.status {
            query = query.filter(expenses::Column::Status.eq(DbStatus::from(status)));
        }
        if let Some(category) = self.category {
            query = query.filter(expenses::Column::Category.eq(DbCategory::from(category)));
        }
        if let Some(team_id) = self.team_id {
            query = query.filter(expenses::Column::TeamId.eq(team_id));
        }
        if let Some(from) = self.date_from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = self.date_to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }
        if let Some(min) = self.min_amount {
            query = query.filter(expenses::Column::Amount.gte(min));
        }
        if let Some(max) = self.max_amount {
            query = query.filter(expenses::Column::Amount.lte(max));
        }
        query
    }
}

/// Result of an expense write: the stored row and any budget alerts it raised.
#[derive(Debug, Clone)]
pub struct ExpenseWrite {
    /// Stored expense.
    pub expense: expenses::Model,
    /// Budget alerts raised by the write.
    pub alerts: Vec<RaisedAlert>,
}

async fn lock_expense(txn: &DatabaseTransaction, id: Uuid) -> Result<expenses::Model, ExpenseError> {
    expenses::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(ExpenseError::NotFound(id))
}

async fn ensure_team_member<C: ConnectionTrait>(
    conn: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Uuid, ExpenseError> {
    let manager = manager_of(conn, team_id)
        .await?
        .ok_or(ExpenseError::TeamNotFound(team_id))?;
    if !is_member(conn, team_id, user_id).await? {
        return Err(ExpenseError::NotTeamMember(team_id));
    }
    Ok(manager)
}

async fn paginate(
    db: &DatabaseConnection,
    query: Select<expenses::Entity>,
    page: &PageRequest,
) -> Result<(Vec<expenses::Model>, u64), DbErr> {
    let total = query.clone().count(db).await?;
    let items = query
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?;
    Ok((items, total))
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Submits an expense.
    ///
    /// Reconciles the matching budget, notifies the team manager when the
    /// submitter is someone else, and raises budget alerts.
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateExpenseInput,
        today: NaiveDate,
    ) -> Result<ExpenseWrite, ExpenseError> {
        validate_expense_fields(
            &ExpenseFields {
                amount: input.amount,
                description: &input.description,
                expense_date: input.expense_date,
            },
            today,
        )?;
        let currency = normalize_currency(input.currency.as_deref())?;

        let txn = self.db.begin().await?;

        let manager = match input.team_id {
            Some(team_id) => Some(ensure_team_member(&txn, team_id, user_id).await?),
            None => None,
        };

        let now = Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            team_id: Set(input.team_id),
            amount: Set(input.amount),
            currency: Set(currency),
            category: Set(input.category.into()),
            description: Set(input.description.trim().to_string()),
            expense_date: Set(input.expense_date),
            status: Set(DbStatus::Pending),
            receipt_url: Set(input.receipt_url),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            review_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let alerts = apply_deltas(&txn, &reconcile(None, Some(&expense.record()))).await?;

        if let Some(manager_id) = manager.filter(|m| *m != user_id) {
            let submitter = users::Entity::find_by_id(user_id)
                .one(&txn)
                .await?
                .map_or_else(|| "A team member".to_string(), |u| u.full_name);
            let message = NotificationMessage::expense_submitted(
                &submitter,
                expense.amount,
                &expense.currency,
                &expense.description,
            );
            insert_notification(&txn, manager_id, &message, Some(expense.id)).await?;
        }

        txn.commit().await?;
        info!(expense_id = %expense.id, user_id = %user_id, amount = %expense.amount, "Expense created");
        Ok(ExpenseWrite { expense, alerts })
    }

    /// Gets an expense visible to `viewer`: its owner or its team's manager.
    pub async fn find_visible(
        &self,
        id: Uuid,
        viewer: Uuid,
    ) -> Result<expenses::Model, ExpenseError> {
        let expense = expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))?;

        let manager = match expense.team_id {
            Some(team_id) if expense.user_id != viewer => manager_of(&self.db, team_id).await?,
            _ => None,
        };

        if ExpenseWorkflow::can_view(expense.user_id, manager, viewer) {
            Ok(expense)
        } else {
            Err(ExpenseError::Forbidden)
        }
    }

    /// Lists the caller's own expenses, newest first.
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        filter.validate()?;
        let query = filter
            .apply(expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id)))
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt);

        Ok(paginate(&self.db, query, page).await?)
    }

    /// Lists a team's expenses. Manager only.
    pub async fn list_for_team(
        &self,
        team_id: Uuid,
        manager_id: Uuid,
        filter: &ExpenseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        filter.validate()?;
        let manager = manager_of(&self.db, team_id)
            .await?
            .ok_or(ExpenseError::TeamNotFound(team_id))?;
        if manager != manager_id {
            return Err(ExpenseError::NotTeamManager);
        }

        let filter = ExpenseFilter {
            team_id: Some(team_id),
            ..filter.clone()
        };
        let query = filter
            .apply(expenses::Entity::find())
            .order_by_desc(expenses::Column::ExpenseDate)
            .order_by_desc(expenses::Column::CreatedAt);

        Ok(paginate(&self.db, query, page).await?)
    }

    /// Pending expenses in teams the caller manages, oldest first.
    pub async fn list_pending_for_manager(
        &self,
        manager_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        let team_ids = managed_team_ids(&self.db, manager_id).await?;

        if team_ids.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let query = expenses::Entity::find()
            .filter(expenses::Column::TeamId.is_in(team_ids))
            .filter(expenses::Column::Status.eq(DbStatus::Pending))
            .filter(expenses::Column::UserId.ne(manager_id))
            .order_by_asc(expenses::Column::CreatedAt);

        Ok(paginate(&self.db, query, page).await?)
    }

    /// Edits a pending expense. Owner only.
    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        input: UpdateExpenseInput,
        today: NaiveDate,
    ) -> Result<ExpenseWrite, ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = lock_expense(&txn, id).await?;
        if expense.user_id != user_id {
            return Err(ExpenseError::Forbidden);
        }
        ExpenseWorkflow::ensure_editable(expense.status.into())?;

        let amount = input.amount.unwrap_or(expense.amount);
        let description = input
            .description
            .unwrap_or_else(|| expense.description.clone());
        let expense_date = input.expense_date.unwrap_or(expense.expense_date);
        validate_expense_fields(
            &ExpenseFields {
                amount,
                description: &description,
                expense_date,
            },
            today,
        )?;
        let currency = match input.currency.as_deref() {
            Some(code) => normalize_currency(Some(code))?,
            None => expense.currency.clone(),
        };
        if let Some(Some(team_id)) = input.team_id {
            if expense.team_id != Some(team_id) {
                ensure_team_member(&txn, team_id, user_id).await?;
            }
        }

        let before = expense.record();
        let mut active: expenses::ActiveModel = expense.into();
        active.amount = Set(amount);
        active.currency = Set(currency);
        active.description = Set(description.trim().to_string());
        active.expense_date = Set(expense_date);
        if let Some(category) = input.category {
            active.category = Set(category.into());
        }
        if let Some(team_id) = input.team_id {
            active.team_id = Set(team_id);
        }
        if let Some(receipt_url) = input.receipt_url {
            active.receipt_url = Set(receipt_url);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        let alerts = apply_deltas(&txn, &reconcile(Some(&before), Some(&updated.record()))).await?;

        txn.commit().await?;
        info!(expense_id = %id, "Expense updated");
        Ok(ExpenseWrite {
            expense: updated,
            alerts,
        })
    }

    /// Deletes an expense that is not approved. Owner only.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = lock_expense(&txn, id).await?;
        if expense.user_id != user_id {
            return Err(ExpenseError::Forbidden);
        }
        ExpenseWorkflow::ensure_deletable(expense.status.into())?;

        let before = expense.record();
        expense.delete(&txn).await?;
        apply_deltas(&txn, &reconcile(Some(&before), None)).await?;

        txn.commit().await?;
        info!(expense_id = %id, "Expense deleted");
        Ok(())
    }

    /// Approves a pending expense. Team manager only, never their own.
    pub async fn approve(
        &self,
        id: Uuid,
        reviewer: Uuid,
        notes: Option<String>,
    ) -> Result<expenses::Model, ExpenseError> {
        self.review(id, reviewer, ReviewDecision::Approve { notes })
            .await
    }

    /// Rejects a pending expense with a reason. Team manager only, never their own.
    pub async fn reject(
        &self,
        id: Uuid,
        reviewer: Uuid,
        reason: String,
    ) -> Result<expenses::Model, ExpenseError> {
        self.review(id, reviewer, ReviewDecision::Reject { reason })
            .await
    }

    async fn review(
        &self,
        id: Uuid,
        reviewer: Uuid,
        decision: ReviewDecision,
    ) -> Result<expenses::Model, ExpenseError> {
        let txn = self.db.begin().await?;

        let expense = lock_expense(&txn, id).await?;
        let manager = match expense.team_id {
            Some(team_id) => manager_of(&txn, team_id).await?,
            None => None,
        };
        // Past this point the reviewer is the team manager or the owner of a team-less expense.
        let authorized = match manager {
            Some(manager) => manager == reviewer,
            None => expense.user_id == reviewer,
        };
        if !authorized {
            return Err(ExpenseError::NotTeamManager);
        }

        let outcome = ExpenseWorkflow::review(
            expense.status.into(),
            expense.user_id,
            manager,
            reviewer,
            decision,
        )?;

        let before = expense.record();
        let mut active: expenses::ActiveModel = expense.into();
        active.status = Set(outcome.new_status.into());
        active.reviewed_by = Set(Some(outcome.reviewed_by));
        active.reviewed_at = Set(Some(outcome.reviewed_at.into()));
        active.review_notes = Set(outcome.notes.clone());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        apply_deltas(&txn, &reconcile(Some(&before), Some(&updated.record()))).await?;

        let message = match outcome.new_status {
            ExpenseStatus::Rejected => NotificationMessage::expense_rejected(
                updated.amount,
                &updated.currency,
                outcome.notes.as_deref().unwrap_or_default(),
            ),
            _ => NotificationMessage::expense_approved(
                updated.amount,
                &updated.currency,
                outcome.notes.as_deref(),
            ),
        };
        insert_notification(&txn, updated.user_id, &message, Some(updated.id)).await?;

        txn.commit().await?;
        info!(
            expense_id = %id,
            reviewer = %reviewer,
            status = %outcome.new_status,
            "Expense reviewed"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rule_errors_split_between_validation_and_business_rule() {
        let validation = AppError::from(ExpenseError::Rule(ExpenseRuleError::NonPositiveAmount));
        assert_eq!(validation.error_code(), "VALIDATION_ERROR");

        let workflow = AppError::from(ExpenseError::Rule(ExpenseRuleError::NotEditable(
            ExpenseStatus::Approved,
        )));
        assert_eq!(workflow.error_code(), "BUSINESS_RULE_VIOLATION");

        let self_review = AppError::from(ExpenseError::Rule(ExpenseRuleError::SelfReview));
        assert_eq!(self_review.status_code(), 422);

        assert_eq!(AppError::from(ExpenseError::NotTeamManager).status_code(), 403);
    }

    #[test]
    fn test_filter_validation() {
        let backwards = ExpenseFilter {
            min_amount: Some(dec!(10)),
            max_amount: Some(dec!(5)),
            ..ExpenseFilter::default()
        };
        assert!(matches!(
            backwards.validate(),
            Err(ExpenseError::InvalidAmountRange { .. })
        ));

        let dates = ExpenseFilter {
            date_from: NaiveDate::from_ymd_opt(2025, 2, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..ExpenseFilter::default()
        };
        assert!(matches!(
            dates.validate(),
            Err(ExpenseError::Rule(ExpenseRuleError::InvalidDateRange { .. }))
        ));

        let huge = ExpenseFilter {
            max_amount: Some(dec!(10000000000000000)),
            ..ExpenseFilter::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ExpenseError::Rule(ExpenseRuleError::AmountTooLarge { .. }))
        ));

        assert!(ExpenseFilter::default().validate().is_ok());
    }
}
