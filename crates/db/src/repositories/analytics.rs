//! Analytics queries.
//!
//! Each call fetches the caller's expenses for the needed window once and
//! hands them to `AnalyticsService`; no aggregation runs in SQL.

use chrono::{Datelike, NaiveDate};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use tracing::debug;
use uuid::Uuid;

use outlay_core::analytics::{
    AnalyticsError, AnalyticsService, CategorySpending, Granularity, MonthlyProjection,
    SpendingOverview, TrendPoint,
};
use outlay_core::expense::ExpenseRecord;
use outlay_shared::AppError;

use super::budget::{BudgetError, BudgetRepository, month_bounds};
use super::notification::{NotificationError, NotificationRepository};
use crate::entities::expenses;

/// Error types for analytics queries.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsRepoError {
    /// Invalid analytics request.
    #[error(transparent)]
    Invalid(#[from] AnalyticsError),

    /// Budget lookup failed.
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Notification lookup failed.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<AnalyticsRepoError> for AppError {
    fn from(e: AnalyticsRepoError) -> Self {
        match e {
            AnalyticsRepoError::Invalid(_) => Self::Validation(e.to_string()),
            AnalyticsRepoError::Budget(inner) => inner.into(),
            AnalyticsRepoError::Notification(inner) => inner.into(),
            AnalyticsRepoError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Analytics repository.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    db: DatabaseConnection,
}

impl AnalyticsRepository {
    /// Creates a new analytics repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn records(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>, DbErr> {
        let rows = expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(expenses::Column::ExpenseDate.between(from, to))
            .all(&self.db)
            .await?;
        debug!(user_id = %user_id, %from, %to, rows = rows.len(), "Loaded expenses for analytics");
        Ok(rows.iter().map(expenses::Model::record).collect())
    }

    async fn month_records(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<ExpenseRecord>, AnalyticsRepoError> {
        let (first, last) =
            month_bounds(year, month).ok_or(AnalyticsError::InvalidMonth { year, month })?;
        Ok(self.records(user_id, first, last).await?)
    }

    /// Spending per category over `[from, to]`, largest first.
    pub async fn by_category(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        include_pending: bool,
    ) -> Result<Vec<CategorySpending>, AnalyticsRepoError> {
        AnalyticsService::validate_range(from, to, None)?;
        let records = self.records(user_id, from, to).await?;
        Ok(AnalyticsService::spending_by_category(
            &records,
            include_pending,
        ))
    }

    /// Spending per day or month over `[from, to]`, gaps filled with zero.
    pub async fn trend(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<TrendPoint>, AnalyticsRepoError> {
        AnalyticsService::validate_range(from, to, Some(granularity))?;
        let records = self.records(user_id, from, to).await?;
        Ok(AnalyticsService::spending_trend(
            &records,
            from,
            to,
            granularity,
        )?)
    }

    /// Month-end projection. Defaults to the month containing `today`.
    pub async fn projection(
        &self,
        user_id: Uuid,
        year: Option<i32>,
        month: Option<u32>,
        today: NaiveDate,
    ) -> Result<MonthlyProjection, AnalyticsRepoError> {
        let year = year.unwrap_or_else(|| today.year());
        let month = month.unwrap_or_else(|| today.month());

        let (first, last) =
            month_bounds(year, month).ok_or(AnalyticsError::InvalidMonth { year, month })?;
        if first > today {
            return Err(AnalyticsError::FutureMonth { year, month }.into());
        }

        let records = self.records(user_id, first, last).await?;
        let limits = BudgetRepository::new(self.db.clone())
            .limits_for_month(user_id, year, month)
            .await?;

        Ok(AnalyticsService::project_month(
            &records, year, month, today, &limits,
        )?)
    }

    /// Dashboard figures for the month containing `today`.
    pub async fn overview(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<SpendingOverview, AnalyticsRepoError> {
        let (year, month) = (today.year(), today.month());

        let records = self.month_records(user_id, year, month).await?;
        let over_limit = BudgetRepository::new(self.db.clone())
            .count_over_limit(user_id, year, month)
            .await?;
        let unread = NotificationRepository::new(self.db.clone())
            .unread_count(user_id)
            .await?;

        Ok(AnalyticsService::overview(
            &records, year, month, over_limit, unread,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_requests_are_validation_errors() {
        let err = AnalyticsRepoError::Invalid(AnalyticsError::FutureMonth {
            year: 2099,
            month: 1,
        });
        assert_eq!(AppError::from(err).status_code(), 400);
    }

    #[test]
    fn test_nested_errors_keep_their_mapping() {
        let err = AnalyticsRepoError::Budget(BudgetError::NotFound(Uuid::nil()));
        assert_eq!(AppError::from(err).status_code(), 404);
    }
}
