//! Report repository: persisted statistics snapshots with an expiry.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use outlay_core::reports::{ReportError, ReportFilters, ReportService, ReportStatistics};
use outlay_shared::{AppError, config::ReportsConfig};

use crate::entities::{expenses, reports};

/// Error types for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportRepoError {
    /// Report not found, not the caller's, or expired.
    #[error("Report not found: {0}")]
    NotFound(Uuid),

    /// Invalid report request.
    #[error(transparent)]
    Invalid(#[from] ReportError),

    /// Stored JSON could not be (de)serialized.
    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<ReportRepoError> for AppError {
    fn from(e: ReportRepoError) -> Self {
        match e {
            ReportRepoError::NotFound(_) => Self::NotFound(e.to_string()),
            ReportRepoError::Invalid(_) => Self::Validation(e.to_string()),
            ReportRepoError::Serialization(_) => Self::Internal(e.to_string()),
            ReportRepoError::Database(db) => Self::Database(db.to_string()),
        }
    }
}

/// Input for generating a report.
#[derive(Debug, Clone, Default)]
pub struct GenerateReportInput {
    /// Report name.
    pub name: String,
    /// Which expenses to include.
    pub filters: ReportFilters,
    /// Days to keep the report; falls back to the configured default.
    pub ttl_days: Option<u32>,
}

/// Retention limits for generated reports.
#[derive(Debug, Clone, Copy)]
pub struct ReportRetention {
    /// TTL used when a request does not name one.
    pub default_ttl_days: u32,
    /// Longest TTL a request may ask for.
    pub max_ttl_days: u32,
}

impl From<&ReportsConfig> for ReportRetention {
    fn from(config: &ReportsConfig) -> Self {
        Self {
            default_ttl_days: config.default_ttl_days,
            max_ttl_days: config.max_ttl_days,
        }
    }
}

/// A stored report with its typed payload.
#[derive(Debug, Clone)]
pub struct StoredReport {
    /// Report id.
    pub id: Uuid,
    /// Report name.
    pub name: String,
    /// Filters it was generated with.
    pub filters: ReportFilters,
    /// Computed statistics.
    pub statistics: ReportStatistics,
    /// When it was generated.
    pub generated_at: DateTime<Utc>,
    /// When it stops being retrievable.
    pub expires_at: DateTime<Utc>,
}

impl TryFrom<reports::Model> for StoredReport {
    type Error = serde_json::Error;

    fn try_from(model: reports::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            filters: serde_json::from_value(model.filters)?,
            statistics: serde_json::from_value(model.statistics)?,
            generated_at: model.generated_at.with_timezone(&Utc),
            expires_at: model.expires_at.with_timezone(&Utc),
        })
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Computes and stores a report over the caller's expenses.
    ///
    /// The caller's expired reports are purged in the same transaction.
    pub async fn generate(
        &self,
        user_id: Uuid,
        input: GenerateReportInput,
        retention: ReportRetention,
    ) -> Result<StoredReport, ReportRepoError> {
        ReportService::validate(&input.name, &input.filters)?;
        let ttl = ReportService::resolve_ttl(
            input.ttl_days,
            retention.default_ttl_days,
            retention.max_ttl_days,
        )?;

        let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));
        if let Some(from) = input.filters.date_from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = input.filters.date_to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }
        let records: Vec<_> = query
            .all(&self.db)
            .await?
            .iter()
            .map(expenses::Model::record)
            .collect();

        let statistics = ReportService::compute_statistics(&records, &input.filters);
        let now = Utc::now();

        let txn = self.db.begin().await?;

        let purged = reports::Entity::delete_many()
            .filter(reports::Column::UserId.eq(user_id))
            .filter(reports::Column::ExpiresAt.lte(now))
            .exec(&txn)
            .await?;
        if purged.rows_affected > 0 {
            debug!(user_id = %user_id, purged = purged.rows_affected, "Expired reports purged");
        }

        let report = reports::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(input.name.trim().to_string()),
            filters: Set(serde_json::to_value(&input.filters)?),
            statistics: Set(serde_json::to_value(&statistics)?),
            generated_at: Set(now.into()),
            expires_at: Set(ReportService::expires_at(now, ttl).into()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            report_id = %report.id,
            user_id = %user_id,
            expenses = statistics.count,
            ttl_days = ttl,
            "Report generated"
        );
        Ok(StoredReport::try_from(report)?)
    }

    /// Gets a non-expired report owned by the caller.
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> Result<StoredReport, ReportRepoError> {
        let report = reports::Entity::find_by_id(id)
            .filter(reports::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
            .ok_or(ReportRepoError::NotFound(id))?;

        if ReportService::is_expired(report.expires_at.with_timezone(&Utc), Utc::now()) {
            return Err(ReportRepoError::NotFound(id));
        }
        Ok(StoredReport::try_from(report)?)
    }

    /// Lists the caller's non-expired reports, newest first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<StoredReport>, ReportRepoError> {
        let reports = reports::Entity::find()
            .filter(reports::Column::UserId.eq(user_id))
            .filter(reports::Column::ExpiresAt.gt(Utc::now()))
            .order_by_desc(reports::Column::GeneratedAt)
            .all(&self.db)
            .await?;

        reports
            .into_iter()
            .map(|r| StoredReport::try_from(r).map_err(ReportRepoError::from))
            .collect()
    }

    /// Deletes a report owned by the caller.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), ReportRepoError> {
        let result = reports::Entity::delete_many()
            .filter(reports::Column::Id.eq(id))
            .filter(reports::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ReportRepoError::NotFound(id));
        }
        info!(report_id = %id, "Report deleted");
        Ok(())
    }
}
