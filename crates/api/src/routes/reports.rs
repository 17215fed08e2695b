//! Report routes: generate, fetch, list, and delete expense reports.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::error_response, middleware::AuthUser};
use outlay_core::reports::{ReportFilters, ReportStatistics};
use outlay_db::{
    ReportRepository,
    repositories::{GenerateReportInput, ReportRetention, StoredReport},
};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(generate_report))
        .route("/reports/{id}", get(get_report).delete(delete_report))
}

/// Request body for generating a report.
#[derive(Debug, Deserialize)]
pub struct GenerateReportRequest {
    /// Report name.
    pub name: String,
    /// Which expenses to include.
    #[serde(default)]
    pub filters: ReportFilters,
    /// Days to keep the report.
    pub ttl_days: Option<u32>,
}

/// Response for a report.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    /// Report ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Filters used.
    pub filters: ReportFilters,
    /// Statistics snapshot.
    pub statistics: ReportStatistics,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl From<StoredReport> for ReportResponse {
    fn from(r: StoredReport) -> Self {
        Self {
            id: r.id,
            name: r.name,
            filters: r.filters,
            statistics: r.statistics,
            generated_at: r.generated_at,
            expires_at: r.expires_at,
        }
    }
}

/// POST `/reports` - Compute and store a report.
async fn generate_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<GenerateReportRequest>,
) -> impl IntoResponse {
    let input = GenerateReportInput {
        name: payload.name,
        filters: payload.filters,
        ttl_days: payload.ttl_days,
    };
    let repo = ReportRepository::new((*state.db).clone());

    match repo
        .generate(auth.user_id(), input, ReportRetention::from(&state.reports))
        .await
    {
        Ok(report) => (StatusCode::CREATED, Json(ReportResponse::from(report))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/reports` - Non-expired reports, newest first.
async fn list_reports(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());
    match repo.list(auth.user_id()).await {
        Ok(reports) => {
            let response: Vec<ReportResponse> = reports.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// GET `/reports/{id}`
async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());
    match repo.get(id, auth.user_id()).await {
        Ok(report) => (StatusCode::OK, Json(ReportResponse::from(report))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/reports/{id}`
async fn delete_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ReportRepository::new((*state.db).clone());
    match repo.delete(id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}
