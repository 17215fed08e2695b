//! Analytics routes over the caller's expenses.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{AppState, error::error_response, middleware::AuthUser};
use outlay_core::analytics::Granularity;
use outlay_db::AnalyticsRepository;

/// Creates the analytics routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/analytics/by-category", get(by_category))
        .route("/analytics/trend", get(trend))
        .route("/analytics/projection", get(projection))
        .route("/analytics/overview", get(overview))
}

fn default_include_pending() -> bool {
    true
}

/// Query parameters for the category breakdown.
#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    /// Start date.
    pub date_from: NaiveDate,
    /// End date.
    pub date_to: NaiveDate,
    /// Count pending expenses too.
    #[serde(default = "default_include_pending")]
    pub include_pending: bool,
}

/// Query parameters for the trend.
#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    /// Start date.
    pub date_from: NaiveDate,
    /// End date.
    pub date_to: NaiveDate,
    /// Bucket size.
    #[serde(default)]
    pub granularity: Granularity,
}

/// Query parameters for the projection.
#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    /// Year; defaults to the current one.
    pub year: Option<i32>,
    /// Month; defaults to the current one.
    pub month: Option<u32>,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// GET `/analytics/by-category`
async fn by_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CategoryQuery>,
) -> impl IntoResponse {
    let repo = AnalyticsRepository::new((*state.db).clone());
    match repo
        .by_category(
            auth.user_id(),
            query.date_from,
            query.date_to,
            query.include_pending,
        )
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/analytics/trend`
async fn trend(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TrendQuery>,
) -> impl IntoResponse {
    let repo = AnalyticsRepository::new((*state.db).clone());
    match repo
        .trend(auth.user_id(), query.date_from, query.date_to, query.granularity)
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/analytics/projection`
async fn projection(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ProjectionQuery>,
) -> impl IntoResponse {
    let repo = AnalyticsRepository::new((*state.db).clone());
    match repo
        .projection(auth.user_id(), query.year, query.month, today())
        .await
    {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/analytics/overview`
async fn overview(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = AnalyticsRepository::new((*state.db).clone());
    match repo.overview(auth.user_id(), today()).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::test_support::{access_token, app, json_body, send};

    #[tokio::test]
    async fn test_daily_trend_range_limit() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "GET",
            "/api/v1/analytics/trend?date_from=2023-01-01&date_to=2024-12-31&granularity=day",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_backwards_category_range() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "GET",
            "/api/v1/analytics/by-category?date_from=2025-02-01&date_to=2025-01-01",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_projection_month() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "GET",
            "/api/v1/analytics/projection?year=2025&month=13",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
