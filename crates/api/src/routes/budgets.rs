//! Budget routes: monthly category limits with live spending status.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::error_response, middleware::AuthUser};
use outlay_core::expense::ExpenseCategory;
use outlay_db::{
    BudgetRepository,
    repositories::{BudgetWithStatus, CreateBudgetInput, UpdateBudgetInput},
};

/// Creates the budget routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route(
            "/budgets/{id}",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route("/budgets/{id}/recalculate", post(recalculate_budget))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a budget.
#[derive(Debug, Deserialize)]
pub struct CreateBudgetRequest {
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

/// Request body for updating a budget.
#[derive(Debug, Deserialize)]
pub struct UpdateBudgetRequest {
    /// New limit.
    pub limit_amount: Option<Decimal>,
    /// New alert threshold.
    pub alert_threshold: Option<i32>,
}

/// Query parameters for listing budgets.
#[derive(Debug, Deserialize)]
pub struct BudgetListQuery {
    /// Only this year.
    pub year: Option<i32>,
    /// Only this month.
    pub month: Option<u32>,
}

/// Response for a budget.
#[derive(Debug, Serialize)]
pub struct BudgetResponse {
    /// Budget ID.
    pub id: Uuid,
    /// Category.
    pub category: ExpenseCategory,
    /// Year.
    pub year: i32,
    /// Month.
    pub month: i32,
    /// Spending limit.
    pub limit_amount: Decimal,
    /// Pending and approved spending in the month.
    pub current_spent: Decimal,
    /// Alert threshold percent.
    pub alert_threshold: i32,
    /// Limit minus spent; negative when over.
    pub remaining: Decimal,
    /// Spent as a percent of the limit.
    pub utilization_percent: Decimal,
    /// Spent exceeds the limit.
    pub is_over_budget: bool,
    /// Utilization reached the alert threshold.
    pub is_near_limit: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetWithStatus> for BudgetResponse {
    fn from(BudgetWithStatus { budget, status }: BudgetWithStatus) -> Self {
        Self {
            id: budget.id,
            category: budget.category.into(),
            year: budget.year,
            month: budget.month,
            limit_amount: budget.limit_amount,
            current_spent: budget.current_spent,
            alert_threshold: budget.alert_threshold,
            remaining: status.remaining,
            utilization_percent: status.utilization_percent,
            is_over_budget: status.is_over_budget,
            is_near_limit: status.is_near_limit,
            created_at: budget.created_at.to_utc(),
            updated_at: budget.updated_at.to_utc(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/budgets` - List the caller's budgets.
async fn list_budgets(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<BudgetListQuery>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    match repo.list(auth.user_id(), query.year, query.month).await {
        Ok(budgets) => {
            let response: Vec<BudgetResponse> = budgets.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// POST `/budgets` - Create a budget for a category and month.
async fn create_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateBudgetRequest>,
) -> impl IntoResponse {
    let input = CreateBudgetInput {
        category: payload.category,
        year: payload.year,
        month: payload.month,
        limit_amount: payload.limit_amount,
        alert_threshold: payload.alert_threshold,
    };
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.create(auth.user_id(), input).await {
        Ok(budget) => (StatusCode::CREATED, Json(BudgetResponse::from(budget))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/budgets/{id}`
async fn get_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    match repo.get(id, auth.user_id()).await {
        Ok(budget) => (StatusCode::OK, Json(BudgetResponse::from(budget))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// PUT `/budgets/{id}` - Change the limit or threshold.
async fn update_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBudgetRequest>,
) -> impl IntoResponse {
    let input = UpdateBudgetInput {
        limit_amount: payload.limit_amount,
        alert_threshold: payload.alert_threshold,
    };
    let repo = BudgetRepository::new((*state.db).clone());

    match repo.update(id, auth.user_id(), input).await {
        Ok(budget) => (StatusCode::OK, Json(BudgetResponse::from(budget))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/budgets/{id}`
async fn delete_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    match repo.delete(id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/budgets/{id}/recalculate` - Recompute spending from expenses.
async fn recalculate_budget(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = BudgetRepository::new((*state.db).clone());
    match repo.recalculate(id, auth.user_id()).await {
        Ok(budget) => (StatusCode::OK, Json(BudgetResponse::from(budget))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    use crate::test_support::{access_token, app, json_body, send};

    #[rstest]
    #[case(json!({ "category": "meals", "year": 2025, "month": 13, "limit_amount": "100" }))]
    #[case(json!({ "category": "meals", "year": 1999, "month": 1, "limit_amount": "100" }))]
    #[case(json!({ "category": "meals", "year": 2025, "month": 1, "limit_amount": "0" }))]
    #[case(json!({ "category": "meals", "year": 2025, "month": 1, "limit_amount": "100", "alert_threshold": 0 }))]
    #[case(json!({ "category": "meals", "year": 2025, "month": 1, "limit_amount": "0.00001" }))]
    #[case(json!({ "category": "meals", "year": 2025, "month": 1, "limit_amount": "10000000000000000" }))]
    #[tokio::test]
    async fn test_invalid_budgets_rejected_before_storage(#[case] body: serde_json::Value) {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(app, "POST", "/api/v1/budgets", Some(&token), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_client_error() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/budgets",
            Some(&token),
            Some(json!({ "category": "yachts", "year": 2025, "month": 1, "limit_amount": "1" })),
        )
        .await;
        assert!(response.status().is_client_error());
    }
}
