//! Expense routes: submission, listing, edits, and manager review.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};
use outlay_core::budget::BudgetAlert;
use outlay_core::expense::{ExpenseCategory, ExpenseStatus};
use outlay_db::{
    ExpenseRepository,
    entities::expenses,
    repositories::{CreateExpenseInput, ExpenseFilter, ExpenseWrite, UpdateExpenseInput},
};
use outlay_shared::types::{PageRequest, PageResponse};

/// Creates the expense routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/pending-approvals", get(list_pending_approvals))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
        .route("/expenses/{id}/approve", post(approve_expense))
        .route("/expenses/{id}/reject", post(reject_expense))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting an expense.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    /// Amount spent.
    pub amount: Decimal,
    /// Three-letter currency code; defaults to USD.
    #[validate(length(equal = 3, message = "must be a three-letter code"))]
    pub currency: Option<String>,
    /// Category.
    pub category: ExpenseCategory,
    /// What the money was for.
    pub description: String,
    /// When it was spent.
    pub expense_date: NaiveDate,
    /// Team that reviews the expense.
    pub team_id: Option<Uuid>,
    /// Link to the receipt.
    #[validate(url(message = "must be a valid URL"))]
    pub receipt_url: Option<String>,
}

/// Request body for editing a pending expense.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpenseRequest {
    /// New amount.
    pub amount: Option<Decimal>,
    /// New currency.
    #[validate(length(equal = 3, message = "must be a three-letter code"))]
    pub currency: Option<String>,
    /// New category.
    pub category: Option<ExpenseCategory>,
    /// New description.
    pub description: Option<String>,
    /// New date.
    pub expense_date: Option<NaiveDate>,
    /// New team; `null` detaches the expense.
    #[serde(default, deserialize_with = "nullable")]
    pub team_id: Option<Option<Uuid>>,
    /// New receipt link; `null` removes it.
    #[serde(default, deserialize_with = "nullable")]
    #[validate(url(message = "must be a valid URL"))]
    pub receipt_url: Option<Option<String>>,
}

/// Keeps an explicit `null` apart from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request body for approving an expense.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    /// Optional reviewer notes.
    pub notes: Option<String>,
}

/// Request body for rejecting an expense.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the expense was rejected.
    pub reason: String,
}

/// Query parameters for expense listings.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseListQuery {
    /// Only this status.
    pub status: Option<ExpenseStatus>,
    /// Only this category.
    pub category: Option<ExpenseCategory>,
    /// Only this team.
    pub team_id: Option<Uuid>,
    /// Earliest date.
    pub date_from: Option<NaiveDate>,
    /// Latest date.
    pub date_to: Option<NaiveDate>,
    /// Smallest amount.
    pub min_amount: Option<Decimal>,
    /// Largest amount.
    pub max_amount: Option<Decimal>,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl ExpenseListQuery {
    /// Splits the query into a repository filter and a clamped page request.
    pub(crate) fn into_parts(self) -> (ExpenseFilter, PageRequest) {
        let defaults = PageRequest::default();
        let page = PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        );
        let filter = ExpenseFilter {
            status: self.status,
            category: self.category,
            team_id: self.team_id,
            date_from: self.date_from,
            date_to: self.date_to,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        };
        (filter, page)
    }
}

/// Query parameters for plain paginated listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// Response for an expense.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    /// Expense ID.
    pub id: Uuid,
    /// Submitter.
    pub user_id: Uuid,
    /// Reviewing team.
    pub team_id: Option<Uuid>,
    /// Amount.
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Category.
    pub category: ExpenseCategory,
    /// Description.
    pub description: String,
    /// Date spent.
    pub expense_date: NaiveDate,
    /// Review status.
    pub status: ExpenseStatus,
    /// Receipt link.
    pub receipt_url: Option<String>,
    /// Reviewer.
    pub reviewed_by: Option<Uuid>,
    /// Review time.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer notes or rejection reason.
    pub review_notes: Option<String>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<expenses::Model> for ExpenseResponse {
    fn from(e: expenses::Model) -> Self {
        Self {
            id: e.id,
            user_id: e.user_id,
            team_id: e.team_id,
            amount: e.amount,
            currency: e.currency,
            category: e.category.into(),
            description: e.description,
            expense_date: e.expense_date,
            status: e.status.into(),
            receipt_url: e.receipt_url,
            reviewed_by: e.reviewed_by,
            reviewed_at: e.reviewed_at.map(|t| t.to_utc()),
            review_notes: e.review_notes,
            created_at: e.created_at.to_utc(),
            updated_at: e.updated_at.to_utc(),
        }
    }
}

/// A budget alert raised by a write.
#[derive(Debug, Serialize)]
pub struct BudgetAlertResponse {
    /// Budget that crossed a line.
    pub budget_id: Uuid,
    /// Which line.
    pub alert: BudgetAlert,
}

/// Response for an expense write.
#[derive(Debug, Serialize)]
pub struct ExpenseWriteResponse {
    /// Stored expense.
    #[serde(flatten)]
    pub expense: ExpenseResponse,
    /// Alerts raised on the submitter's budgets.
    pub budget_alerts: Vec<BudgetAlertResponse>,
}

impl From<ExpenseWrite> for ExpenseWriteResponse {
    fn from(write: ExpenseWrite) -> Self {
        Self {
            expense: write.expense.into(),
            budget_alerts: write
                .alerts
                .into_iter()
                .map(|a| BudgetAlertResponse {
                    budget_id: a.budget_id,
                    alert: a.alert,
                })
                .collect(),
        }
    }
}

pub(crate) fn page_response(
    (items, total): (Vec<expenses::Model>, u64),
    page: &PageRequest,
) -> PageResponse<ExpenseResponse> {
    PageResponse::new(
        items.into_iter().map(ExpenseResponse::from).collect(),
        page.page,
        page.per_page,
        total,
    )
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/expenses` - List the caller's expenses.
async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExpenseListQuery>,
) -> impl IntoResponse {
    let (filter, page) = query.into_parts();
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.list(auth.user_id(), &filter, &page).await {
        Ok(result) => (StatusCode::OK, Json(page_response(result, &page))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/expenses` - Submit an expense.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let input = CreateExpenseInput {
        amount: payload.amount,
        currency: payload.currency,
        category: payload.category,
        description: payload.description,
        expense_date: payload.expense_date,
        team_id: payload.team_id,
        receipt_url: payload.receipt_url,
    };
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.create(auth.user_id(), input, today()).await {
        Ok(write) => (StatusCode::CREATED, Json(ExpenseWriteResponse::from(write))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/expenses/pending-approvals` - Pending expenses in teams the caller manages.
async fn list_pending_approvals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse {
    let page = query.page_request();
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.list_pending_for_manager(auth.user_id(), &page).await {
        Ok(result) => (StatusCode::OK, Json(page_response(result, &page))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/expenses/{id}`
async fn get_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.find_visible(id, auth.user_id()).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// PUT `/expenses/{id}` - Edit a pending expense.
async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let input = UpdateExpenseInput {
        amount: payload.amount,
        currency: payload.currency,
        category: payload.category,
        description: payload.description,
        expense_date: payload.expense_date,
        team_id: payload.team_id,
        receipt_url: payload.receipt_url,
    };
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.update(id, auth.user_id(), input, today()).await {
        Ok(write) => (StatusCode::OK, Json(ExpenseWriteResponse::from(write))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/expenses/{id}`
async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.delete(id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/expenses/{id}/approve`
async fn approve_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApproveRequest>>,
) -> impl IntoResponse {
    let notes = payload.and_then(|Json(p)| p.notes);
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.approve(id, auth.user_id(), notes).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/expenses/{id}/reject`
async fn reject_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());
    match repo.reject(id, auth.user_id(), payload.reason).await {
        Ok(expense) => (StatusCode::OK, Json(ExpenseResponse::from(expense))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::test_support::{access_token, app, json_body, send};

    #[test]
    fn test_list_query_clamps_paging() {
        let query = ExpenseListQuery {
            page: Some(0),
            per_page: Some(1000),
            status: Some(ExpenseStatus::Pending),
            ..ExpenseListQuery::default()
        };
        let (filter, page) = query.into_parts();

        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
        assert_eq!(filter.status, Some(ExpenseStatus::Pending));
    }

    #[test]
    fn test_expense_response_uses_wire_names() {
        let now = Utc::now();
        let model = expenses::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            team_id: None,
            amount: Decimal::new(1250, 2),
            currency: "USD".to_string(),
            category: ExpenseCategory::OfficeSupplies.into(),
            description: "Pens".to_string(),
            expense_date: now.date_naive(),
            status: ExpenseStatus::Pending.into(),
            receipt_url: None,
            reviewed_by: None,
            reviewed_at: None,
            review_notes: None,
            created_at: now.into(),
            updated_at: now.into(),
        };

        let json = serde_json::to_value(ExpenseResponse::from(model)).unwrap();
        assert_eq!(json["category"], "office_supplies");
        assert_eq!(json["status"], "PENDING");
        assert_eq!(json["amount"], "12.50");
    }

    #[tokio::test]
    async fn test_backwards_date_range_is_rejected() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "GET",
            "/api/v1/expenses?date_from=2025-02-01&date_to=2025-01-01",
            Some(&token),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected_before_storage() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/expenses",
            Some(&token),
            Some(json!({
                "amount": "0",
                "category": "meals",
                "description": "Lunch",
                "expense_date": "2025-01-15"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_update_request_separates_null_from_absent() {
        let cleared: UpdateExpenseRequest =
            serde_json::from_value(json!({ "team_id": null, "receipt_url": null })).unwrap();
        assert_eq!(cleared.team_id, Some(None));
        assert_eq!(cleared.receipt_url, Some(None));
        assert!(cleared.validate().is_ok());

        let untouched: UpdateExpenseRequest =
            serde_json::from_value(json!({ "description": "Taxi" })).unwrap();
        assert_eq!(untouched.team_id, None);
        assert_eq!(untouched.receipt_url, None);

        let bad_url: UpdateExpenseRequest =
            serde_json::from_value(json!({ "receipt_url": "not a url" })).unwrap();
        assert!(bad_url.validate().is_err());
    }

    #[tokio::test]
    async fn test_oversized_amount_is_rejected_before_storage() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/expenses",
            Some(&token),
            Some(json!({
                "amount": "10000000000000000",
                "category": "travel",
                "description": "Private jet",
                "expense_date": "2025-01-15"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_bad_receipt_url_is_rejected() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/expenses",
            Some(&token),
            Some(json!({
                "amount": "10",
                "category": "meals",
                "description": "Lunch",
                "expense_date": "2025-01-15",
                "receipt_url": "not a url"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
