//! Notification inbox routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::error_response, middleware::AuthUser};
use outlay_core::notification::NotificationKind;
use outlay_db::{NotificationRepository, entities::notifications};
use outlay_shared::types::{PageRequest, PageResponse};

/// Creates the notification routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", post(mark_all_read))
        .route("/notifications/{id}/read", post(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}

/// Query parameters for the inbox.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Page number.
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Response for a notification.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    /// Notification ID.
    pub id: Uuid,
    /// What it is about.
    pub kind: NotificationKind,
    /// Short title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Related expense, budget, or team.
    pub reference_id: Option<Uuid>,
    /// Read flag.
    pub is_read: bool,
    /// When it was read.
    pub read_at: Option<DateTime<Utc>>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

impl From<notifications::Model> for NotificationResponse {
    fn from(n: notifications::Model) -> Self {
        Self {
            id: n.id,
            kind: n.kind.into(),
            title: n.title,
            message: n.message,
            reference_id: n.reference_id,
            is_read: n.is_read,
            read_at: n.read_at.map(|t| t.to_utc()),
            created_at: n.created_at.to_utc(),
        }
    }
}

/// GET `/notifications` - Newest first.
async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> impl IntoResponse {
    let defaults = PageRequest::default();
    let page = PageRequest::new(
        query.page.unwrap_or(defaults.page),
        query.per_page.unwrap_or(defaults.per_page),
    );
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.list(auth.user_id(), query.unread_only, &page).await {
        Ok((items, total)) => {
            let response = PageResponse::new(items, page.page, page.per_page, total)
                .map(NotificationResponse::from);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// GET `/notifications/unread-count`
async fn unread_count(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.unread_count(auth.user_id()).await {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread_count": count }))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/notifications/{id}/read`
async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.mark_read(id, auth.user_id()).await {
        Ok(n) => (StatusCode::OK, Json(NotificationResponse::from(n))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/notifications/read-all`
async fn mark_all_read(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.mark_all_read(auth.user_id()).await {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/notifications/{id}`
async fn delete_notification(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());
    match repo.delete(id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlay_db::entities::sea_orm_active_enums::NotificationKind as DbKind;

    #[test]
    fn test_notification_response_serializes_kind_in_snake_case() {
        let now = Utc::now();
        let model = notifications::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: DbKind::BudgetExceeded,
            title: "Budget exceeded".to_string(),
            message: "Meals is over budget".to_string(),
            reference_id: None,
            is_read: false,
            read_at: None,
            created_at: now.into(),
        };

        let json = serde_json::to_value(NotificationResponse::from(model)).unwrap();
        assert_eq!(json["kind"], "budget_exceeded");
        assert_eq!(json["is_read"], false);
    }
}
