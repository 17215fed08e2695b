//! Team routes: membership management and team expense listings.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::expenses::{ExpenseListQuery, page_response};
use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};
use outlay_db::{ExpenseRepository, TeamRepository};

/// Creates the team routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/{id}",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route("/teams/{id}/members", post(add_member))
        .route("/teams/{id}/members/{user_id}", delete(remove_member))
        .route("/teams/{id}/expenses", get(list_team_expenses))
}

/// Request body for creating a team.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name.
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: String,
    /// Optional description.
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Request body for updating a team.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub name: Option<String>,
    /// New description; an empty string clears it.
    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Request body for adding a member.
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    /// Email of the user to add.
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

/// GET `/teams` - Teams the caller belongs to.
async fn list_teams(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = TeamRepository::new((*state.db).clone());
    match repo.list_for_user(auth.user_id()).await {
        Ok(teams) => (StatusCode::OK, Json(teams)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/teams` - Create a team managed by the caller.
async fn create_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTeamRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let repo = TeamRepository::new((*state.db).clone());
    match repo
        .create(
            auth.user_id(),
            payload.name.trim(),
            payload.description.as_deref(),
        )
        .await
    {
        Ok(team) => (StatusCode::CREATED, Json(team)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// GET `/teams/{id}` - Team with members. Members only.
async fn get_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TeamRepository::new((*state.db).clone());
    match repo.get_for_member(id, auth.user_id()).await {
        Ok(detail) => (StatusCode::OK, Json(detail)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// PUT `/teams/{id}` - Manager only.
async fn update_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let repo = TeamRepository::new((*state.db).clone());
    match repo
        .update(
            id,
            auth.user_id(),
            payload.name.as_deref(),
            payload.description.as_deref(),
        )
        .await
    {
        Ok(team) => (StatusCode::OK, Json(team)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/teams/{id}` - Manager only.
async fn delete_team(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = TeamRepository::new((*state.db).clone());
    match repo.delete(id, auth.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST `/teams/{id}/members` - Add a user by email. Manager only.
async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let repo = TeamRepository::new((*state.db).clone());
    match repo.add_member(id, auth.user_id(), &payload.email).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// DELETE `/teams/{id}/members/{user_id}` - Manager only.
async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = TeamRepository::new((*state.db).clone());
    match repo.remove_member(id, auth.user_id(), user_id).await {
        Ok(()) => {
            info!(team_id = %id, user_id = %user_id, removed_by = %auth.user_id(), "Member removed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// GET `/teams/{id}/expenses` - Team expenses. Manager only.
async fn list_team_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ExpenseListQuery>,
) -> impl IntoResponse {
    let (filter, page) = query.into_parts();
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.list_for_team(id, auth.user_id(), &filter, &page).await {
        Ok(result) => (StatusCode::OK, Json(page_response(result, &page))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{access_token, app, send};

    #[tokio::test]
    async fn test_blank_team_name_is_rejected() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/teams",
            Some(&token),
            Some(json!({ "name": "" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_member_requires_valid_email() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            &format!("/api/v1/teams/{}/members", uuid::Uuid::new_v4()),
            Some(&token),
            Some(json!({ "email": "not-an-email" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
