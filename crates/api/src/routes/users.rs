//! Profile routes for the signed-in user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::info;
use validator::Validate;

use super::auth::user_info;
use crate::{
    AppState,
    error::{error_response, validation_response},
    middleware::AuthUser,
};
use outlay_core::auth::{hash_password, validate_password_policy, verify_password};
use outlay_db::{UserRepository, repositories::UserError};
use outlay_shared::{
    AppError,
    auth::{ChangePasswordRequest, UpdateProfileRequest},
};

/// Creates the profile routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_profile).put(update_profile))
        .route("/users/me/password", post(change_password))
}

/// GET /users/me
async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    let repo = UserRepository::new((*state.db).clone());
    match repo.find_by_id(auth.user_id()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user_info(user))).into_response(),
        Ok(None) => error_response(UserError::NotFound(auth.user_id()).into()),
        Err(e) => error_response(UserError::from(e).into()),
    }
}

/// PUT /users/me
async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let repo = UserRepository::new((*state.db).clone());
    match repo
        .update_full_name(auth.user_id(), payload.full_name.trim())
        .await
    {
        Ok(user) => (StatusCode::OK, Json(user_info(user))).into_response(),
        Err(e) => error_response(e.into()),
    }
}

/// POST /users/me/password
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }
    if let Err(e) = validate_password_policy(&payload.new_password) {
        return error_response(AppError::Validation(e.to_string()));
    }

    let repo = UserRepository::new((*state.db).clone());
    let user = match repo.find_by_id(auth.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => return error_response(UserError::NotFound(auth.user_id()).into()),
        Err(e) => return error_response(UserError::from(e).into()),
    };

    match verify_password(&payload.current_password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            return error_response(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        Err(e) => return error_response(AppError::Internal(e.to_string())),
    }

    let hash = match hash_password(&payload.new_password) {
        Ok(h) => h,
        Err(e) => return error_response(AppError::Internal(e.to_string())),
    };

    match repo.update_password_hash(user.id, &hash).await {
        Ok(()) => {
            info!(user_id = %user.id, "Password changed");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{access_token, app, send};

    #[tokio::test]
    async fn test_profile_requires_auth() {
        let (app, _) = app();
        let response = send(app, "GET", "/api/v1/users/me", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_short_new_password_is_rejected_before_lookup() {
        let (app, state) = app();
        let token = access_token(&state);

        let response = send(
            app,
            "POST",
            "/api/v1/users/me/password",
            Some(&token),
            Some(json!({ "current_password": "old password", "new_password": "short" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
