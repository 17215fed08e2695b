//! Authentication routes: register, login, refresh.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{error, info};
use validator::Validate;

use crate::{
    AppState,
    error::{error_response, unauthorized, validation_response},
};
use outlay_core::auth::{hash_password, validate_password_policy, verify_password};
use outlay_db::{
    UserRepository,
    entities::users,
    repositories::UserError,
};
use outlay_shared::{
    AppError, JwtError, TokenKind,
    auth::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, UserInfo},
};

/// Creates the authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Public view of a user row.
pub(crate) fn user_info(user: users::Model) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        is_active: user.is_active,
        created_at: user.created_at.to_utc(),
    }
}

fn invalid_credentials() -> Response {
    unauthorized("invalid_credentials", "Invalid email or password")
}

fn account_disabled() -> Response {
    unauthorized("account_disabled", "This account has been disabled")
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }
    if let Err(e) = validate_password_policy(&payload.password) {
        return error_response(AppError::Validation(e.to_string()));
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => return error_response(AppError::Internal(e.to_string())),
    };

    let user_repo = UserRepository::new((*state.db).clone());
    match user_repo
        .create(&payload.email, &password_hash, payload.full_name.trim())
        .await
    {
        Ok(user) => {
            info!(user_id = %user.id, "New user registered");
            (StatusCode::CREATED, Json(user_info(user))).into_response()
        }
        Err(e) => error_response(e.into()),
    }
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!("Login attempt for unknown email");
            return invalid_credentials();
        }
        Err(e) => return error_response(UserError::from(e).into()),
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(user_id = %user.id, error = %e, "Password verification error");
            return invalid_credentials();
        }
    }

    if !user.is_active {
        return account_disabled();
    }

    let tokens = match state.jwt_service.generate_pair(user.id, &user.email) {
        Ok(t) => t,
        Err(e) => return error_response(AppError::Internal(e.to_string())),
    };

    info!(user_id = %user.id, "User logged in");
    (
        StatusCode::OK,
        Json(LoginResponse {
            user: user_info(user),
            tokens,
        }),
    )
        .into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new access token.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return validation_response(&e);
    }

    let claims = match state
        .jwt_service
        .validate_kind(&payload.refresh_token, TokenKind::Refresh)
    {
        Ok(c) => c,
        Err(JwtError::Expired) => {
            return unauthorized("token_expired", "Refresh token has expired");
        }
        Err(_) => return unauthorized("invalid_token", "Invalid refresh token"),
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => return unauthorized("invalid_token", "Invalid refresh token"),
        Err(e) => return error_response(UserError::from(e).into()),
    };
    if !user.is_active {
        return account_disabled();
    }

    match state.jwt_service.generate_access_token(user.id, &user.email) {
        Ok(access_token) => (
            StatusCode::OK,
            Json(RefreshResponse {
                access_token,
                expires_in: state.jwt_service.access_token_expires_in(),
            }),
        )
            .into_response(),
        Err(e) => error_response(AppError::Internal(e.to_string())),
    }
}
