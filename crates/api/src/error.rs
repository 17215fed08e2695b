//! Error-to-response mapping.
//!
//! Every error body has the shape `{"error": <code>, "message": <text>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use validator::ValidationErrors;

use outlay_shared::AppError;

/// Renders an application error. Server-side failures are logged and masked.
pub fn error_response(e: AppError) -> Response {
    if e.is_server_error() {
        error!(error = %e, "Request failed");
    }

    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.public_message()
        })),
    )
        .into_response()
}

/// Renders request DTO validation failures as a single `VALIDATION_ERROR`.
pub fn validation_response(errors: &ValidationErrors) -> Response {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(ToString::to_string))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field} {reason}")
        })
        .collect();
    fields.sort();

    error_response(AppError::Validation(fields.join("; ")))
}

/// Shorthand for a 401 with a specific machine code.
pub fn unauthorized(code: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": code, "message": message })),
    )
        .into_response()
}
