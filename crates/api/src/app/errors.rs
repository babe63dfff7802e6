//! Mapping from domain errors to HTTP responses.
//!
//! Every error body has the same shape: `{"error": code, "message": msg}`.
//! Messages never carry password hashes or the signing secret.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use keygate_auth::{AuthError, StoreError};
use serde_json::json;

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "error": code, "message": message.into() })),
    )
        .into_response()
}

pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::DuplicateEmail => {
            json_error(StatusCode::CONFLICT, "duplicate_email", err.to_string())
        }
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            err.to_string(),
        ),
        AuthError::AccountDisabled => {
            json_error(StatusCode::FORBIDDEN, "account_disabled", err.to_string())
        }
        AuthError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "authentication required",
        ),
        AuthError::InsufficientLevel { .. } => {
            json_error(StatusCode::FORBIDDEN, "insufficient_level", err.to_string())
        }
        AuthError::Validation(message) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
        AuthError::Store(store) => store_error_to_response(store),
        AuthError::Internal(message) => {
            tracing::error!(error = %message, "internal auth failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Conflict(_) => {
            json_error(StatusCode::CONFLICT, "duplicate_email", "email already in use")
        }
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        StoreError::Unavailable(message) => {
            tracing::error!(error = %message, "user store unavailable");
            json_error(
                StatusCode::BAD_GATEWAY,
                "store_unavailable",
                "user store unavailable",
            )
        }
    }
}
