//! Health and identity introspection endpoints.

use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;

use crate::context::CurrentUser;

pub async fn health() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// The caller's identity as currently stored (not the token snapshot).
pub async fn whoami(Extension(user): Extension<CurrentUser>) -> Response {
    Json(user.view().clone()).into_response()
}
