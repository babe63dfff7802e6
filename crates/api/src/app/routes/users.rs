//! User administration endpoints (behind the identity guard).

use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keygate_auth::{hash_password, AuthError, NewSignup};
use keygate_core::{normalize_email, IdentityUpdate, IdentityView, UserId, MIN_LEVEL};
use serde_json::json;

use crate::app::dto::{
    password_meets_policy, ReportQuery, SignupRequest, UpdateUserRequest, PASSWORD_POLICY,
};
use crate::app::errors::{auth_error_to_response, json_error, store_error_to_response};
use crate::app::report;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SignupRequest>,
) -> Response {
    if !password_meets_policy(&body.password) {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", PASSWORD_POLICY);
    }

    let signup = NewSignup {
        email: body.email,
        password: body.password,
        first_name: body.first_name,
        last_name: body.last_name,
        level: body.level,
    };

    // Same creation path as signup, minus the token issuance.
    match services.credentials.register(signup).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(err) => auth_error_to_response(err),
    }
}

pub async fn list(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.store.list_active().await {
        Ok(users) => {
            let views: Vec<IdentityView> = users.iter().map(IdentityView::from).collect();
            Json(views).into_response()
        }
        Err(err) => store_error_to_response(err),
    }
}

pub async fn list_deleted(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.store.list_deleted().await {
        Ok(users) => {
            let views: Vec<IdentityView> = users.iter().map(IdentityView::from).collect();
            Json(views).into_response()
        }
        Err(err) => store_error_to_response(err),
    }
}

pub async fn export_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ReportQuery>,
) -> Response {
    if let Err(err) = authz::require_level(&services.levels, authz::OP_USERS_REPORT, Some(&user)) {
        return auth_error_to_response(err);
    }

    let users = match services.store.list_active().await {
        Ok(users) => users.iter().map(IdentityView::from).collect::<Vec<_>>(),
        Err(err) => return store_error_to_response(err),
    };

    match query.format.as_deref().unwrap_or("pdf") {
        "csv" => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"users-report.csv\"",
                ),
            ],
            report::render_csv(&users),
        )
            .into_response(),
        "pdf" => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"users-report.pdf\"",
                ),
            ],
            report::render_pdf(&users),
        )
            .into_response(),
        other => json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unsupported report format `{other}`"),
        ),
    }
}

pub async fn get(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.store.find_by_id(id).await {
        Ok(Some(user)) => Json(IdentityView::from(&user)).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(err) => store_error_to_response(err),
    }
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let email = match body.email.as_deref().map(normalize_email).transpose() {
        Ok(email) => email,
        Err(err) => {
            return json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string())
        }
    };

    if let Some(level) = body.level {
        if level < MIN_LEVEL {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("level must be at least {MIN_LEVEL}"),
            );
        }
    }

    let password_hash = match body.password {
        Some(password) => {
            if !password_meets_policy(&password) {
                return json_error(StatusCode::BAD_REQUEST, "validation_error", PASSWORD_POLICY);
            }
            match hash_password(&password) {
                Ok(hash) => Some(hash),
                Err(err) => return auth_error_to_response(AuthError::from(err)),
            }
        }
        None => None,
    };

    let changes = IdentityUpdate {
        email,
        password_hash,
        first_name: body.first_name,
        last_name: body.last_name,
        level: body.level,
    };

    match services.store.update(id, changes).await {
        Ok(user) => Json(IdentityView::from(&user)).into_response(),
        Err(err) => store_error_to_response(err),
    }
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.store.mark_deleted(id).await {
        Ok(()) => Json(json!({ "message": "user deleted" })).into_response(),
        Err(err) => store_error_to_response(err),
    }
}

fn parse_id(raw: &str) -> Result<UserId, Response> {
    raw.parse::<UserId>()
        .map_err(|err| json_error(StatusCode::BAD_REQUEST, "invalid_id", err.to_string()))
}
