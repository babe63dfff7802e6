//! Public credential endpoints: signup and signin.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use keygate_auth::NewSignup;

use crate::app::dto::{
    password_meets_policy, AuthResponse, SigninRequest, SignupRequest, PASSWORD_POLICY,
};
use crate::app::errors::{auth_error_to_response, json_error};
use crate::app::services::AppServices;

pub async fn signup(
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

    match services.credentials.signup(signup).await {
        Ok((access_token, user)) => (
            StatusCode::CREATED,
            Json(AuthResponse { access_token, user }),
        )
            .into_response(),
        Err(err) => auth_error_to_response(err),
    }
}

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SigninRequest>,
) -> Response {
    match services.credentials.signin(&body.email, &body.password).await {
        Ok((access_token, user)) => {
            Json(AuthResponse { access_token, user }).into_response()
        }
        Err(err) => auth_error_to_response(err),
    }
}
