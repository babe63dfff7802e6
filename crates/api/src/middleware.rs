//! Identity guard: bearer-token authentication for protected routes.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use keygate_auth::{AuthError, CredentialService, UserStore};

use crate::app::errors::auth_error_to_response;
use crate::context::CurrentUser;

/// Shared state handed to the identity guard.
#[derive(Clone)]
pub struct AuthState {
    pub credentials: Arc<CredentialService<dyn UserStore>>,
}

/// Authenticate the request and attach the caller's identity.
///
/// Verifies the bearer token, then re-resolves the subject against the
/// store so the request carries the identity's current state. A missing
/// or stale subject fails authentication regardless of token validity.
pub async fn identity_guard(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(&request)
        .ok_or_else(|| auth_error_to_response(AuthError::Unauthenticated))?;

    let identity = state
        .credentials
        .resolve_token(token)
        .await
        .map_err(auth_error_to_response)?;

    request.extensions_mut().insert(CurrentUser(identity));
    Ok(next.run(request).await)
}

fn extract_bearer<'a>(request: &'a Request<Body>) -> Option<&'a str> {
    let value = request.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
