//! Application assembly: routers, shared services, request plumbing.

use std::sync::Arc;

use axum::{middleware as axum_middleware, Extension, Router};

use crate::config::AppConfig;
use crate::middleware::{identity_guard, AuthState};

pub mod dto;
pub mod errors;
pub mod report;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full application router against the configured store.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router(services))
}

/// Assemble routes around an already-built service set.
///
/// Protected routes sit behind the identity guard; every handler sees the
/// shared services through an extension.
pub fn router(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        credentials: services.credentials.clone(),
    };

    let protected = routes::protected_routes().layer(axum_middleware::from_fn_with_state(
        auth_state,
        identity_guard,
    ));

    Router::new()
        .merge(routes::public_routes())
        .merge(protected)
        .layer(Extension(services))
}
