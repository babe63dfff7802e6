//! Route tables.

use axum::routing::{get, post};
use axum::Router;

pub mod auth;
pub mod system;
pub mod users;

/// Routes reachable without a token.
pub fn public_routes() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/signin", post(auth::signin))
}

/// Routes behind the identity guard.
pub fn protected_routes() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users", post(users::create).get(users::list))
        .route("/users/deleted", get(users::list_deleted))
        .route("/users/report", get(users::export_report))
        .route(
            "/users/:id",
            get(users::get).patch(users::update).delete(users::remove),
        )
}
