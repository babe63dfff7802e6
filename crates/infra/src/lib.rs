//! `keygate-infra` — user store implementations.
//!
//! Implements the `keygate-auth` [`UserStore`](keygate_auth::UserStore)
//! contract: an in-memory store for dev/test and a Postgres store (feature
//! `postgres`) for deployment. Both enforce email uniqueness among active
//! identities at the storage layer.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryUserStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresUserStore;
