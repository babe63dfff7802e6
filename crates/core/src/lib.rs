//! `keygate-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod identity;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use identity::{
    normalize_email, normalize_level, Identity, IdentityUpdate, IdentityView, NewIdentity,
    MIN_LEVEL,
};
