//! `keygate-auth` — pure authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP. Storage is reached only
//! through the [`UserStore`] contract, which the infra crate implements.

pub mod error;
pub mod level;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use level::{check_level, LevelPolicy};
pub use password::{hash_password, verify_password, HashError};
pub use service::{CredentialService, NewSignup};
pub use store::{StoreError, UserStore};
pub use token::{Claims, InvalidToken, TokenService, TOKEN_LIFETIME_HOURS};
