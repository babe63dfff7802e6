//! Authentication/authorization error taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Terminal failures for a single authentication or authorization attempt.
///
/// `InvalidCredentials` deliberately covers both "unknown email" and "wrong
/// password" so callers cannot enumerate registered addresses.
/// `AccountDisabled` stays its own kind: once an account has been confirmed
/// to exist (correct password, or a previously valid token), a soft-deleted
/// account should get a distinct signal ("contact support", not "check your
/// password").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Signup against an email already held by an active identity.
    #[error("email already in use")]
    DuplicateEmail,

    /// Signin with an unknown email or a wrong password (indistinguishable).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The identity exists but has been soft-deleted.
    #[error("account disabled")]
    AccountDisabled,

    /// Missing/invalid/expired token, or the subject no longer resolves.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Authenticated, but the identity's level is below the operation's
    /// requirement. Carries the requirement for diagnostics/messaging.
    #[error("access denied: level {required} or higher required")]
    InsufficientLevel { required: i32 },

    /// Request fields failed validation before any credential work.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transient user-store failure; the caller's responsibility to retry.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Process-local failure (hashing or signing). Carries no secrets.
    #[error("internal auth failure: {0}")]
    Internal(String),
}

impl From<crate::password::HashError> for AuthError {
    fn from(err: crate::password::HashError) -> Self {
        Self::Internal(err.to_string())
    }
}
