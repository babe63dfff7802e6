//! Identity record and its sanitized projection.
//!
//! # Invariants
//! - `email` is stored trimmed and lowercased; uniqueness among *active*
//!   identities is enforced by the store, not here.
//! - `level` is always >= [`MIN_LEVEL`].
//! - `password_hash` never crosses a read boundary: every outward-facing
//!   shape is an [`IdentityView`].
//! - `deleted_at` set marks the identity soft-deleted: it keeps its record
//!   but must not authenticate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, UserId};

/// Lowest (least privileged) authorization level.
pub const MIN_LEVEL: i32 = 1;

/// A stored account record, as the user store returns it.
///
/// Carries the password hash, so it must stay inside the service boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Sanitized projection of an [`Identity`] (password hash stripped).
///
/// The only identity shape that serializes outward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityView {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Identity> for IdentityView {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            first_name: identity.first_name,
            last_name: identity.last_name,
            level: identity.level,
            created_at: identity.created_at,
            updated_at: identity.updated_at,
            deleted_at: identity.deleted_at,
        }
    }
}

impl From<&Identity> for IdentityView {
    fn from(identity: &Identity) -> Self {
        identity.clone().into()
    }
}

/// Fields for creating an identity. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: i32,
}

impl NewIdentity {
    /// Validate and normalize creation fields.
    ///
    /// The email is trimmed and lowercased; the level defaults to
    /// [`MIN_LEVEL`] when absent or below it.
    pub fn new(
        email: &str,
        password_hash: String,
        first_name: Option<String>,
        last_name: Option<String>,
        level: Option<i32>,
    ) -> Result<Self, DomainError> {
        let email = normalize_email(email)?;

        Ok(Self {
            email,
            password_hash,
            first_name: first_name.filter(|s| !s.trim().is_empty()),
            last_name: last_name.filter(|s| !s.trim().is_empty()),
            level: normalize_level(level),
        })
    }
}

/// Partial update for an identity. `None` fields are left untouched.
///
/// A present `password_hash` replaces the stored hash wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityUpdate {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: Option<i32>,
}

/// Trim + lowercase an email address, rejecting obviously malformed input.
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

/// Clamp an optional requested level to the valid range.
pub fn normalize_level(level: Option<i32>) -> i32 {
    match level {
        Some(l) if l >= MIN_LEVEL => l,
        _ => MIN_LEVEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_identity() -> Identity {
        let now = Utc::now();
        Identity {
            id: UserId::new(1),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
            level: 3,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn new_identity_normalizes_email_and_level() {
        let new = NewIdentity::new("  Alice@Example.COM ", "hash".into(), None, None, None).unwrap();
        assert_eq!(new.email, "alice@example.com");
        assert_eq!(new.level, MIN_LEVEL);

        let elevated = NewIdentity::new("b@x.com", "hash".into(), None, None, Some(4)).unwrap();
        assert_eq!(elevated.level, 4);
    }

    #[test]
    fn new_identity_rejects_malformed_email() {
        let result = NewIdentity::new("not-an-email", "hash".into(), None, None, None);
        assert!(matches!(result, Err(DomainError::Validation(_))));

        let result = NewIdentity::new("   ", "hash".into(), None, None, None);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn level_below_minimum_defaults() {
        assert_eq!(normalize_level(Some(0)), MIN_LEVEL);
        assert_eq!(normalize_level(Some(-7)), MIN_LEVEL);
        assert_eq!(normalize_level(None), MIN_LEVEL);
        assert_eq!(normalize_level(Some(9)), 9);
    }

    #[test]
    fn view_never_serializes_password_hash() {
        let view: IdentityView = sample_identity().into();
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "alice@example.com");
        assert_eq!(json["level"], 3);
        // Absent optionals are omitted entirely.
        assert!(json.get("last_name").is_none());
        assert!(json.get("deleted_at").is_none());
    }

    #[test]
    fn deleted_flag_follows_timestamp() {
        let mut identity = sample_identity();
        assert!(!identity.is_deleted());
        identity.deleted_at = Some(Utc::now());
        assert!(identity.is_deleted());
    }
}
