//! Signed bearer tokens (HS256 JWTs).
//!
//! The signing secret is process-wide configuration, read-only after
//! startup; no key rotation. Tokens carry a snapshot of the identity at
//! issuance time and a fixed 24h expiry. They are *authentication*
//! evidence only: authorization re-resolves the subject against the store
//! on every call, so a deleted or demoted account stops acting within one
//! round-trip, not at token expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use keygate_core::UserId;

/// Fixed token lifetime.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

/// Token payload. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: identity id at issuance time.
    pub sub: i64,

    /// Email snapshot at issuance time.
    pub email: String,

    /// Level snapshot at issuance time. Authorization decisions prefer the
    /// re-resolved identity's current level over this value.
    pub level: i32,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiry (unix seconds): issuance + 24h.
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// The token failed verification.
///
/// Signature mismatch and expiry both collapse into this one kind so a
/// caller cannot tell which check failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid token")]
pub struct InvalidToken;

/// Issues and verifies compact signed tokens with a symmetric secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `subject`, expiring [`TOKEN_LIFETIME_HOURS`] from now.
    pub fn issue(&self, subject: UserId, email: &str, level: i32) -> Result<String, InvalidToken> {
        self.issue_at(Utc::now(), subject, email, level)
    }

    fn issue_at(
        &self,
        now: DateTime<Utc>,
        subject: UserId,
        email: &str,
        level: i32,
    ) -> Result<String, InvalidToken> {
        let claims = Claims {
            sub: subject.as_i64(),
            email: email.to_string(),
            level,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| InvalidToken)
    }

    /// Verify signature integrity and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| InvalidToken)
    }
}
