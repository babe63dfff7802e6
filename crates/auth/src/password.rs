//! Password hashing and verification (bcrypt).
//!
//! Cost is fixed at 10 rounds: high enough to resist offline brute force,
//! low enough to keep interactive latency acceptable.

use thiserror::Error;

/// Fixed bcrypt work factor.
const BCRYPT_COST: u32 = 10;

/// A password could not be hashed, or a stored digest is malformed.
///
/// A *wrong* password is not an error: [`verify_password`] returns
/// `Ok(false)` for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// Hash a plaintext password into a self-salting bcrypt digest.
pub fn hash_password(plain: &str) -> Result<String, HashError> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| HashError(e.to_string()))
}

/// Verify a plaintext password against a stored digest.
///
/// The underlying comparison is constant-time. Errors only for a digest
/// that is not valid bcrypt output.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, HashError> {
    bcrypt::verify(plain, digest).map_err(|e| HashError(e.to_string()))
}
