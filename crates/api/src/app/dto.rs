//! Request/response shapes for the HTTP surface.

use keygate_core::IdentityView;
use serde::{Deserialize, Serialize};

/// Characters accepted as the required "special" class.
const SPECIAL: &str = "@$!%*?&";

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub level: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: IdentityView,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

/// Password policy: at least 8 characters with lowercase, uppercase, digit,
/// and one special character from a fixed set.
pub fn password_meets_policy(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| SPECIAL.contains(c))
}

/// Human-readable policy statement, returned with validation failures.
pub const PASSWORD_POLICY: &str =
    "password must be at least 8 characters and include upper, lower, digit, and special characters";
