//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

/// Fallback signing secret for local development only.
const DEV_SECRET: &str = "keygate-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingJwtSecret,
    #[error("invalid KEYGATE_ADDR `{0}`")]
    InvalidAddr(String),
}

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub addr: SocketAddr,
    /// HMAC secret used to sign and verify access tokens.
    pub jwt_secret: String,
    /// True when `APP_ENV=production`.
    pub production: bool,
    /// Postgres connection string, when persistence is configured.
    pub database_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// In production a missing or empty `JWT_SECRET` is a startup error.
    /// Outside production a development secret is substituted with a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr_raw =
            std::env::var("KEYGATE_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let addr: SocketAddr = addr_raw
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_raw.clone()))?;

        let production = std::env::var("APP_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        let jwt_secret = match secret {
            Some(s) => s,
            None if production => return Err(ConfigError::MissingJwtSecret),
            None => {
                tracing::warn!("JWT_SECRET not set; using development secret");
                DEV_SECRET.to_string()
            }
        };

        Ok(Self {
            addr,
            jwt_secret,
            production,
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Configuration suitable for tests: in-memory store, fixed secret,
    /// ephemeral port.
    pub fn for_tests(secret: &str) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: secret.to_string(),
            production: false,
            database_url: None,
        }
    }
}
