//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREPULSE_DATABASE_URL` - `PostgreSQL` connection string
//! - `STOREPULSE_JWT_SECRET` - JWT signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREPULSE_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREPULSE_PORT` - Listen port (default: 4000)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2024-10)
//! - `REPORTING_UTC_OFFSET_MINUTES` - Fixed offset for day-bucketing of the
//!   revenue series (default: 330, i.e. UTC+05:30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Largest UTC offset accepted by `REPORTING_UTC_OFFSET_MINUTES` (UTC±14:00).
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Shopify Admin API version (e.g., 2024-10)
    pub shopify_api_version: String,
    /// Fixed UTC offset, in minutes, used when bucketing orders into
    /// calendar days for the revenue series
    pub reporting_offset_minutes: i32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (placeholder detection, length).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("STOREPULSE_DATABASE_URL")?);
        let host = get_env_or_default("STOREPULSE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREPULSE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREPULSE_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREPULSE_PORT".to_string(), e.to_string())
            })?;

        let jwt_secret = get_required_env("STOREPULSE_JWT_SECRET")?;
        validate_secret(&jwt_secret, "STOREPULSE_JWT_SECRET")?;
        let jwt_secret = SecretString::from(jwt_secret);

        let shopify_api_version = get_env_or_default("SHOPIFY_API_VERSION", "2024-10");

        let reporting_offset_minutes = get_env_or_default("REPORTING_UTC_OFFSET_MINUTES", "330")
            .parse::<i32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("REPORTING_UTC_OFFSET_MINUTES".to_string(), e.to_string())
            })?;
        if reporting_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::InvalidEnvVar(
                "REPORTING_UTC_OFFSET_MINUTES".to_string(),
                format!("offset must be within ±{MAX_UTC_OFFSET_MINUTES} minutes"),
            ));
        }

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            shopify_api_version,
            reporting_offset_minutes,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The fixed offset used for day-bucketing in the revenue series.
    ///
    /// The offset is validated at load time, so construction cannot fail here.
    #[must_use]
    pub fn reporting_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reporting_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is always valid"))
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Validate a signing secret: long enough and not an obvious placeholder.
fn validate_secret(value: &str, name: &str) -> Result<(), ConfigError> {
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("contains placeholder pattern \"{pattern}\""),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secret() {
        assert!(matches!(
            validate_secret("short", "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn rejects_placeholder_secret() {
        assert!(matches!(
            validate_secret("changeme-changeme-changeme-changeme", "TEST"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn accepts_high_entropy_secret() {
        assert!(validate_secret("kJ8s0qL2nV5xR7tB1wE4yU6iO9pA3dFg", "TEST").is_ok());
    }

    #[test]
    fn reporting_offset_converts_minutes() {
        let config = test_config(330);
        assert_eq!(
            config.reporting_offset(),
            FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
        );

        let config = test_config(-300);
        assert_eq!(config.reporting_offset(), FixedOffset::west_opt(5 * 3600).unwrap());
    }

    fn test_config(offset_minutes: i32) -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            jwt_secret: SecretString::from("kJ8s0qL2nV5xR7tB1wE4yU6iO9pA3dFg"),
            shopify_api_version: "2024-10".to_string(),
            reporting_offset_minutes: offset_minutes,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}
