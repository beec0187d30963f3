//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//! Binaries call `dotenvy::dotenv()` first so a local `.env` file works too.

use std::env;

/// Signing secret used when `JWT_SECRET` is not set. Insecure by definition.
pub const DEV_JWT_SECRET: &str = "ledgerly-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// SQLite connection string
    pub database_url: String,

    /// Maximum pooled connections
    pub database_max_connections: u32,

    /// Secret key for signing tokens
    pub jwt_secret: String,

    /// Token lifetime in seconds (default: 7 days)
    pub jwt_expiry_secs: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite://invoices.db".to_string(),
            database_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_expiry_secs: 604_800,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: parse_or(&lookup, "PORT", defaults.port)?,

            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),

            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,

            jwt_secret: lookup("JWT_SECRET")
                .filter(|secret| !secret.is_empty())
                .unwrap_or(defaults.jwt_secret),

            jwt_expiry_secs: parse_or(&lookup, "JWT_EXPIRY_SECS", defaults.jwt_expiry_secs)?,
        };

        if config.database_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DATABASE_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.jwt_expiry_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_EXPIRY_SECS".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
