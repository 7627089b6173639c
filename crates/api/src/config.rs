use std::path::PathBuf;

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// Configuration errors raised at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Where entities are persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres { database_url: String },
    /// Process memory, optionally loaded from and saved to a JSON snapshot.
    Memory { snapshot_path: Option<PathBuf> },
}

/// CompanyCam client settings.
#[derive(Debug, Clone)]
pub struct CompanyCamConfig {
    /// Bearer token. Sync endpoints are unavailable without it.
    pub api_token: Option<String>,
    pub base_url: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub store: StoreBackend,
    pub companycam: CompanyCamConfig,
    /// Public web origin used to build invite links.
    pub app_origin: String,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = var_or(name, default);
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                         |
    /// |-------------------------|---------------------------------|
    /// | `HOST`                  | `0.0.0.0`                       |
    /// | `PORT`                  | `3000`                          |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`         |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                            |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                            |
    /// | `JWT_SECRET`            | required                        |
    /// | `JWT_ACCESS_EXPIRY_MINS`| `60`                            |
    /// | `STORE_BACKEND`         | `postgres`, or `memory`         |
    /// | `DATABASE_URL`          | required for `postgres`         |
    /// | `STORE_SNAPSHOT_PATH`   | unset (memory store not saved)  |
    /// | `COMPANYCAM_API_TOKEN`  | unset                           |
    /// | `COMPANYCAM_BASE_URL`   | `https://api.companycam.com/v2` |
    /// | `APP_ORIGIN`            | `http://localhost:5173`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        let cors_origins: Vec<String> = var_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let secret = optional_var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt = JwtConfig {
            secret,
            access_token_expiry_mins: parse_var(
                "JWT_ACCESS_EXPIRY_MINS",
                &DEFAULT_ACCESS_EXPIRY_MINS.to_string(),
            )?,
        };

        let store = match var_or("STORE_BACKEND", "postgres").as_str() {
            "postgres" => StoreBackend::Postgres {
                database_url: optional_var("DATABASE_URL")
                    .ok_or(ConfigError::Missing("DATABASE_URL"))?,
            },
            "memory" => StoreBackend::Memory {
                snapshot_path: optional_var("STORE_SNAPSHOT_PATH").map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", "3000")?,
            cors_origins,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "30")?,
            shutdown_timeout_secs: parse_var("SHUTDOWN_TIMEOUT_SECS", "30")?,
            jwt,
            store,
            companycam: CompanyCamConfig {
                api_token: optional_var("COMPANYCAM_API_TOKEN"),
                base_url: var_or("COMPANYCAM_BASE_URL", sitelink_companycam::DEFAULT_BASE_URL),
            },
            app_origin: var_or("APP_ORIGIN", "http://localhost:5173"),
        })
    }
}
