//! User service configuration.

use std::env;
use std::time::Duration;

use common::{DatabaseConfig, ServiceConfig};

/// Default bound on a single storage call
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 3000;

/// User service configuration.
#[derive(Debug, Clone)]
pub struct UserServiceConfig {
    /// Bind address and log level
    pub service: ServiceConfig,
    /// Connection pool settings
    pub database: DatabaseConfig,
    /// Upper bound for each storage call in milliseconds
    pub storage_timeout_ms: u64,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            service: ServiceConfig {
                service_name: defaults.service.service_name,
                host: env::var("USER_SERVICE_HOST").unwrap_or(defaults.service.host),
                port: parse_var("USER_SERVICE_PORT").unwrap_or(defaults.service.port),
                log_level: env::var("RUST_LOG").unwrap_or(defaults.service.log_level),
            },
            database: DatabaseConfig {
                url: env::var("USER_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: parse_var("USER_SERVICE_DB_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parse_var("USER_SERVICE_DB_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
                connect_timeout_ms: parse_var("USER_SERVICE_DB_CONNECT_TIMEOUT_MS")
                    .unwrap_or(defaults.database.connect_timeout_ms),
                acquire_timeout_ms: parse_var("USER_SERVICE_DB_ACQUIRE_TIMEOUT_MS")
                    .unwrap_or(defaults.database.acquire_timeout_ms),
            },
            storage_timeout_ms: parse_var("USER_SERVICE_STORAGE_TIMEOUT_MS")
                .unwrap_or(defaults.storage_timeout_ms),
        }
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                service_name: "user-service".to_string(),
                ..ServiceConfig::default()
            },
            database: DatabaseConfig::default(),
            storage_timeout_ms: DEFAULT_STORAGE_TIMEOUT_MS,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
