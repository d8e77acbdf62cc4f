//! Application configuration structs
//!
//! Loads configuration from environment variables (with `.env` support).
//! Every controller process is bound to exactly one game server, identified
//! by `CONTROLLER_SERVER_NUMBER`.

use std::env;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub controller: ControllerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub rcon: RconConfig,
    pub sweeper: SweeperConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Per-controller settings
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// 1-based number of the game server this controller is bound to.
    pub server_number: u8,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Game-server protocol client configuration
#[derive(Debug, Clone)]
pub struct RconConfig {
    pub address: String,
    pub password: String,
    pub pool_size: usize,
    pub command_timeout_secs: u64,
    /// TTL of the online-player cache, in seconds.
    pub online_cache_ttl_secs: u64,
}

/// Expiry sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub interval_secs: u64,
}

// Default value functions
fn default_app_name() -> String {
    "warden".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_redis_max_connections() -> u32 {
    8
}

fn default_rcon_pool_size() -> usize {
    4
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_online_cache_ttl_secs() -> u64 {
    15
}

fn default_sweeper_interval_secs() -> u64 {
    60
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidVar { var, value }),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// unparseable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            controller: ControllerConfig {
                server_number: parse_var("CONTROLLER_SERVER_NUMBER")?
                    .ok_or(ConfigError::MissingVar("CONTROLLER_SERVER_NUMBER"))?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")?
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: parse_var("REDIS_MAX_CONNECTIONS")?
                    .unwrap_or_else(default_redis_max_connections),
            },
            rcon: RconConfig {
                address: env::var("RCON_ADDRESS")
                    .map_err(|_| ConfigError::MissingVar("RCON_ADDRESS"))?,
                password: env::var("RCON_PASSWORD")
                    .map_err(|_| ConfigError::MissingVar("RCON_PASSWORD"))?,
                pool_size: parse_var("RCON_POOL_SIZE")?.unwrap_or_else(default_rcon_pool_size),
                command_timeout_secs: parse_var("RCON_COMMAND_TIMEOUT_SECS")?
                    .unwrap_or_else(default_command_timeout_secs),
                online_cache_ttl_secs: parse_var("RCON_ONLINE_CACHE_TTL_SECS")?
                    .unwrap_or_else(default_online_cache_ttl_secs),
            },
            sweeper: SweeperConfig {
                interval_secs: parse_var("SWEEPER_INTERVAL_SECS")?
                    .unwrap_or_else(default_sweeper_interval_secs),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_default() {
        assert_eq!(Environment::default(), Environment::Development);
        assert!(!Environment::Development.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_max_connections(), 10);
        assert_eq!(default_rcon_pool_size(), 4);
        assert_eq!(default_sweeper_interval_secs(), 60);
    }
}
