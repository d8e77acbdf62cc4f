//! Configuration loading

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, ControllerConfig, DatabaseConfig, Environment,
    RconConfig, RedisConfig, SweeperConfig,
};
