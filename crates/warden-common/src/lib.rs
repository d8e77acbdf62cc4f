//! # warden-common
//!
//! Shared utilities for the warden workspace: environment-driven
//! configuration and tracing setup.

pub mod config;
pub mod telemetry;

pub use config::{
    AppConfig, AppSettings, ConfigError, ControllerConfig, DatabaseConfig, Environment,
    RconConfig, RedisConfig, SweeperConfig,
};
pub use telemetry::{init_tracing, try_init_tracing, TracingConfig, TracingError};
