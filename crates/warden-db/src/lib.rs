//! # warden-db
//!
//! PostgreSQL implementations of the warden-core store ports, plus pool
//! management and row models.

pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_pool_from_config, DatabaseConfig};
pub use repositories::{PgBanListStore, PgVipListStore};

// Re-export for downstream crates that hold a pool
pub use sqlx::PgPool;

/// Embedded schema migrations. The migrator takes an advisory lock, so
/// several controllers starting at once run them exactly once.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
