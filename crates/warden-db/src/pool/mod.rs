//! Connection pool management

mod postgres;

pub use postgres::{create_pool, create_pool_from_config, DatabaseConfig};
