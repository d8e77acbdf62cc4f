//! # warden-rcon
//!
//! The game-server protocol client. Speaks a newline-delimited
//! request/response protocol over TCP, owns a small connection pool, and
//! wraps punishment/roster primitives behind the [`warden_core::GameClient`]
//! port. [`CachedGameClient`] adds a time-boxed online-player cache with
//! explicit invalidation after mutating calls.

pub mod cache;
pub mod client;
pub mod connection;
pub mod pool;

pub use cache::CachedGameClient;
pub use client::{RconClient, RconClientConfig};
pub use connection::RconConnection;
pub use pool::ConnectionPool;
