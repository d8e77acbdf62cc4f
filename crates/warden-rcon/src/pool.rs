//! Connection pool.
//!
//! Connections are created lazily up to a cap and returned after use unless
//! the call that borrowed them failed, in which case the connection is
//! dropped and a fresh one is dialed next time. A semaphore bounds the
//! number of connections in flight.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use warden_core::GameResult;

use crate::connection::RconConnection;

/// Bounded pool of authenticated game-server connections.
pub struct ConnectionPool {
    address: String,
    password: String,
    idle: Mutex<Vec<RconConnection>>,
    permits: Arc<Semaphore>,
}

/// A connection checked out of the pool. Return it with
/// [`ConnectionPool::release`] after a successful call; drop it on failure.
pub struct PooledConnection {
    pub conn: RconConnection,
    _permit: OwnedSemaphorePermit,
}

impl ConnectionPool {
    /// Create a pool dialing the given address.
    #[must_use]
    pub fn new(address: String, password: String, size: usize) -> Self {
        Self {
            address,
            password,
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(size.max(1))),
        }
    }

    /// Check a connection out, dialing a new one if none is idle.
    pub async fn acquire(&self) -> GameResult<PooledConnection> {
        // The semaphore is never closed, so acquire can only fail on close.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| {
                warden_core::GameClientError::Transient("connection pool closed".to_string())
            })?;

        let idle = self.idle.lock().await.pop();
        let conn = match idle {
            Some(conn) => conn,
            None => RconConnection::connect(&self.address, &self.password).await?,
        };

        Ok(PooledConnection { conn, _permit: permit })
    }

    /// Return a healthy connection to the idle set.
    pub async fn release(&self, pooled: PooledConnection) {
        self.idle.lock().await.push(pooled.conn);
        // The permit is released when `pooled` drops.
    }
}
