//! Pooled game-server client.
//!
//! Implements the [`GameClient`] port over the line protocol with a per-call
//! timeout. Failed calls drop their connection instead of returning it to
//! the pool.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use warden_core::{GameClient, GameClientError, GameResult, VipEntry};

use crate::pool::ConnectionPool;

/// Client configuration
#[derive(Debug, Clone)]
pub struct RconClientConfig {
    pub address: String,
    pub password: String,
    pub pool_size: usize,
    pub command_timeout: Duration,
}

impl From<&warden_common::RconConfig> for RconClientConfig {
    fn from(config: &warden_common::RconConfig) -> Self {
        Self {
            address: config.address.clone(),
            password: config.password.clone(),
            pool_size: config.pool_size,
            command_timeout: Duration::from_secs(config.command_timeout_secs),
        }
    }
}

/// Game-server client backed by a connection pool.
pub struct RconClient {
    pool: ConnectionPool,
    command_timeout: Duration,
}

impl RconClient {
    /// Create a client; connections are dialed lazily on first use.
    #[must_use]
    pub fn new(config: RconClientConfig) -> Self {
        Self {
            pool: ConnectionPool::new(config.address, config.password, config.pool_size),
            command_timeout: config.command_timeout,
        }
    }

    async fn command<A, R>(&self, verb: &str, args: &A) -> GameResult<R>
    where
        A: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let mut pooled = self.pool.acquire().await?;

        let result = tokio::time::timeout(
            self.command_timeout,
            pooled.conn.command::<A, R>(verb, args),
        )
        .await;

        match result {
            Ok(Ok(response)) => {
                self.pool.release(pooled).await;
                Ok(response)
            }
            Ok(Err(e)) => {
                // NotFound responses come from a healthy connection.
                if e.is_not_found() {
                    self.pool.release(pooled).await;
                }
                Err(e)
            }
            Err(_) => Err(GameClientError::Timeout(self.command_timeout)),
        }
    }
}

#[async_trait]
impl GameClient for RconClient {
    async fn kick(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()> {
        self.command("kick", &json!({ "player_id": player_id, "reason": reason, "by": by }))
            .await
    }

    async fn temp_ban(
        &self,
        player_id: &str,
        hours: u32,
        reason: &str,
        by: &str,
    ) -> GameResult<()> {
        self.command(
            "temp_ban",
            &json!({ "player_id": player_id, "hours": hours, "reason": reason, "by": by }),
        )
        .await
    }

    async fn perma_ban(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()> {
        self.command(
            "perma_ban",
            &json!({ "player_id": player_id, "reason": reason, "by": by }),
        )
        .await
    }

    async fn remove_temp_ban(&self, player_id: &str) -> GameResult<()> {
        self.command("remove_temp_ban", &json!({ "player_id": player_id })).await
    }

    async fn remove_perma_ban(&self, player_id: &str) -> GameResult<()> {
        self.command("remove_perma_ban", &json!({ "player_id": player_id })).await
    }

    async fn online_player_ids(&self) -> GameResult<Vec<String>> {
        self.command("online_players", &json!({})).await
    }

    async fn list_vips(&self) -> GameResult<Vec<VipEntry>> {
        let entries: Vec<(String, String)> = self.command("list_vips", &json!({})).await?;
        Ok(entries
            .into_iter()
            .map(|(player_id, name)| VipEntry { player_id, name })
            .collect())
    }

    async fn bulk_add_vips(&self, entries: &[VipEntry]) -> GameResult<()> {
        let entries: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.player_id.as_str(), e.name.as_str()))
            .collect();
        self.command("add_vips", &entries).await
    }

    async fn bulk_remove_vips(&self, player_ids: &[String]) -> GameResult<()> {
        self.command("remove_vips", &player_ids).await
    }
}
