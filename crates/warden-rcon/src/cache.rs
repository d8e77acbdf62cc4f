//! Online-player cache.
//!
//! The enforcement engine asks "is this player online" on every ban command;
//! hitting the game server each time is wasteful during bulk operations.
//! [`CachedGameClient`] keeps the last online-player answer for a bounded
//! TTL and is invalidated explicitly after any call that changes who is
//! connected.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

use warden_core::{GameClient, GameResult, VipEntry};

struct CachedRoster {
    fetched_at: Instant,
    player_ids: Vec<String>,
}

/// Wrapper adding a time-boxed online-player cache to any [`GameClient`].
pub struct CachedGameClient<C> {
    inner: C,
    ttl: Duration,
    online: Mutex<Option<CachedRoster>>,
}

impl<C> CachedGameClient<C> {
    /// Wrap a client with the given cache TTL.
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self { inner, ttl, online: Mutex::new(None) }
    }

    /// Drop the cached roster; the next query hits the game server.
    pub fn invalidate_online(&self) {
        *self.online.lock() = None;
    }

    fn cached_online(&self) -> Option<Vec<String>> {
        let guard = self.online.lock();
        guard
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| cached.player_ids.clone())
    }

    fn store_online(&self, player_ids: &[String]) {
        *self.online.lock() = Some(CachedRoster {
            fetched_at: Instant::now(),
            player_ids: player_ids.to_vec(),
        });
    }
}

#[async_trait]
impl<C: GameClient> GameClient for CachedGameClient<C> {
    async fn kick(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()> {
        let result = self.inner.kick(player_id, reason, by).await;
        self.invalidate_online();
        result
    }

    async fn temp_ban(
        &self,
        player_id: &str,
        hours: u32,
        reason: &str,
        by: &str,
    ) -> GameResult<()> {
        let result = self.inner.temp_ban(player_id, hours, reason, by).await;
        self.invalidate_online();
        result
    }

    async fn perma_ban(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()> {
        let result = self.inner.perma_ban(player_id, reason, by).await;
        self.invalidate_online();
        result
    }

    async fn remove_temp_ban(&self, player_id: &str) -> GameResult<()> {
        self.inner.remove_temp_ban(player_id).await
    }

    async fn remove_perma_ban(&self, player_id: &str) -> GameResult<()> {
        self.inner.remove_perma_ban(player_id).await
    }

    async fn online_player_ids(&self) -> GameResult<Vec<String>> {
        if let Some(cached) = self.cached_online() {
            return Ok(cached);
        }

        let fresh = self.inner.online_player_ids().await?;
        self.store_online(&fresh);
        Ok(fresh)
    }

    async fn list_vips(&self) -> GameResult<Vec<VipEntry>> {
        self.inner.list_vips().await
    }

    async fn bulk_add_vips(&self, entries: &[VipEntry]) -> GameResult<()> {
        self.inner.bulk_add_vips(entries).await
    }

    async fn bulk_remove_vips(&self, player_ids: &[String]) -> GameResult<()> {
        self.inner.bulk_remove_vips(player_ids).await
    }
}
