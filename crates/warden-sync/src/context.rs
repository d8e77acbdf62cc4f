//! Synchronization context - dependency container
//!
//! Holds everything a controller's handlers, engines, and services need:
//! the two family stores, the bus publisher, the game client, and the
//! controller's own server number. Built once at startup and passed by
//! reference; there is no process-global state.

use async_trait::async_trait;
use std::sync::Arc;

use warden_bus::{Frame, Publisher, SyncChannel};
use warden_core::{BanListStore, GameClient, VipListStore};

use crate::error::{SyncError, SyncResult};

/// Outbound side of the command bus, as the engine sees it.
///
/// The production implementation is the Redis-backed
/// [`warden_bus::Publisher`]; tests substitute a recording fake.
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// Publish a frame, returning the number of receivers.
    async fn publish(&self, channel: SyncChannel, frame: &Frame) -> SyncResult<u32>;
}

#[async_trait]
impl CommandBus for Publisher {
    async fn publish(&self, channel: SyncChannel, frame: &Frame) -> SyncResult<u32> {
        Publisher::publish(self, channel, frame).await.map_err(SyncError::from)
    }
}

/// Dependency container for one controller process
#[derive(Clone)]
pub struct SyncContext {
    server_number: u8,
    ban_store: Arc<dyn BanListStore>,
    vip_store: Arc<dyn VipListStore>,
    game: Arc<dyn GameClient>,
    bus: Arc<dyn CommandBus>,
}

impl SyncContext {
    /// Create a new context
    pub fn new(
        server_number: u8,
        ban_store: Arc<dyn BanListStore>,
        vip_store: Arc<dyn VipListStore>,
        game: Arc<dyn GameClient>,
        bus: Arc<dyn CommandBus>,
    ) -> Self {
        Self { server_number, ban_store, vip_store, game, bus }
    }

    /// 1-based number of the game server this controller is bound to
    #[must_use]
    pub fn server_number(&self) -> u8 {
        self.server_number
    }

    /// Get the ban-family store
    pub fn ban_store(&self) -> &dyn BanListStore {
        self.ban_store.as_ref()
    }

    /// Get the VIP-family store
    pub fn vip_store(&self) -> &dyn VipListStore {
        self.vip_store.as_ref()
    }

    /// Get the game-server client
    pub fn game(&self) -> &dyn GameClient {
        self.game.as_ref()
    }

    /// Get the command bus
    pub fn bus(&self) -> &dyn CommandBus {
        self.bus.as_ref()
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("server_number", &self.server_number)
            .finish_non_exhaustive()
    }
}

/// Builder for creating a SyncContext
#[derive(Default)]
pub struct SyncContextBuilder {
    server_number: Option<u8>,
    ban_store: Option<Arc<dyn BanListStore>>,
    vip_store: Option<Arc<dyn VipListStore>>,
    game: Option<Arc<dyn GameClient>>,
    bus: Option<Arc<dyn CommandBus>>,
}

impl SyncContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn server_number(mut self, server_number: u8) -> Self {
        self.server_number = Some(server_number);
        self
    }

    #[must_use]
    pub fn ban_store(mut self, store: Arc<dyn BanListStore>) -> Self {
        self.ban_store = Some(store);
        self
    }

    #[must_use]
    pub fn vip_store(mut self, store: Arc<dyn VipListStore>) -> Self {
        self.vip_store = Some(store);
        self
    }

    #[must_use]
    pub fn game(mut self, game: Arc<dyn GameClient>) -> Self {
        self.game = Some(game);
        self
    }

    #[must_use]
    pub fn bus(mut self, bus: Arc<dyn CommandBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns an error naming the first missing dependency
    pub fn build(self) -> SyncResult<SyncContext> {
        fn missing(what: &str) -> SyncError {
            warden_core::DomainError::ValidationError(format!("{what} is required")).into()
        }

        Ok(SyncContext::new(
            self.server_number.ok_or_else(|| missing("server_number"))?,
            self.ban_store.ok_or_else(|| missing("ban_store"))?,
            self.vip_store.ok_or_else(|| missing("vip_store"))?,
            self.game.ok_or_else(|| missing("game"))?,
            self.bus.ok_or_else(|| missing("bus"))?,
        ))
    }
}
