//! Game-server protocol client port
//!
//! The enforcement and reconciliation engines drive a live game server
//! through this interface. The concrete client (warden-rcon) owns its
//! connection pool and per-call timeouts and may be shared by concurrent
//! callers.

use async_trait::async_trait;
use thiserror::Error;

/// Error type for game-server operations
#[derive(Debug, Error)]
pub enum GameClientError {
    /// The target of a removal does not exist on the server (the punishment
    /// may already have expired server-side). Callers removing punishments
    /// swallow this.
    #[error("Target not found on game server")]
    NotFound,

    /// The server rejected or failed the command; retrying later may work.
    #[error("Transient command error: {0}")]
    Transient(String),

    /// The response could not be understood.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl GameClientError {
    /// Check if this is a "target not found" failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Result type for game-server operations
pub type GameResult<T> = Result<T, GameClientError>;

/// One entry on the server's VIP roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VipEntry {
    pub player_id: String,
    /// Displayed label.
    pub name: String,
}

impl VipEntry {
    #[must_use]
    pub fn new(player_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { player_id: player_id.into(), name: name.into() }
    }
}

/// Punishment and roster primitives exposed by one live game server.
#[async_trait]
pub trait GameClient: Send + Sync {
    /// Kick the player if currently connected.
    async fn kick(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()>;

    /// Write a temporary ban lasting the given number of hours.
    async fn temp_ban(&self, player_id: &str, hours: u32, reason: &str, by: &str)
        -> GameResult<()>;

    /// Write a permanent ban.
    async fn perma_ban(&self, player_id: &str, reason: &str, by: &str) -> GameResult<()>;

    async fn remove_temp_ban(&self, player_id: &str) -> GameResult<()>;

    async fn remove_perma_ban(&self, player_id: &str) -> GameResult<()>;

    /// Ids of all currently connected players.
    async fn online_player_ids(&self) -> GameResult<Vec<String>>;

    /// The server's current VIP roster.
    async fn list_vips(&self) -> GameResult<Vec<VipEntry>>;

    async fn bulk_add_vips(&self, entries: &[VipEntry]) -> GameResult<()>;

    async fn bulk_remove_vips(&self, player_ids: &[String]) -> GameResult<()>;
}
