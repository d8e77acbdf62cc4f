//! Expiry sweeper
//!
//! Periodically deactivates VIP records whose expiry has passed and
//! publishes a resynchronization command to every controller. The published
//! command doubles as the heartbeat that heals controllers which missed
//! earlier commands while offline. Ban-list expiry needs no sweep: it is a
//! lazy filter predicate in every governs-this-player query.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use warden_bus::SyncChannel;
use warden_core::ServerMask;

use crate::commands::VipCommand;
use crate::context::SyncContext;
use crate::error::SyncResult;

/// Periodic VIP expiry job
pub struct ExpirySweeper {
    ctx: Arc<SyncContext>,
    interval: Duration,
}

impl ExpirySweeper {
    /// Create a sweeper running every `interval`
    #[must_use]
    pub fn new(ctx: Arc<SyncContext>, interval: Duration) -> Self {
        Self { ctx, interval }
    }

    /// Spawn the periodic task; the handle lives for the process lifetime.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately, giving every controller a
            // reconcile on startup.
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep_once().await {
                    error!(error = %e, "Expiry sweep failed");
                }
            }
        })
    }

    /// Run one sweep: deactivate expired VIP records, then publish a
    /// resynchronization to every server. Returns the number of records
    /// deactivated.
    #[instrument(skip(self))]
    pub async fn sweep_once(&self) -> SyncResult<u64> {
        let deactivated = self.ctx.vip_store().deactivate_expired(Utc::now()).await?;
        if deactivated > 0 {
            info!(deactivated, "Deactivated expired VIP records");
        }

        let command = if deactivated > 0 {
            VipCommand::InactivateExpired
        } else {
            VipCommand::SyncGameServer
        };
        let frame = command.into_frame(ServerMask::ALL);
        self.ctx.bus().publish(SyncChannel::Vip, &frame).await?;

        Ok(deactivated)
    }
}
