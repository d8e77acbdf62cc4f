//! Ban enforcement engine
//!
//! Turns a change in a player's governing record into game-server actions:
//! remove the stale punishment, then kick, temp-ban, or perma-ban per the
//! new state. Lists that do not ban immediately defer enforcement until the
//! player is next seen online.

use chrono::Utc;
use tracing::{debug, instrument};

use warden_core::{BanList, BanRecord, BanState, BanSyncMethod};

use crate::context::SyncContext;
use crate::error::SyncResult;

/// Ban enforcement engine over one controller's context
pub struct BanEnforcer<'a> {
    ctx: &'a SyncContext,
}

impl<'a> BanEnforcer<'a> {
    /// Create a new enforcer
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Move a player from `old_state` to whatever `new` implies.
    ///
    /// `new` is the record now governing the player (with its owning list),
    /// or `None` when nothing governs anymore.
    #[instrument(skip(self, new), fields(server = self.ctx.server_number()))]
    pub async fn synchronize(
        &self,
        player_id: &str,
        new: Option<(&BanRecord, &BanList)>,
        old_state: BanState,
    ) -> SyncResult<()> {
        let new_state = new.map(|(record, list)| BanState::derive(record, list));

        // A ban-on-connect list re-applies even without a state change so an
        // edited reason becomes visible on the server.
        let reason_visible = new
            .is_some_and(|(_, list)| list.sync_method == BanSyncMethod::BanOnConnect);

        if new_state != Some(old_state) || reason_visible {
            self.remove_punishment(player_id, old_state).await?;
        }

        let Some((record, list)) = new else {
            return Ok(());
        };

        if list.sync_method != BanSyncMethod::BanImmediately
            && !self.is_online(player_id).await?
        {
            debug!(player_id, "Enforcement deferred until player connects");
            return Ok(());
        }

        self.apply(player_id, record, list).await
    }

    /// Remove both punishment kinds and re-apply the governing record.
    ///
    /// Used where the previously applied state is unknowable (list-level
    /// changes travel without per-player snapshots).
    #[instrument(skip(self, new), fields(server = self.ctx.server_number()))]
    pub async fn refresh(
        &self,
        player_id: &str,
        new: Option<(&BanRecord, &BanList)>,
    ) -> SyncResult<()> {
        self.remove_punishment(player_id, BanState::Temp).await?;
        self.remove_punishment(player_id, BanState::Perma).await?;

        let Some((record, list)) = new else {
            return Ok(());
        };

        if list.sync_method != BanSyncMethod::BanImmediately
            && !self.is_online(player_id).await?
        {
            debug!(player_id, "Enforcement deferred until player connects");
            return Ok(());
        }

        self.apply(player_id, record, list).await
    }

    /// Apply the punishment a record maps to, unconditionally.
    pub async fn apply(
        &self,
        player_id: &str,
        record: &BanRecord,
        list: &BanList,
    ) -> SyncResult<()> {
        match BanState::derive(record, list) {
            BanState::None => {
                self.ctx
                    .game()
                    .kick(player_id, &record.reason, &record.admin_name)
                    .await?;
            }
            BanState::Temp => {
                let hours = remaining_hours(record);
                self.ctx
                    .game()
                    .temp_ban(player_id, hours, &record.reason, &record.admin_name)
                    .await?;
            }
            BanState::Perma => {
                self.ctx
                    .game()
                    .perma_ban(player_id, &record.reason, &record.admin_name)
                    .await?;
            }
        }
        Ok(())
    }

    /// Remove the punishment belonging to `state`, swallowing "not found" -
    /// the punishment may already have expired server-side.
    async fn remove_punishment(&self, player_id: &str, state: BanState) -> SyncResult<()> {
        let result = match state {
            BanState::None => return Ok(()),
            BanState::Temp => self.ctx.game().remove_temp_ban(player_id).await,
            BanState::Perma => self.ctx.game().remove_perma_ban(player_id).await,
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(player_id, ?state, "Punishment already absent on server");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn is_online(&self, player_id: &str) -> SyncResult<bool> {
        let online = self.ctx.game().online_player_ids().await?;
        Ok(online.iter().any(|id| id == player_id))
    }
}

/// Hours left on an expiring record, rounded up, at least one.
fn remaining_hours(record: &BanRecord) -> u32 {
    let Some(expires_at) = record.expires_at else {
        return 1;
    };
    let seconds = (expires_at - Utc::now()).num_seconds().max(0);
    u32::try_from((seconds as u64).div_ceil(3600)).unwrap_or(u32::MAX).max(1)
}
