//! Ban-family command handlers
//!
//! Every handler re-reads the new state from the database at handling time
//! and recomputes, with the shared resolver, whether the affected record is
//! or was the player's top-priority record. A record that never governed and
//! does not now govern causes no game-server traffic.

use chrono::Utc;
use std::collections::HashSet;
use tracing::{debug, warn};

use warden_core::{
    outranks, BanList, BanRecord, BanState, BanSyncMethod, RecordSnapshot,
};

use crate::commands::BanCommand;
use crate::context::SyncContext;
use crate::enforce::BanEnforcer;
use crate::error::SyncResult;

/// Handler for ban-family commands on one controller
pub struct BanCommandHandler<'a> {
    ctx: &'a SyncContext,
}

impl<'a> BanCommandHandler<'a> {
    /// Create a new handler
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one command to its handler
    pub async fn handle(&self, command: BanCommand) -> SyncResult<()> {
        match command {
            BanCommand::CreateRecord { record_id } => self.on_record_created(record_id).await,
            BanCommand::EditRecord { record_id, old } => {
                self.on_record_edited(record_id, old).await
            }
            BanCommand::DeleteRecord { old } => self.on_record_deleted(old).await,
            BanCommand::EditList { list_id } => self.on_list_edited(list_id).await,
            BanCommand::DeleteList { old_top } => self.on_list_deleted(old_top).await,
            BanCommand::ExpireAll { player_id, old } => {
                self.on_expire_all(&player_id, old).await
            }
            BanCommand::WarnOnline => self.on_warn_online().await,
        }
    }

    async fn on_record_created(&self, record_id: i64) -> SyncResult<()> {
        let server = self.ctx.server_number();

        // Fresh read; the record may have been edited or deleted since the
        // command was published.
        let Some(record) = self.ctx.ban_store().find_record(record_id).await? else {
            debug!(record_id, "Created record already gone");
            return Ok(());
        };
        let Some(list) = self.ctx.ban_store().find_list(record.list_id).await? else {
            return Ok(());
        };
        if !list.applies_to(server) || record.is_expired(Utc::now()) {
            return Ok(());
        }

        let others = self
            .ctx
            .ban_store()
            .active_records_for_player(&record.player_id, server, &[record.id])
            .await?;
        let previous = top_pair(&others);

        // A new record only matters if it outranks whatever governed before.
        if previous.is_some_and(|(prev, _)| !outranks(&record, prev)) {
            return Ok(());
        }

        let old_state =
            previous.map_or(BanState::None, |(r, l)| BanState::derive(r, l));
        BanEnforcer::new(self.ctx)
            .synchronize(&record.player_id, Some((&record, &list)), old_state)
            .await
    }

    async fn on_record_edited(&self, record_id: i64, old: RecordSnapshot) -> SyncResult<()> {
        let server = self.ctx.server_number();
        let player_id = old.player_id.clone();

        let others = self
            .ctx
            .ban_store()
            .active_records_for_player(&player_id, server, &[record_id])
            .await?;
        let was_top = others.iter().all(|(r, _)| outranks(&old, r));

        let edited = self.load_applicable(record_id, server).await?;
        let current = challenge(top_pair(&others), edited.as_ref());
        let is_top = current.is_some_and(|(r, _)| r.id == record_id);

        if !was_top && !is_top {
            return Ok(());
        }

        // If the edit took the record's priority away, the state the server
        // holds is still the snapshot's; otherwise the previous runner-up
        // governed.
        let old_state = if was_top {
            old.state
        } else {
            top_pair(&others).map_or(BanState::None, |(r, l)| BanState::derive(r, l))
        };

        BanEnforcer::new(self.ctx)
            .synchronize(&player_id, current, old_state)
            .await
    }

    async fn on_record_deleted(&self, old: RecordSnapshot) -> SyncResult<()> {
        let server = self.ctx.server_number();

        let others = self
            .ctx
            .ban_store()
            .active_records_for_player(&old.player_id, server, &[old.record_id])
            .await?;
        let was_top = others.iter().all(|(r, _)| outranks(&old, r));
        if !was_top {
            return Ok(());
        }

        BanEnforcer::new(self.ctx)
            .synchronize(&old.player_id, top_pair(&others), old.state)
            .await
    }

    async fn on_list_edited(&self, list_id: i32) -> SyncResult<()> {
        // The list may have lost or gained applicability to this server, or
        // changed its sync method; without per-player snapshots the safe
        // move is a refresh of every player the list holds records for.
        let records = self.ctx.ban_store().records_for_list(list_id).await?;
        let players: HashSet<String> =
            records.into_iter().map(|r| r.player_id).collect();

        if players.is_empty() {
            return Ok(());
        }
        debug!(list_id, players = players.len(), "Refreshing players of edited list");

        for player_id in players {
            if let Err(e) = self.refresh_player(&player_id).await {
                warn!(player_id, error = %e, "Failed to refresh player after list edit");
            }
        }

        Ok(())
    }

    async fn on_list_deleted(&self, old_top: Vec<RecordSnapshot>) -> SyncResult<()> {
        let server = self.ctx.server_number();

        for snapshot in old_top {
            let others = self
                .ctx
                .ban_store()
                .active_records_for_player(&snapshot.player_id, server, &[snapshot.record_id])
                .await?;
            let was_top = others.iter().all(|(r, _)| outranks(&snapshot, r));
            if !was_top {
                continue;
            }

            if let Err(e) = BanEnforcer::new(self.ctx)
                .synchronize(&snapshot.player_id, top_pair(&others), snapshot.state)
                .await
            {
                warn!(
                    player_id = %snapshot.player_id,
                    error = %e,
                    "Failed to resynchronize player after list delete"
                );
            }
        }

        Ok(())
    }

    async fn on_expire_all(
        &self,
        player_id: &str,
        old: Option<RecordSnapshot>,
    ) -> SyncResult<()> {
        let Some(old) = old else {
            // Nothing governed the player before; nothing to undo.
            return Ok(());
        };

        let server = self.ctx.server_number();
        let current = self
            .ctx
            .ban_store()
            .active_records_for_player(player_id, server, &[])
            .await?;

        BanEnforcer::new(self.ctx)
            .synchronize(player_id, top_pair(&current), old.state)
            .await
    }

    async fn on_warn_online(&self) -> SyncResult<()> {
        let server = self.ctx.server_number();
        let online = self.ctx.game().online_player_ids().await?;
        if online.is_empty() {
            return Ok(());
        }

        let all = self.ctx.ban_store().active_records_for_server(server).await?;
        let enforcer = BanEnforcer::new(self.ctx);

        for player_id in online {
            let held: Vec<&(BanRecord, BanList)> =
                all.iter().filter(|(r, _)| r.player_id == player_id).collect();
            let Some((record, list)) =
                held.into_iter().fold(None::<&(BanRecord, BanList)>, |best, pair| {
                    match best {
                        Some(b) if !outranks(&pair.0, &b.0) => Some(b),
                        _ => Some(pair),
                    }
                })
            else {
                continue;
            };

            // Immediate lists were already enforced when the record changed;
            // this sweep catches the punishments deferred to connect time.
            if list.sync_method == BanSyncMethod::BanImmediately {
                continue;
            }

            if let Err(e) = enforcer.apply(&player_id, record, list).await {
                warn!(player_id, error = %e, "Failed to enforce on online player");
            }
        }

        Ok(())
    }

    /// Fresh-read a record with its list, filtered to applicable and
    /// unexpired.
    async fn load_applicable(
        &self,
        record_id: i64,
        server: u8,
    ) -> SyncResult<Option<(BanRecord, BanList)>> {
        let Some(record) = self.ctx.ban_store().find_record(record_id).await? else {
            return Ok(None);
        };
        let Some(list) = self.ctx.ban_store().find_list(record.list_id).await? else {
            return Ok(None);
        };
        if !list.applies_to(server) || record.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some((record, list)))
    }

    async fn refresh_player(&self, player_id: &str) -> SyncResult<()> {
        let server = self.ctx.server_number();
        let candidates = self
            .ctx
            .ban_store()
            .active_records_for_player(player_id, server, &[])
            .await?;
        BanEnforcer::new(self.ctx)
            .refresh(player_id, top_pair(&candidates))
            .await
    }
}

/// Governing pair of a candidate set, by the shared resolver.
fn top_pair(pairs: &[(BanRecord, BanList)]) -> Option<(&BanRecord, &BanList)> {
    pairs
        .iter()
        .fold(None::<&(BanRecord, BanList)>, |best, pair| match best {
            Some(b) if !outranks(&pair.0, &b.0) => Some(b),
            _ => Some(pair),
        })
        .map(|(r, l)| (r, l))
}

/// The stronger of an incumbent pair and a challenger pair.
fn challenge<'p>(
    incumbent: Option<(&'p BanRecord, &'p BanList)>,
    challenger: Option<&'p (BanRecord, BanList)>,
) -> Option<(&'p BanRecord, &'p BanList)> {
    match (incumbent, challenger) {
        (Some((ir, il)), Some((cr, cl))) => {
            if outranks(cr, ir) {
                Some((cr, cl))
            } else {
                Some((ir, il))
            }
        }
        (None, Some((cr, cl))) => Some((cr, cl)),
        (incumbent, None) => incumbent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warden_core::ServerMask;

    fn list(id: i32) -> BanList {
        BanList {
            id,
            name: format!("list-{id}"),
            sync_method: BanSyncMethod::BanImmediately,
            servers: Some(ServerMask::ALL),
        }
    }

    fn record(id: i64, expires_in: Option<Duration>) -> BanRecord {
        BanRecord {
            id,
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "r".to_string(),
            notes: None,
            created_at: Utc::now() + Duration::seconds(id),
            expires_at: expires_in.map(|d| Utc::now() + d),
        }
    }

    #[test]
    fn test_top_pair_picks_governing_record() {
        let pairs = vec![
            (record(1, Some(Duration::days(1))), list(1)),
            (record(2, None), list(1)),
            (record(3, Some(Duration::days(30))), list(1)),
        ];
        let (top, _) = top_pair(&pairs).unwrap();
        assert_eq!(top.id, 2);

        assert!(top_pair(&[]).is_none());
    }

    #[test]
    fn test_challenge_prefers_outranking_record() {
        let incumbent_pair = (record(1, Some(Duration::days(1))), list(1));
        let challenger_pair = (record(2, None), list(2));

        let (winner, _) = challenge(
            Some((&incumbent_pair.0, &incumbent_pair.1)),
            Some(&challenger_pair),
        )
        .unwrap();
        assert_eq!(winner.id, 2);

        let (winner, _) =
            challenge(Some((&challenger_pair.0, &challenger_pair.1)), Some(&incumbent_pair))
                .unwrap();
        assert_eq!(winner.id, 2);

        assert!(challenge(None, None).is_none());
    }
}
