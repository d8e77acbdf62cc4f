//! Ban-family admin service

use chrono::Utc;
use std::collections::HashMap;
use tracing::{error, instrument};

use warden_bus::SyncChannel;
use warden_core::{
    notify_mask, outranks, BanList, BanRecord, DomainError, NewBanList, NewBanRecord, Page,
    RecordSearch, RecordSnapshot, ServerMask, DEFAULT_LIST_ID,
};

use crate::commands::BanCommand;
use crate::context::SyncContext;
use crate::error::SyncResult;

/// Admin operations on ban lists and records
pub struct BanListService<'a> {
    ctx: &'a SyncContext,
}

impl<'a> BanListService<'a> {
    /// Create a new service
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Create a list. No command is published: an empty list enforces
    /// nothing yet.
    #[instrument(skip(self, new))]
    pub async fn create_list(&self, new: NewBanList) -> SyncResult<BanList> {
        Ok(self.ctx.ban_store().create_list(&new).await?)
    }

    /// Edit a list. Controllers losing applicability and controllers gaining
    /// it both get notified.
    #[instrument(skip(self, list), fields(list_id = list.id))]
    pub async fn edit_list(&self, list: BanList) -> SyncResult<BanList> {
        let old = self
            .ctx
            .ban_store()
            .find_list(list.id)
            .await?
            .ok_or(DomainError::ListNotFound(list.id))?;

        self.ctx.ban_store().update_list(&list).await?;

        let mask = notify_mask(old.servers, list.servers);
        self.publish(BanCommand::EditList { list_id: list.id }, mask).await;

        Ok(list)
    }

    /// Delete a list and all its records. The command carries, per affected
    /// player, the top-priority record the list held for them - the rows are
    /// gone by handling time.
    #[instrument(skip(self))]
    pub async fn delete_list(&self, id: i32) -> SyncResult<()> {
        if id == DEFAULT_LIST_ID {
            return Err(DomainError::DefaultListProtected.into());
        }

        let list = self
            .ctx
            .ban_store()
            .find_list(id)
            .await?
            .ok_or(DomainError::ListNotFound(id))?;

        let records = self.ctx.ban_store().records_for_list(id).await?;
        let now = Utc::now();
        let mut top_by_player: HashMap<&str, &BanRecord> = HashMap::new();
        for record in &records {
            if record.is_expired(now) {
                continue;
            }
            top_by_player
                .entry(record.player_id.as_str())
                .and_modify(|best| {
                    if outranks(record, *best) {
                        *best = record;
                    }
                })
                .or_insert(record);
        }
        let old_top: Vec<RecordSnapshot> = top_by_player
            .into_values()
            .map(|record| RecordSnapshot::of_ban(record, &list))
            .collect();

        self.ctx.ban_store().delete_list(id).await?;

        self.publish(BanCommand::DeleteList { old_top }, list.announce_mask()).await;

        Ok(())
    }

    /// Create a record.
    #[instrument(skip(self, new), fields(player_id = %new.player_id, list_id = new.list_id))]
    pub async fn create_record(&self, new: NewBanRecord) -> SyncResult<BanRecord> {
        let list = self
            .ctx
            .ban_store()
            .find_list(new.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(new.list_id))?;

        let record = self.ctx.ban_store().create_record(&new).await?;

        self.publish(
            BanCommand::CreateRecord { record_id: record.id },
            list.announce_mask(),
        )
        .await;

        Ok(record)
    }

    /// Edit a record. The pre-edit state is snapshotted into the command.
    #[instrument(skip(self, record), fields(record_id = record.id))]
    pub async fn edit_record(&self, record: BanRecord) -> SyncResult<BanRecord> {
        let old_record = self
            .ctx
            .ban_store()
            .find_record(record.id)
            .await?
            .ok_or(DomainError::RecordNotFound(record.id))?;
        let old_list = self
            .ctx
            .ban_store()
            .find_list(old_record.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(old_record.list_id))?;
        let new_list = if record.list_id == old_list.id {
            old_list.clone()
        } else {
            self.ctx
                .ban_store()
                .find_list(record.list_id)
                .await?
                .ok_or(DomainError::ListNotFound(record.list_id))?
        };

        self.ctx.ban_store().update_record(&record).await?;

        // A record moved between lists concerns the servers of both.
        let mask = old_list.announce_mask() | new_list.announce_mask();
        let old = RecordSnapshot::of_ban(&old_record, &old_list);
        self.publish(BanCommand::EditRecord { record_id: record.id, old }, mask).await;

        Ok(record)
    }

    /// Delete a record. The deleted state travels in the command.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: i64) -> SyncResult<()> {
        let record = self
            .ctx
            .ban_store()
            .find_record(id)
            .await?
            .ok_or(DomainError::RecordNotFound(id))?;
        let list = self
            .ctx
            .ban_store()
            .find_list(record.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(record.list_id))?;

        self.ctx.ban_store().delete_record(id).await?;

        let old = RecordSnapshot::of_ban(&record, &list);
        self.publish(BanCommand::DeleteRecord { old }, list.announce_mask()).await;

        Ok(())
    }

    /// Expire every record the player holds, keeping the rows for history.
    /// Returns the number of records touched.
    #[instrument(skip(self))]
    pub async fn expire_all_for_player(&self, player_id: &str) -> SyncResult<u64> {
        // Snapshot the governing record before the mutation erases the
        // information.
        let now = Utc::now();
        let pairs = self.ctx.ban_store().records_for_player(player_id).await?;
        let old = pairs
            .iter()
            .filter(|(record, _)| !record.is_expired(now))
            .fold(None::<&(BanRecord, BanList)>, |best, pair| match best {
                Some(b) if !outranks(&pair.0, &b.0) => Some(b),
                _ => Some(pair),
            })
            .map(|(record, list)| RecordSnapshot::of_ban(record, list));

        let touched = self.ctx.ban_store().expire_all_for_player(player_id, now).await?;

        self.publish(
            BanCommand::ExpireAll { player_id: player_id.to_string(), old },
            ServerMask::ALL,
        )
        .await;

        Ok(touched)
    }

    /// Ask every controller to enforce deferred punishments against its
    /// online players.
    #[instrument(skip(self))]
    pub async fn warn_online(&self) -> SyncResult<()> {
        self.publish(BanCommand::WarnOnline, ServerMask::ALL).await;
        Ok(())
    }

    /// Search records with filters and paging.
    pub async fn search_records(&self, search: &RecordSearch) -> SyncResult<Page<BanRecord>> {
        Ok(self.ctx.ban_store().search_records(search).await?)
    }

    /// Publish fire-and-forget: the store write is already committed, so a
    /// publish failure is logged and left to the next resync.
    async fn publish(&self, command: BanCommand, mask: ServerMask) {
        let name = command.name();
        match command.to_frame(mask) {
            Ok(frame) => {
                if let Err(e) = self.ctx.bus().publish(SyncChannel::Ban, &frame).await {
                    error!(
                        command = name,
                        error = %e,
                        "Failed to publish ban command; state heals on next resync"
                    );
                }
            }
            Err(e) => {
                error!(command = name, error = %e, "Failed to encode ban command");
            }
        }
    }
}
