//! VIP-family admin service

use tracing::{error, instrument};

use warden_bus::SyncChannel;
use warden_core::{
    notify_mask, DomainError, NewVipList, NewVipRecord, Page, RecordSearch, ServerMask,
    VipList, VipRecord, DEFAULT_LIST_ID,
};

use crate::commands::VipCommand;
use crate::context::SyncContext;
use crate::error::SyncResult;

/// Admin operations on VIP lists and records
pub struct VipListService<'a> {
    ctx: &'a SyncContext,
}

impl<'a> VipListService<'a> {
    /// Create a new service
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Create a list. No command is published: an empty list grants nothing
    /// yet.
    #[instrument(skip(self, new))]
    pub async fn create_list(&self, new: NewVipList) -> SyncResult<VipList> {
        Ok(self.ctx.vip_store().create_list(&new).await?)
    }

    /// Edit a list. Controllers losing applicability and controllers gaining
    /// it both reconcile.
    #[instrument(skip(self, list), fields(list_id = list.id))]
    pub async fn edit_list(&self, list: VipList) -> SyncResult<VipList> {
        let old = self
            .ctx
            .vip_store()
            .find_list(list.id)
            .await?
            .ok_or(DomainError::ListNotFound(list.id))?;

        self.ctx.vip_store().update_list(&list).await?;

        let mask = notify_mask(old.servers, list.servers);
        self.publish(VipCommand::EditList, mask).await;

        Ok(list)
    }

    /// Delete a list and all its records.
    #[instrument(skip(self))]
    pub async fn delete_list(&self, id: i32) -> SyncResult<()> {
        if id == DEFAULT_LIST_ID {
            return Err(DomainError::DefaultListProtected.into());
        }

        let list = self
            .ctx
            .vip_store()
            .find_list(id)
            .await?
            .ok_or(DomainError::ListNotFound(id))?;

        self.ctx.vip_store().delete_list(id).await?;

        self.publish(VipCommand::DeleteList, list.announce_mask()).await;

        Ok(())
    }

    /// Create a record.
    #[instrument(skip(self, new), fields(player_id = %new.player_id, list_id = new.list_id))]
    pub async fn create_record(&self, new: NewVipRecord) -> SyncResult<VipRecord> {
        let list = self
            .ctx
            .vip_store()
            .find_list(new.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(new.list_id))?;

        let record = self.ctx.vip_store().create_record(&new).await?;

        self.publish(VipCommand::CreateRecord, list.announce_mask()).await;

        Ok(record)
    }

    /// Edit a record.
    #[instrument(skip(self, record), fields(record_id = record.id))]
    pub async fn edit_record(&self, record: VipRecord) -> SyncResult<VipRecord> {
        let old_record = self
            .ctx
            .vip_store()
            .find_record(record.id)
            .await?
            .ok_or(DomainError::RecordNotFound(record.id))?;
        let old_list = self
            .ctx
            .vip_store()
            .find_list(old_record.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(old_record.list_id))?;
        let new_list = if record.list_id == old_list.id {
            old_list.clone()
        } else {
            self.ctx
                .vip_store()
                .find_list(record.list_id)
                .await?
                .ok_or(DomainError::ListNotFound(record.list_id))?
        };

        self.ctx.vip_store().update_record(&record).await?;

        // A record moved between lists concerns the servers of both.
        let mask = old_list.announce_mask() | new_list.announce_mask();
        self.publish(VipCommand::EditRecord, mask).await;

        Ok(record)
    }

    /// Delete a record outright.
    #[instrument(skip(self))]
    pub async fn delete_record(&self, id: i64) -> SyncResult<()> {
        let record = self
            .ctx
            .vip_store()
            .find_record(id)
            .await?
            .ok_or(DomainError::RecordNotFound(id))?;
        let list = self
            .ctx
            .vip_store()
            .find_list(record.list_id)
            .await?
            .ok_or(DomainError::ListNotFound(record.list_id))?;

        self.ctx.vip_store().delete_record(id).await?;

        self.publish(VipCommand::DeleteRecord, list.announce_mask()).await;

        Ok(())
    }

    /// Deactivate every record the player holds, on any list. Returns the
    /// number of records deactivated.
    #[instrument(skip(self))]
    pub async fn revoke_vip(&self, player_id: &str) -> SyncResult<u64> {
        let deactivated = self.ctx.vip_store().deactivate_for_player(player_id).await?;

        self.publish(VipCommand::RevokeVip, ServerMask::ALL).await;

        Ok(deactivated)
    }

    /// Ask every controller for a full reconcile pass.
    #[instrument(skip(self))]
    pub async fn resync(&self) -> SyncResult<()> {
        self.publish(VipCommand::SyncGameServer, ServerMask::ALL).await;
        Ok(())
    }

    /// Search records with filters and paging.
    pub async fn search_records(&self, search: &RecordSearch) -> SyncResult<Page<VipRecord>> {
        Ok(self.ctx.vip_store().search_records(search).await?)
    }

    /// Publish fire-and-forget: the store write is already committed, so a
    /// publish failure is logged and left to the next resync.
    async fn publish(&self, command: VipCommand, mask: ServerMask) {
        let frame = command.into_frame(mask);
        if let Err(e) = self.ctx.bus().publish(SyncChannel::Vip, &frame).await {
            error!(
                command = command.name(),
                error = %e,
                "Failed to publish VIP command; state heals on next resync"
            );
        }
    }
}
