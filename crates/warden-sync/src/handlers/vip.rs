//! VIP-family command handlers
//!
//! Every VIP command resolves to the same action: a full reconcile pass
//! against the live roster. The typed command only says why.

use tracing::debug;

use crate::commands::VipCommand;
use crate::context::SyncContext;
use crate::error::SyncResult;
use crate::reconcile::VipReconciler;

/// Handler for VIP-family commands on one controller
pub struct VipCommandHandler<'a> {
    ctx: &'a SyncContext,
}

impl<'a> VipCommandHandler<'a> {
    /// Create a new handler
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Dispatch one command: all variants trigger a reconcile.
    pub async fn handle(&self, command: VipCommand) -> SyncResult<()> {
        debug!(command = command.name(), "Reconciling VIP roster");

        match command {
            VipCommand::SyncGameServer
            | VipCommand::InactivateExpired
            | VipCommand::EditList
            | VipCommand::DeleteList
            | VipCommand::CreateRecord
            | VipCommand::EditRecord
            | VipCommand::DeleteRecord
            | VipCommand::RevokeVip => {
                VipReconciler::new(self.ctx).reconcile().await?;
            }
        }

        Ok(())
    }
}
