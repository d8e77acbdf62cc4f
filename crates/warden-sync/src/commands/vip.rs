//! VIP-family commands
//!
//! VIP membership is reconciled as a full diff against the live roster, so
//! every command here is just a typed trigger for a fresh reconcile - none
//! carries a payload.

use warden_bus::{CodecError, Frame};
use warden_core::ServerMask;

const SYNC_GAME_SERVER: u32 = 0;
const INACTIVATE_EXPIRED: u32 = 1;
const EDIT_LIST: u32 = 2;
const DELETE_LIST: u32 = 3;
const CREATE_RECORD: u32 = 4;
const EDIT_RECORD: u32 = 5;
const DELETE_RECORD: u32 = 6;
const REVOKE_VIP: u32 = 7;

/// VIP-family command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VipCommand {
    /// Plain resynchronization request (sweeper heartbeat, manual trigger).
    SyncGameServer,
    /// Expired records were deactivated.
    InactivateExpired,
    EditList,
    DeleteList,
    CreateRecord,
    EditRecord,
    DeleteRecord,
    /// All of one player's records were deactivated.
    RevokeVip,
}

impl VipCommand {
    /// Wire id of this command
    #[must_use]
    pub const fn command_id(self) -> u32 {
        match self {
            Self::SyncGameServer => SYNC_GAME_SERVER,
            Self::InactivateExpired => INACTIVATE_EXPIRED,
            Self::EditList => EDIT_LIST,
            Self::DeleteList => DELETE_LIST,
            Self::CreateRecord => CREATE_RECORD,
            Self::EditRecord => EDIT_RECORD,
            Self::DeleteRecord => DELETE_RECORD,
            Self::RevokeVip => REVOKE_VIP,
        }
    }

    /// Name for logging
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SyncGameServer => "SyncGameServer",
            Self::InactivateExpired => "InactivateExpired",
            Self::EditList => "EditList",
            Self::DeleteList => "DeleteList",
            Self::CreateRecord => "CreateRecord",
            Self::EditRecord => "EditRecord",
            Self::DeleteRecord => "DeleteRecord",
            Self::RevokeVip => "RevokeVip",
        }
    }

    /// Encode into a wire frame targeting the given servers
    #[must_use]
    pub fn into_frame(self, mask: ServerMask) -> Frame {
        Frame::empty(self.command_id(), mask)
    }

    /// Decode from a wire frame
    pub fn from_frame(frame: &Frame) -> Result<Self, CodecError> {
        match frame.command_id {
            SYNC_GAME_SERVER => Ok(Self::SyncGameServer),
            INACTIVATE_EXPIRED => Ok(Self::InactivateExpired),
            EDIT_LIST => Ok(Self::EditList),
            DELETE_LIST => Ok(Self::DeleteList),
            CREATE_RECORD => Ok(Self::CreateRecord),
            EDIT_RECORD => Ok(Self::EditRecord),
            DELETE_RECORD => Ok(Self::DeleteRecord),
            REVOKE_VIP => Ok(Self::RevokeVip),
            other => Err(CodecError::UnknownCommand(other)),
        }
    }
}
