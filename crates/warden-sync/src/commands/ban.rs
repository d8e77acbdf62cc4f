//! Ban-family commands
//!
//! Edit/delete commands carry an old-state [`RecordSnapshot`]: by handling
//! time the row may be gone or changed again, so the historical context
//! travels in the payload while the new state is always re-read live.
//! Create/edit-list commands carry only a row address.

use serde::{Deserialize, Serialize};

use warden_bus::{CodecError, Frame};
use warden_core::{RecordSnapshot, ServerMask};

const CREATE_RECORD: u32 = 0;
const EDIT_RECORD: u32 = 1;
const DELETE_RECORD: u32 = 2;
const EDIT_LIST: u32 = 3;
const DELETE_LIST: u32 = 4;
const EXPIRE_ALL: u32 = 5;
const WARN_ONLINE: u32 = 6;

#[derive(Debug, Serialize, Deserialize)]
struct CreateRecordPayload {
    record_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct EditRecordPayload {
    record_id: i64,
    old: RecordSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeleteRecordPayload {
    old: RecordSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
struct EditListPayload {
    list_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
struct DeleteListPayload {
    old_top: Vec<RecordSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExpireAllPayload {
    player_id: String,
    old: Option<RecordSnapshot>,
}

/// Ban-family command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BanCommand {
    /// A record was created; handlers re-read it by id.
    CreateRecord { record_id: i64 },
    /// A record was edited; `old` is its pre-edit state.
    EditRecord { record_id: i64, old: RecordSnapshot },
    /// A record was deleted; the row is already gone.
    DeleteRecord { old: RecordSnapshot },
    /// A list's name, sync method, or mask changed.
    EditList { list_id: i32 },
    /// A list was deleted; one snapshot per affected player, that player's
    /// top-priority record from the deleted list.
    DeleteList { old_top: Vec<RecordSnapshot> },
    /// All of a player's records were expired; `old` is the record that
    /// governed before.
    ExpireAll { player_id: String, old: Option<RecordSnapshot> },
    /// Sweep online players and apply any punishment that was deferred to
    /// connect time.
    WarnOnline,
}

impl BanCommand {
    /// Wire id of this command
    #[must_use]
    pub const fn command_id(&self) -> u32 {
        match self {
            Self::CreateRecord { .. } => CREATE_RECORD,
            Self::EditRecord { .. } => EDIT_RECORD,
            Self::DeleteRecord { .. } => DELETE_RECORD,
            Self::EditList { .. } => EDIT_LIST,
            Self::DeleteList { .. } => DELETE_LIST,
            Self::ExpireAll { .. } => EXPIRE_ALL,
            Self::WarnOnline => WARN_ONLINE,
        }
    }

    /// Name for logging
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateRecord { .. } => "CreateRecord",
            Self::EditRecord { .. } => "EditRecord",
            Self::DeleteRecord { .. } => "DeleteRecord",
            Self::EditList { .. } => "EditList",
            Self::DeleteList { .. } => "DeleteList",
            Self::ExpireAll { .. } => "ExpireAll",
            Self::WarnOnline => "WarnOnline",
        }
    }

    /// Encode into a wire frame targeting the given servers
    pub fn to_frame(&self, mask: ServerMask) -> Result<Frame, CodecError> {
        let id = self.command_id();
        match self {
            Self::CreateRecord { record_id } => {
                Frame::with_json(id, mask, &CreateRecordPayload { record_id: *record_id })
            }
            Self::EditRecord { record_id, old } => Frame::with_json(
                id,
                mask,
                &EditRecordPayload { record_id: *record_id, old: old.clone() },
            ),
            Self::DeleteRecord { old } => {
                Frame::with_json(id, mask, &DeleteRecordPayload { old: old.clone() })
            }
            Self::EditList { list_id } => {
                Frame::with_json(id, mask, &EditListPayload { list_id: *list_id })
            }
            Self::DeleteList { old_top } => {
                Frame::with_json(id, mask, &DeleteListPayload { old_top: old_top.clone() })
            }
            Self::ExpireAll { player_id, old } => Frame::with_json(
                id,
                mask,
                &ExpireAllPayload { player_id: player_id.clone(), old: old.clone() },
            ),
            Self::WarnOnline => Ok(Frame::empty(id, mask)),
        }
    }

    /// Decode from a wire frame
    pub fn from_frame(frame: &Frame) -> Result<Self, CodecError> {
        match frame.command_id {
            CREATE_RECORD => {
                let payload: CreateRecordPayload = frame.json_body()?;
                Ok(Self::CreateRecord { record_id: payload.record_id })
            }
            EDIT_RECORD => {
                let payload: EditRecordPayload = frame.json_body()?;
                Ok(Self::EditRecord { record_id: payload.record_id, old: payload.old })
            }
            DELETE_RECORD => {
                let payload: DeleteRecordPayload = frame.json_body()?;
                Ok(Self::DeleteRecord { old: payload.old })
            }
            EDIT_LIST => {
                let payload: EditListPayload = frame.json_body()?;
                Ok(Self::EditList { list_id: payload.list_id })
            }
            DELETE_LIST => {
                let payload: DeleteListPayload = frame.json_body()?;
                Ok(Self::DeleteList { old_top: payload.old_top })
            }
            EXPIRE_ALL => {
                let payload: ExpireAllPayload = frame.json_body()?;
                Ok(Self::ExpireAll { player_id: payload.player_id, old: payload.old })
            }
            WARN_ONLINE => Ok(Self::WarnOnline),
            other => Err(CodecError::UnknownCommand(other)),
        }
    }
}
