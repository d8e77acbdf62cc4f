//! Historical record snapshots carried inside commands
//!
//! By the time a command is handled the row it concerns may already be gone
//! or edited further, so edit/delete commands embed the fields needed to
//! diff against current truth. Snapshots carry historical context only -
//! the new state is always re-read live from the database at handling time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ban_state::BanState;
use crate::entities::{BanList, BanRecord};

/// The old state of a ban record at the moment a mutation was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub record_id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Punishment the record mapped to under its list's policy at snapshot
    /// time.
    pub state: BanState,
}

impl RecordSnapshot {
    /// Snapshot a ban record under its owning list.
    #[must_use]
    pub fn of_ban(record: &BanRecord, list: &BanList) -> Self {
        Self {
            record_id: record.id,
            list_id: record.list_id,
            player_id: record.player_id.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            state: BanState::derive(record, list),
        }
    }
}
