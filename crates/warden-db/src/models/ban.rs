//! Ban family row models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use warden_core::{BanList, BanRecord, DomainError};

use super::{mask_from_column, mask_to_column};

/// Database model for the `ban_lists` table
#[derive(Debug, Clone, FromRow)]
pub struct BanListModel {
    pub id: i32,
    pub name: String,
    pub sync_method: String,
    pub server_mask: Option<i64>,
}

impl TryFrom<BanListModel> for BanList {
    type Error = DomainError;

    fn try_from(model: BanListModel) -> Result<Self, Self::Error> {
        Ok(BanList {
            id: model.id,
            name: model.name,
            sync_method: model.sync_method.parse()?,
            servers: mask_from_column(model.server_mask),
        })
    }
}

impl BanListModel {
    /// Column representation of a list's mask.
    #[must_use]
    pub fn mask_column(list: &BanList) -> Option<i64> {
        mask_to_column(list.servers)
    }
}

/// Database model for the `ban_records` table
#[derive(Debug, Clone, FromRow)]
pub struct BanRecordModel {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub admin_name: String,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<BanRecordModel> for BanRecord {
    fn from(model: BanRecordModel) -> Self {
        BanRecord {
            id: model.id,
            list_id: model.list_id,
            player_id: model.player_id,
            admin_name: model.admin_name,
            reason: model.reason,
            notes: model.notes,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

/// Joined row: a ban record together with its owning list.
#[derive(Debug, Clone, FromRow)]
pub struct BanRecordWithListModel {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub admin_name: String,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub list_name: String,
    pub sync_method: String,
    pub server_mask: Option<i64>,
}

impl TryFrom<BanRecordWithListModel> for (BanRecord, BanList) {
    type Error = DomainError;

    fn try_from(model: BanRecordWithListModel) -> Result<Self, Self::Error> {
        let list = BanList {
            id: model.list_id,
            name: model.list_name,
            sync_method: model.sync_method.parse()?,
            servers: mask_from_column(model.server_mask),
        };
        let record = BanRecord {
            id: model.id,
            list_id: model.list_id,
            player_id: model.player_id,
            admin_name: model.admin_name,
            reason: model.reason,
            notes: model.notes,
            created_at: model.created_at,
            expires_at: model.expires_at,
        };
        Ok((record, list))
    }
}
