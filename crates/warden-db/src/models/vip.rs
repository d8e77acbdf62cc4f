//! VIP family row models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use warden_core::{DomainError, VipList, VipRecord};

use super::{mask_from_column, mask_to_column};

/// Database model for the `vip_lists` table
#[derive(Debug, Clone, FromRow)]
pub struct VipListModel {
    pub id: i32,
    pub name: String,
    pub sync_method: String,
    pub server_mask: Option<i64>,
}

impl TryFrom<VipListModel> for VipList {
    type Error = DomainError;

    fn try_from(model: VipListModel) -> Result<Self, Self::Error> {
        Ok(VipList {
            id: model.id,
            name: model.name,
            sync_method: model.sync_method.parse()?,
            servers: mask_from_column(model.server_mask),
        })
    }
}

impl VipListModel {
    /// Column representation of a list's mask.
    #[must_use]
    pub fn mask_column(list: &VipList) -> Option<i64> {
        mask_to_column(list.servers)
    }
}

/// Database model for the `vip_records` table
#[derive(Debug, Clone, FromRow)]
pub struct VipRecordModel {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub player_name: String,
    pub admin_name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<VipRecordModel> for VipRecord {
    fn from(model: VipRecordModel) -> Self {
        VipRecord {
            id: model.id,
            list_id: model.list_id,
            player_id: model.player_id,
            player_name: model.player_name,
            admin_name: model.admin_name,
            description: model.description,
            notes: model.notes,
            active: model.active,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

/// Joined row: a VIP record together with its owning list.
#[derive(Debug, Clone, FromRow)]
pub struct VipRecordWithListModel {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub player_name: String,
    pub admin_name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub list_name: String,
    pub sync_method: String,
    pub server_mask: Option<i64>,
}

impl TryFrom<VipRecordWithListModel> for (VipRecord, VipList) {
    type Error = DomainError;

    fn try_from(model: VipRecordWithListModel) -> Result<Self, Self::Error> {
        let list = VipList {
            id: model.list_id,
            name: model.list_name,
            sync_method: model.sync_method.parse()?,
            servers: mask_from_column(model.server_mask),
        };
        let record = VipRecord {
            id: model.id,
            list_id: model.list_id,
            player_id: model.player_id,
            player_name: model.player_name,
            admin_name: model.admin_name,
            description: model.description,
            notes: model.notes,
            active: model.active,
            created_at: model.created_at,
            expires_at: model.expires_at,
        };
        Ok((record, list))
    }
}
