//! VIP list and VIP record entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::ServerMask;

/// Policy controlling how a VIP list treats roster entries it does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VipSyncMethod {
    /// Leave roster entries without any record untouched.
    IgnoreUnknown,
    /// Strip roster entries without a governing record.
    RemoveUnknown,
}

impl VipSyncMethod {
    /// Stable identifier used in the database column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IgnoreUnknown => "ignore_unknown",
            Self::RemoveUnknown => "remove_unknown",
        }
    }
}

impl FromStr for VipSyncMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore_unknown" => Ok(Self::IgnoreUnknown),
            "remove_unknown" => Ok(Self::RemoveUnknown),
            other => Err(DomainError::InvalidSyncMethod(other.to_string())),
        }
    }
}

impl fmt::Display for VipSyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named collection of VIP records sharing one sync policy and one
/// server-targeting mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipList {
    pub id: i32,
    pub name: String,
    pub sync_method: VipSyncMethod,
    /// `None` applies the list to every server.
    pub servers: Option<ServerMask>,
}

impl VipList {
    /// Whether this list applies to the given server number.
    #[must_use]
    pub fn applies_to(&self, server: u8) -> bool {
        ServerMask::effective(self.servers).contains(server)
    }

    /// Mask this list's mutations must be announced with.
    #[must_use]
    pub fn announce_mask(&self) -> ServerMask {
        ServerMask::effective(self.servers)
    }
}

/// Fields for creating a VIP list; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewVipList {
    pub name: String,
    pub sync_method: VipSyncMethod,
    pub servers: Option<ServerMask>,
}

/// One player's entry on a VIP list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipRecord {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    /// Name shown on the game server's VIP roster.
    pub player_name: String,
    pub admin_name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Soft-delete flag, distinct from expiry. Cleared by the sweeper once
    /// `expires_at` passes.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    /// `None` = indefinite.
    pub expires_at: Option<DateTime<Utc>>,
}

impl VipRecord {
    /// Whether the record has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether the record should currently grant VIP.
    #[must_use]
    pub fn grants_vip(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired(now)
    }

    /// Roster label: the player's name, with the record description appended
    /// when present.
    #[must_use]
    pub fn roster_label(&self) -> String {
        match &self.description {
            Some(description) => format!("{} - {}", self.player_name, description),
            None => self.player_name.clone(),
        }
    }
}

/// Fields for creating a VIP record; id, `active`, and `created_at` are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewVipRecord {
    pub list_id: i32,
    pub player_id: String,
    pub player_name: String,
    pub admin_name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
