//! Ban list and ban record entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::ServerMask;

/// Policy controlling when a ban list's records are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanSyncMethod {
    /// Never write a ban to the game server; kick the player when seen.
    KickOnly,
    /// Apply the ban when the player next connects.
    BanOnConnect,
    /// Apply the ban as soon as the record is created or changed.
    BanImmediately,
}

impl BanSyncMethod {
    /// Stable identifier used in the database column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KickOnly => "kick_only",
            Self::BanOnConnect => "ban_on_connect",
            Self::BanImmediately => "ban_immediately",
        }
    }
}

impl FromStr for BanSyncMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kick_only" => Ok(Self::KickOnly),
            "ban_on_connect" => Ok(Self::BanOnConnect),
            "ban_immediately" => Ok(Self::BanImmediately),
            other => Err(DomainError::InvalidSyncMethod(other.to_string())),
        }
    }
}

impl fmt::Display for BanSyncMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named collection of ban records sharing one sync policy and one
/// server-targeting mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanList {
    pub id: i32,
    pub name: String,
    pub sync_method: BanSyncMethod,
    /// `None` applies the list to every server.
    pub servers: Option<ServerMask>,
}

impl BanList {
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

/// Fields for creating a ban list; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBanList {
    pub name: String,
    pub sync_method: BanSyncMethod,
    pub servers: Option<ServerMask>,
}

/// One player's entry on a ban list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BanRecord {
    pub id: i64,
    pub list_id: i32,
    pub player_id: String,
    pub admin_name: String,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `None` = indefinite.
    pub expires_at: Option<DateTime<Utc>>,
}

impl BanRecord {
    /// Whether the record never expires.
    #[must_use]
    pub fn is_indefinite(&self) -> bool {
        self.expires_at.is_none()
    }

    /// Whether the record has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Fields for creating a ban record; id and `created_at` are assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewBanRecord {
    pub list_id: i32,
    pub player_id: String,
    pub admin_name: String,
    pub reason: String,
    pub notes: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: Option<DateTime<Utc>>) -> BanRecord {
        BanRecord {
            id: 1,
            list_id: 0,
            player_id: "76561198000000001".to_string(),
            admin_name: "admin".to_string(),
            reason: "cheating".to_string(),
            notes: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_sync_method_round_trip() {
        for method in [
            BanSyncMethod::KickOnly,
            BanSyncMethod::BanOnConnect,
            BanSyncMethod::BanImmediately,
        ] {
            assert_eq!(method.as_str().parse::<BanSyncMethod>().unwrap(), method);
        }
        assert!("nope".parse::<BanSyncMethod>().is_err());
    }

    #[test]
    fn test_list_applies_to() {
        let mut list = BanList {
            id: 1,
            name: "cheaters".to_string(),
            sync_method: BanSyncMethod::BanImmediately,
            servers: Some(ServerMask::from_servers([2])),
        };
        assert!(list.applies_to(2));
        assert!(!list.applies_to(1));

        list.servers = None;
        assert!(list.applies_to(1));
        assert!(list.applies_to(32));
    }

    #[test]
    fn test_record_expiry() {
        let now = Utc::now();
        assert!(record(None).is_indefinite());
        assert!(!record(None).is_expired(now));
        assert!(record(Some(now - Duration::hours(1))).is_expired(now));
        assert!(!record(Some(now + Duration::hours(1))).is_expired(now));
    }
}
