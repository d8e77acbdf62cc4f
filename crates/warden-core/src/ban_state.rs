//! Ban state derivation
//!
//! The punishment a ban record translates into on the game server, derived
//! from the owning list's sync method and the record's expiry.

use serde::{Deserialize, Serialize};

use crate::entities::{BanList, BanRecord, BanSyncMethod};

/// Punishment applied to a player on one game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BanState {
    /// No ban written to the server (kick-only lists).
    None,
    /// Temporary ban, bounded by the record's expiry.
    Temp,
    /// Permanent ban.
    Perma,
}

impl BanState {
    /// Derive the state a record maps to under its list's sync method.
    #[must_use]
    pub fn derive(record: &BanRecord, list: &BanList) -> Self {
        match list.sync_method {
            BanSyncMethod::KickOnly => Self::None,
            BanSyncMethod::BanOnConnect | BanSyncMethod::BanImmediately => {
                if record.is_indefinite() {
                    Self::Perma
                } else {
                    Self::Temp
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::ServerMask;
    use chrono::{Duration, Utc};

    fn list(sync_method: BanSyncMethod) -> BanList {
        BanList {
            id: 1,
            name: "test".to_string(),
            sync_method,
            servers: Some(ServerMask::ALL),
        }
    }

    fn record(expires_in_hours: Option<i64>) -> BanRecord {
        BanRecord {
            id: 1,
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "r".to_string(),
            notes: None,
            created_at: Utc::now(),
            expires_at: expires_in_hours.map(|h| Utc::now() + Duration::hours(h)),
        }
    }

    #[test]
    fn test_kick_only_is_always_none() {
        let list = list(BanSyncMethod::KickOnly);
        assert_eq!(BanState::derive(&record(None), &list), BanState::None);
        assert_eq!(BanState::derive(&record(Some(5)), &list), BanState::None);
    }

    #[test]
    fn test_indefinite_is_perma() {
        for method in [BanSyncMethod::BanOnConnect, BanSyncMethod::BanImmediately] {
            assert_eq!(BanState::derive(&record(None), &list(method)), BanState::Perma);
        }
    }

    #[test]
    fn test_expiring_is_temp() {
        for method in [BanSyncMethod::BanOnConnect, BanSyncMethod::BanImmediately] {
            assert_eq!(BanState::derive(&record(Some(24)), &list(method)), BanState::Temp);
        }
    }
}
