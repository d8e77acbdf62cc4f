//! VIP reconciliation engine
//!
//! Unlike bans, VIP membership is reconciled as a full diff against the live
//! roster: the game server only exposes "list current VIPs", not per-player
//! deltas. Every VIP command and the sweeper timer trigger the same
//! sequence: fetch the roster, load the desired state from the database,
//! diff, and apply the diff in bulk.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

use warden_core::{top_record, VipEntry, VipList, VipRecord, VipSyncMethod};

use crate::context::SyncContext;
use crate::error::SyncResult;

/// Add/remove actions a reconcile pass decided on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VipDiff {
    /// Entries to add or relabel.
    pub to_add: Vec<VipEntry>,
    /// Player ids to strip from the roster.
    pub to_remove: Vec<String>,
}

impl VipDiff {
    /// Whether the pass found nothing to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the roster diff. Pure: all inputs are explicit.
///
/// `records` are every record (including inactive and expired ones) on lists
/// applicable to this server; `lists` are those applicable lists;
/// `known_elsewhere` are roster players without applicable records who hold
/// a record on some other list - they are not genuine unknowns.
#[must_use]
pub fn compute_diff(
    live: &[VipEntry],
    records: &[(VipRecord, VipList)],
    lists: &[VipList],
    known_elsewhere: &HashSet<String>,
    now: DateTime<Utc>,
) -> VipDiff {
    // One IgnoreUnknown list is enough to spare genuine unknowns; only a
    // uniform RemoveUnknown policy strips them.
    let ignore_unknown = lists
        .iter()
        .any(|list| list.sync_method == VipSyncMethod::IgnoreUnknown);

    let live_labels: HashMap<&str, &str> = live
        .iter()
        .map(|entry| (entry.player_id.as_str(), entry.name.as_str()))
        .collect();

    let mut by_player: HashMap<&str, Vec<&VipRecord>> = HashMap::new();
    for (record, _) in records {
        by_player.entry(record.player_id.as_str()).or_default().push(record);
    }

    let mut diff = VipDiff::default();

    for (player_id, player_records) in &by_player {
        // The shared resolver picks the governing record; its soft-delete
        // and expiry flags then decide whether VIP is granted at all.
        let Some(top) = top_record(player_records.iter().copied()) else {
            continue;
        };

        if top.grants_vip(now) {
            let label = top.roster_label();
            if live_labels.get(player_id).copied() != Some(label.as_str()) {
                diff.to_add.push(VipEntry::new(*player_id, label));
            }
        } else if live_labels.contains_key(player_id) {
            diff.to_remove.push((*player_id).to_string());
        }
    }

    for entry in live {
        let player_id = entry.player_id.as_str();
        if by_player.contains_key(player_id) {
            continue;
        }

        let genuine_unknown = !known_elsewhere.contains(player_id);
        if genuine_unknown && ignore_unknown {
            continue;
        }
        diff.to_remove.push(player_id.to_string());
    }

    diff.to_add.sort_by(|a, b| a.player_id.cmp(&b.player_id));
    diff.to_remove.sort();
    diff
}

/// VIP reconciliation engine over one controller's context
pub struct VipReconciler<'a> {
    ctx: &'a SyncContext,
}

impl<'a> VipReconciler<'a> {
    /// Create a new reconciler
    #[must_use]
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Run one full reconcile pass and apply the resulting diff.
    #[instrument(skip(self), fields(server = self.ctx.server_number()))]
    pub async fn reconcile(&self) -> SyncResult<VipDiff> {
        let server = self.ctx.server_number();

        let live = self.ctx.game().list_vips().await?;
        let records = self.ctx.vip_store().records_for_server(server).await?;
        let lists = self.ctx.vip_store().lists_for_server(server).await?;

        // Roster players without applicable records are only genuine
        // unknowns if they hold no record on any list at all.
        let covered: HashSet<&str> =
            records.iter().map(|(r, _)| r.player_id.as_str()).collect();
        let mut known_elsewhere = HashSet::new();
        for entry in &live {
            if covered.contains(entry.player_id.as_str()) {
                continue;
            }
            let anywhere =
                self.ctx.vip_store().records_for_player(&entry.player_id).await?;
            if !anywhere.is_empty() {
                known_elsewhere.insert(entry.player_id.clone());
            }
        }

        let diff = compute_diff(&live, &records, &lists, &known_elsewhere, Utc::now());

        if !diff.to_add.is_empty() {
            self.ctx.game().bulk_add_vips(&diff.to_add).await?;
        }
        if !diff.to_remove.is_empty() {
            self.ctx.game().bulk_remove_vips(&diff.to_remove).await?;
        }

        if diff.is_empty() {
            tracing::debug!("VIP roster already in sync");
        } else {
            info!(
                added = diff.to_add.len(),
                removed = diff.to_remove.len(),
                "VIP roster reconciled"
            );
        }

        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use warden_core::ServerMask;

    fn list(id: i32, sync_method: VipSyncMethod) -> VipList {
        VipList { id, name: format!("list-{id}"), sync_method, servers: Some(ServerMask::ALL) }
    }

    fn record(
        id: i64,
        list_id: i32,
        player_id: &str,
        name: &str,
        active: bool,
        expires_in: Option<Duration>,
    ) -> VipRecord {
        VipRecord {
            id,
            list_id,
            player_id: player_id.to_string(),
            player_name: name.to_string(),
            admin_name: "admin".to_string(),
            description: None,
            notes: None,
            active,
            created_at: Utc::now() + Duration::seconds(id),
            expires_at: expires_in.map(|d| Utc::now() + d),
        }
    }

    #[test]
    fn test_missing_vip_is_added() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::RemoveUnknown)];
        let records = vec![(record(1, 1, "p1", "Alpha", true, None), lists[0].clone())];

        let diff = compute_diff(&[], &records, &lists, &HashSet::new(), now);
        assert_eq!(diff.to_add, vec![VipEntry::new("p1", "Alpha")]);
        assert!(diff.to_remove.is_empty());
    }

    #[test]
    fn test_label_drift_is_corrected() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::RemoveUnknown)];
        let mut rec = record(1, 1, "p1", "Alpha", true, None);
        rec.description = Some("donator".to_string());
        let records = vec![(rec, lists[0].clone())];
        let live = vec![VipEntry::new("p1", "Alpha")];

        let diff = compute_diff(&live, &records, &lists, &HashSet::new(), now);
        assert_eq!(diff.to_add, vec![VipEntry::new("p1", "Alpha - donator")]);
    }

    #[test]
    fn test_matching_roster_is_untouched() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::RemoveUnknown)];
        let records = vec![(record(1, 1, "p1", "Alpha", true, None), lists[0].clone())];
        let live = vec![VipEntry::new("p1", "Alpha")];

        let diff = compute_diff(&live, &records, &lists, &HashSet::new(), now);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_expired_and_inactive_are_removed() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::IgnoreUnknown)];
        let records = vec![
            (record(1, 1, "expired", "E", true, Some(Duration::days(-1))), lists[0].clone()),
            (record(2, 1, "inactive", "I", false, None), lists[0].clone()),
        ];
        let live = vec![VipEntry::new("expired", "E"), VipEntry::new("inactive", "I")];

        let diff = compute_diff(&live, &records, &lists, &HashSet::new(), now);
        assert!(diff.to_add.is_empty());
        assert_eq!(diff.to_remove, vec!["expired".to_string(), "inactive".to_string()]);
    }

    #[test]
    fn test_unknown_spared_by_ignore_unknown() {
        let now = Utc::now();
        let lists =
            vec![list(1, VipSyncMethod::IgnoreUnknown), list(2, VipSyncMethod::RemoveUnknown)];
        let live = vec![VipEntry::new("stranger", "S")];

        let diff = compute_diff(&live, &[], &lists, &HashSet::new(), now);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_unknown_removed_when_all_lists_remove() {
        let now = Utc::now();
        let lists =
            vec![list(1, VipSyncMethod::RemoveUnknown), list(2, VipSyncMethod::RemoveUnknown)];
        let live = vec![VipEntry::new("stranger", "S")];

        let diff = compute_diff(&live, &[], &lists, &HashSet::new(), now);
        assert_eq!(diff.to_remove, vec!["stranger".to_string()]);
    }

    #[test]
    fn test_known_elsewhere_is_not_a_genuine_unknown() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::IgnoreUnknown)];
        let live = vec![VipEntry::new("other-server-vip", "O")];
        let known: HashSet<String> = ["other-server-vip".to_string()].into();

        let diff = compute_diff(&live, &[], &lists, &known, now);
        assert_eq!(diff.to_remove, vec!["other-server-vip".to_string()]);
    }

    #[test]
    fn test_top_record_decides_grant() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::RemoveUnknown)];
        // Indefinite inactive record outranks the active expiring one, so
        // VIP is not granted.
        let records = vec![
            (record(1, 1, "p1", "Alpha", false, None), lists[0].clone()),
            (record(2, 1, "p1", "Alpha", true, Some(Duration::days(3))), lists[0].clone()),
        ];
        let live = vec![VipEntry::new("p1", "Alpha")];

        let diff = compute_diff(&live, &records, &lists, &HashSet::new(), now);
        assert_eq!(diff.to_remove, vec!["p1".to_string()]);
    }

    #[test]
    fn test_diff_is_idempotent() {
        let now = Utc::now();
        let lists = vec![list(1, VipSyncMethod::RemoveUnknown)];
        let records = vec![(record(1, 1, "p1", "Alpha", true, None), lists[0].clone())];

        let first = compute_diff(&[], &records, &lists, &HashSet::new(), now);
        assert!(!first.is_empty());

        // Pretend the diff was applied; the roster now matches.
        let live = first.to_add.clone();
        let second = compute_diff(&live, &records, &lists, &HashSet::new(), now);
        assert!(second.is_empty());
    }
}
