//! Scenario tests for the synchronization engine, run against in-memory
//! fakes of the store, game-client, and bus ports.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use warden_bus::{Frame, SyncChannel};
use warden_core::{
    BanList, BanListStore, BanRecord, BanSyncMethod, GameClient, GameClientError, GameResult,
    NewBanList, NewBanRecord, NewVipList, NewVipRecord, Page, RecordSearch, RepoResult,
    ServerMask, VipEntry, VipList, VipListStore, VipRecord, VipSyncMethod,
};
use warden_sync::{
    BanCommand, BanCommandHandler, BanListService, CommandBus, SyncContext, SyncContextBuilder,
    SyncResult, VipCommandHandler, VipReconciler,
};

// ============================================================================
// In-memory fakes
// ============================================================================

#[derive(Default)]
struct BanStoreInner {
    lists: HashMap<i32, BanList>,
    records: HashMap<i64, BanRecord>,
    next_list_id: i32,
    next_record_id: i64,
}

#[derive(Default)]
struct MemoryBanStore {
    inner: Mutex<BanStoreInner>,
}

impl MemoryBanStore {
    fn insert_list(&self, list: BanList) {
        let mut inner = self.inner.lock();
        inner.next_list_id = inner.next_list_id.max(list.id);
        inner.lists.insert(list.id, list);
    }

    fn insert_record(&self, record: BanRecord) {
        let mut inner = self.inner.lock();
        inner.next_record_id = inner.next_record_id.max(record.id);
        inner.records.insert(record.id, record);
    }
}

#[async_trait]
impl BanListStore for MemoryBanStore {
    async fn find_list(&self, id: i32) -> RepoResult<Option<BanList>> {
        Ok(self.inner.lock().lists.get(&id).cloned())
    }

    async fn all_lists(&self) -> RepoResult<Vec<BanList>> {
        Ok(self.inner.lock().lists.values().cloned().collect())
    }

    async fn create_list(&self, new: &NewBanList) -> RepoResult<BanList> {
        let mut inner = self.inner.lock();
        inner.next_list_id += 1;
        let list = BanList {
            id: inner.next_list_id,
            name: new.name.clone(),
            sync_method: new.sync_method,
            servers: new.servers,
        };
        inner.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn update_list(&self, list: &BanList) -> RepoResult<()> {
        self.inner.lock().lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: i32) -> RepoResult<()> {
        let mut inner = self.inner.lock();
        inner.lists.remove(&id);
        inner.records.retain(|_, r| r.list_id != id);
        Ok(())
    }

    async fn find_record(&self, id: i64) -> RepoResult<Option<BanRecord>> {
        Ok(self.inner.lock().records.get(&id).cloned())
    }

    async fn create_record(&self, new: &NewBanRecord) -> RepoResult<BanRecord> {
        let mut inner = self.inner.lock();
        inner.next_record_id += 1;
        let record = BanRecord {
            id: inner.next_record_id,
            list_id: new.list_id,
            player_id: new.player_id.clone(),
            admin_name: new.admin_name.clone(),
            reason: new.reason.clone(),
            notes: new.notes.clone(),
            created_at: Utc::now(),
            expires_at: new.expires_at,
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_record(&self, record: &BanRecord) -> RepoResult<()> {
        self.inner.lock().records.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_record(&self, id: i64) -> RepoResult<Option<BanRecord>> {
        Ok(self.inner.lock().records.remove(&id))
    }

    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<BanRecord>> {
        Ok(self
            .inner
            .lock()
            .records
            .values()
            .filter(|r| r.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn records_for_player(
        &self,
        player_id: &str,
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .values()
            .filter(|r| r.player_id == player_id)
            .filter_map(|r| inner.lists.get(&r.list_id).map(|l| (r.clone(), l.clone())))
            .collect())
    }

    async fn active_records_for_player(
        &self,
        player_id: &str,
        server: u8,
        exclude: &[i64],
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        let now = Utc::now();
        let inner = self.inner.lock();
        Ok(inner
            .records
            .values()
            .filter(|r| r.player_id == player_id)
            .filter(|r| !r.is_expired(now))
            .filter(|r| !exclude.contains(&r.id))
            .filter_map(|r| inner.lists.get(&r.list_id).map(|l| (r.clone(), l.clone())))
            .filter(|(_, l)| l.applies_to(server))
            .collect())
    }

    async fn active_records_for_server(
        &self,
        server: u8,
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        let now = Utc::now();
        let inner = self.inner.lock();
        Ok(inner
            .records
            .values()
            .filter(|r| !r.is_expired(now))
            .filter_map(|r| inner.lists.get(&r.list_id).map(|l| (r.clone(), l.clone())))
            .filter(|(_, l)| l.applies_to(server))
            .collect())
    }

    async fn expire_all_for_player(
        &self,
        player_id: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let mut touched = 0;
        for record in self.inner.lock().records.values_mut() {
            if record.player_id == player_id && !record.is_expired(at) {
                record.expires_at = Some(at);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<BanRecord>> {
        let inner = self.inner.lock();
        let items: Vec<BanRecord> = inner
            .records
            .values()
            .filter(|r| search.player_id.as_deref().is_none_or(|p| r.player_id == p))
            .filter(|r| search.list_id.is_none_or(|l| r.list_id == l))
            .cloned()
            .collect();
        let total = items.len() as i64;
        Ok(Page { items, total, page: search.page, per_page: search.per_page })
    }
}

#[derive(Default)]
struct VipStoreInner {
    lists: HashMap<i32, VipList>,
    records: HashMap<i64, VipRecord>,
    next_ids: (i32, i64),
}

#[derive(Default)]
struct MemoryVipStore {
    inner: Mutex<VipStoreInner>,
}

impl MemoryVipStore {
    fn insert_list(&self, list: VipList) {
        let mut inner = self.inner.lock();
        inner.next_ids.0 = inner.next_ids.0.max(list.id);
        inner.lists.insert(list.id, list);
    }

    fn insert_record(&self, record: VipRecord) {
        let mut inner = self.inner.lock();
        inner.next_ids.1 = inner.next_ids.1.max(record.id);
        inner.records.insert(record.id, record);
    }
}

#[async_trait]
impl VipListStore for MemoryVipStore {
    async fn find_list(&self, id: i32) -> RepoResult<Option<VipList>> {
        Ok(self.inner.lock().lists.get(&id).cloned())
    }

    async fn all_lists(&self) -> RepoResult<Vec<VipList>> {
        Ok(self.inner.lock().lists.values().cloned().collect())
    }

    async fn create_list(&self, new: &NewVipList) -> RepoResult<VipList> {
        let mut inner = self.inner.lock();
        inner.next_ids.0 += 1;
        let list = VipList {
            id: inner.next_ids.0,
            name: new.name.clone(),
            sync_method: new.sync_method,
            servers: new.servers,
        };
        inner.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn update_list(&self, list: &VipList) -> RepoResult<()> {
        self.inner.lock().lists.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: i32) -> RepoResult<()> {
        let mut inner = self.inner.lock();
        inner.lists.remove(&id);
        inner.records.retain(|_, r| r.list_id != id);
        Ok(())
    }

    async fn find_record(&self, id: i64) -> RepoResult<Option<VipRecord>> {
        Ok(self.inner.lock().records.get(&id).cloned())
    }

    async fn create_record(&self, new: &NewVipRecord) -> RepoResult<VipRecord> {
        let mut inner = self.inner.lock();
        inner.next_ids.1 += 1;
        let record = VipRecord {
            id: inner.next_ids.1,
            list_id: new.list_id,
            player_id: new.player_id.clone(),
            player_name: new.player_name.clone(),
            admin_name: new.admin_name.clone(),
            description: new.description.clone(),
            notes: new.notes.clone(),
            active: true,
            created_at: Utc::now(),
            expires_at: new.expires_at,
        };
        inner.records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_record(&self, record: &VipRecord) -> RepoResult<()> {
        self.inner.lock().records.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_record(&self, id: i64) -> RepoResult<Option<VipRecord>> {
        Ok(self.inner.lock().records.remove(&id))
    }

    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<VipRecord>> {
        Ok(self
            .inner
            .lock()
            .records
            .values()
            .filter(|r| r.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn records_for_player(&self, player_id: &str) -> RepoResult<Vec<VipRecord>> {
        Ok(self
            .inner
            .lock()
            .records
            .values()
            .filter(|r| r.player_id == player_id)
            .cloned()
            .collect())
    }

    async fn records_for_server(&self, server: u8) -> RepoResult<Vec<(VipRecord, VipList)>> {
        let inner = self.inner.lock();
        Ok(inner
            .records
            .values()
            .filter_map(|r| inner.lists.get(&r.list_id).map(|l| (r.clone(), l.clone())))
            .filter(|(_, l)| l.applies_to(server))
            .collect())
    }

    async fn lists_for_server(&self, server: u8) -> RepoResult<Vec<VipList>> {
        Ok(self
            .inner
            .lock()
            .lists
            .values()
            .filter(|l| l.applies_to(server))
            .cloned()
            .collect())
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut touched = 0;
        for record in self.inner.lock().records.values_mut() {
            if record.active && record.is_expired(now) {
                record.active = false;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn deactivate_for_player(&self, player_id: &str) -> RepoResult<u64> {
        let mut touched = 0;
        for record in self.inner.lock().records.values_mut() {
            if record.active && record.player_id == player_id {
                record.active = false;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<VipRecord>> {
        let inner = self.inner.lock();
        let items: Vec<VipRecord> = inner.records.values().cloned().collect();
        let total = items.len() as i64;
        Ok(Page { items, total, page: search.page, per_page: search.per_page })
    }
}

#[derive(Default)]
struct GameState {
    online: HashSet<String>,
    kicked: Vec<String>,
    temp_bans: HashMap<String, u32>,
    perma_bans: HashSet<String>,
    vips: HashMap<String, String>,
}

#[derive(Default)]
struct FakeGameServer {
    state: Mutex<GameState>,
}

impl FakeGameServer {
    fn set_online(&self, player_ids: &[&str]) {
        self.state.lock().online = player_ids.iter().map(ToString::to_string).collect();
    }

    fn set_perma_banned(&self, player_id: &str) {
        self.state.lock().perma_bans.insert(player_id.to_string());
    }

    fn add_vip(&self, player_id: &str, name: &str) {
        self.state.lock().vips.insert(player_id.to_string(), name.to_string());
    }
}

#[async_trait]
impl GameClient for FakeGameServer {
    async fn kick(&self, player_id: &str, _reason: &str, _by: &str) -> GameResult<()> {
        let mut state = self.state.lock();
        state.kicked.push(player_id.to_string());
        state.online.remove(player_id);
        Ok(())
    }

    async fn temp_ban(
        &self,
        player_id: &str,
        hours: u32,
        _reason: &str,
        _by: &str,
    ) -> GameResult<()> {
        let mut state = self.state.lock();
        state.temp_bans.insert(player_id.to_string(), hours);
        state.online.remove(player_id);
        Ok(())
    }

    async fn perma_ban(&self, player_id: &str, _reason: &str, _by: &str) -> GameResult<()> {
        let mut state = self.state.lock();
        state.perma_bans.insert(player_id.to_string());
        state.online.remove(player_id);
        Ok(())
    }

    async fn remove_temp_ban(&self, player_id: &str) -> GameResult<()> {
        if self.state.lock().temp_bans.remove(player_id).is_none() {
            return Err(GameClientError::NotFound);
        }
        Ok(())
    }

    async fn remove_perma_ban(&self, player_id: &str) -> GameResult<()> {
        if !self.state.lock().perma_bans.remove(player_id) {
            return Err(GameClientError::NotFound);
        }
        Ok(())
    }

    async fn online_player_ids(&self) -> GameResult<Vec<String>> {
        Ok(self.state.lock().online.iter().cloned().collect())
    }

    async fn list_vips(&self) -> GameResult<Vec<VipEntry>> {
        Ok(self
            .state
            .lock()
            .vips
            .iter()
            .map(|(id, name)| VipEntry::new(id.clone(), name.clone()))
            .collect())
    }

    async fn bulk_add_vips(&self, entries: &[VipEntry]) -> GameResult<()> {
        let mut state = self.state.lock();
        for entry in entries {
            state.vips.insert(entry.player_id.clone(), entry.name.clone());
        }
        Ok(())
    }

    async fn bulk_remove_vips(&self, player_ids: &[String]) -> GameResult<()> {
        let mut state = self.state.lock();
        for player_id in player_ids {
            state.vips.remove(player_id);
        }
        Ok(())
    }
}

/// Records published frames instead of touching Redis.
#[derive(Default)]
struct RecordingBus {
    published: Mutex<Vec<(SyncChannel, Frame)>>,
}

impl RecordingBus {
    fn ban_frames(&self) -> Vec<Frame> {
        self.published
            .lock()
            .iter()
            .filter(|(channel, _)| *channel == SyncChannel::Ban)
            .map(|(_, frame)| frame.clone())
            .collect()
    }
}

#[async_trait]
impl CommandBus for RecordingBus {
    async fn publish(&self, channel: SyncChannel, frame: &Frame) -> SyncResult<u32> {
        if frame.server_mask.is_empty() {
            return Ok(0);
        }
        self.published.lock().push((channel, frame.clone()));
        Ok(1)
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    ctx: SyncContext,
    ban_store: Arc<MemoryBanStore>,
    vip_store: Arc<MemoryVipStore>,
    game: Arc<FakeGameServer>,
    bus: Arc<RecordingBus>,
}

fn harness(server_number: u8) -> Harness {
    let ban_store = Arc::new(MemoryBanStore::default());
    let vip_store = Arc::new(MemoryVipStore::default());
    let game = Arc::new(FakeGameServer::default());
    let bus = Arc::new(RecordingBus::default());

    let ctx = SyncContextBuilder::new()
        .server_number(server_number)
        .ban_store(ban_store.clone())
        .vip_store(vip_store.clone())
        .game(game.clone())
        .bus(bus.clone())
        .build()
        .unwrap();

    Harness { ctx, ban_store, vip_store, game, bus }
}

fn ban_list(id: i32, sync_method: BanSyncMethod, servers: Option<ServerMask>) -> BanList {
    BanList { id, name: format!("list-{id}"), sync_method, servers }
}

fn ban_record(
    id: i64,
    list_id: i32,
    player_id: &str,
    created_offset: i64,
    expires_in: Option<Duration>,
) -> BanRecord {
    BanRecord {
        id,
        list_id,
        player_id: player_id.to_string(),
        admin_name: "admin".to_string(),
        reason: "cheating".to_string(),
        notes: None,
        created_at: Utc::now() + Duration::seconds(created_offset),
        expires_at: expires_in.map(|d| Utc::now() + d),
    }
}

fn vip_list(id: i32, sync_method: VipSyncMethod) -> VipList {
    VipList { id, name: format!("vips-{id}"), sync_method, servers: None }
}

fn vip_record(id: i64, list_id: i32, player_id: &str, name: &str) -> VipRecord {
    VipRecord {
        id,
        list_id,
        player_id: player_id.to_string(),
        player_name: name.to_string(),
        admin_name: "admin".to_string(),
        description: None,
        notes: None,
        active: true,
        created_at: Utc::now(),
        expires_at: None,
    }
}

/// Round-trip a published ban frame through the wire codec and hand it to
/// the handler, the way the dispatch loop would.
async fn deliver_last_ban_command(h: &Harness) {
    let frames = h.bus.ban_frames();
    let frame = frames.last().expect("a ban command was published");
    assert!(frame.targets(h.ctx.server_number()), "frame must target this controller");

    let decoded = Frame::decode(&frame.encode()).unwrap();
    let command = BanCommand::from_frame(&decoded).unwrap();
    BanCommandHandler::new(&h.ctx).handle(command).await.unwrap();
}

// ============================================================================
// Ban scenarios
// ============================================================================

#[tokio::test]
async fn edit_dropping_priority_moves_player_from_perma_to_temp() {
    let h = harness(1);

    // Record A: expiring in 10 days. Record B: indefinite, created later -
    // B governs, and the server currently holds a perma ban.
    let list_a = ban_list(1, BanSyncMethod::BanImmediately, None);
    let list_b = ban_list(2, BanSyncMethod::BanImmediately, None);
    h.ban_store.insert_list(list_a);
    h.ban_store.insert_list(list_b);
    h.ban_store.insert_record(ban_record(1, 1, "p1", 0, Some(Duration::days(10))));
    let record_b = ban_record(2, 2, "p1", 10, None);
    h.ban_store.insert_record(record_b.clone());
    h.game.set_perma_banned("p1");

    // Admin shortens B to 1 day; A now outranks it.
    let mut edited = record_b;
    edited.expires_at = Some(Utc::now() + Duration::days(1));
    BanListService::new(&h.ctx).edit_record(edited).await.unwrap();

    deliver_last_ban_command(&h).await;

    let state = h.game.state.lock();
    assert!(!state.perma_bans.contains("p1"), "perma ban must be lifted");
    let hours = state.temp_bans.get("p1").copied().expect("temp ban per record A");
    assert_eq!(hours, 240, "temp ban runs to A's expiry");
}

#[tokio::test]
async fn delete_list_snapshots_only_the_top_record_per_player() {
    let h = harness(1);

    let doomed = ban_list(1, BanSyncMethod::BanImmediately, None);
    h.ban_store.insert_list(doomed);
    let lower = ban_record(1, 1, "p1", 0, Some(Duration::days(2)));
    let higher = ban_record(2, 1, "p1", 5, Some(Duration::days(9)));
    h.ban_store.insert_record(lower);
    h.ban_store.insert_record(higher.clone());

    BanListService::new(&h.ctx).delete_list(1).await.unwrap();

    let frames = h.bus.ban_frames();
    assert_eq!(frames.len(), 1, "exactly one command for the whole list");

    let command = BanCommand::from_frame(&frames[0]).unwrap();
    let BanCommand::DeleteList { old_top } = command else {
        panic!("expected a delete-list command");
    };
    assert_eq!(old_top.len(), 1, "one snapshot per player");
    assert_eq!(old_top[0].record_id, higher.id);
    assert_eq!(old_top[0].created_at, higher.created_at);
    assert_eq!(old_top[0].expires_at, higher.expires_at);
}

#[tokio::test]
async fn deleting_the_governing_record_falls_back_to_the_runner_up() {
    let h = harness(1);

    h.ban_store.insert_list(ban_list(1, BanSyncMethod::BanImmediately, None));
    h.ban_store.insert_record(ban_record(1, 1, "p1", 0, Some(Duration::days(5))));
    h.ban_store.insert_record(ban_record(2, 1, "p1", 5, None));
    h.game.set_perma_banned("p1");

    BanListService::new(&h.ctx).delete_record(2).await.unwrap();
    deliver_last_ban_command(&h).await;

    let state = h.game.state.lock();
    assert!(!state.perma_bans.contains("p1"));
    assert!(state.temp_bans.contains_key("p1"), "runner-up temp record takes over");
}

#[tokio::test]
async fn creating_a_lower_priority_record_causes_no_traffic() {
    let h = harness(1);

    h.ban_store.insert_list(ban_list(1, BanSyncMethod::BanImmediately, None));
    h.ban_store.insert_record(ban_record(1, 1, "p1", 0, None));
    h.game.set_perma_banned("p1");

    let record = BanListService::new(&h.ctx)
        .create_record(NewBanRecord {
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "minor".to_string(),
            notes: None,
            expires_at: Some(Utc::now() + Duration::days(1)),
        })
        .await
        .unwrap();
    assert!(record.id > 0);

    deliver_last_ban_command(&h).await;

    let state = h.game.state.lock();
    assert!(state.perma_bans.contains("p1"), "existing perma ban untouched");
    assert!(state.temp_bans.is_empty());
    assert!(state.kicked.is_empty());
}

#[tokio::test]
async fn kick_only_record_kicks_online_player_without_banning() {
    let h = harness(1);

    h.ban_store.insert_list(ban_list(1, BanSyncMethod::KickOnly, None));
    h.game.set_online(&["p1"]);

    BanListService::new(&h.ctx)
        .create_record(NewBanRecord {
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "afk".to_string(),
            notes: None,
            expires_at: None,
        })
        .await
        .unwrap();

    deliver_last_ban_command(&h).await;

    let state = h.game.state.lock();
    assert_eq!(state.kicked, vec!["p1".to_string()]);
    assert!(state.temp_bans.is_empty());
    assert!(state.perma_bans.is_empty());
}

#[tokio::test]
async fn ban_on_connect_defers_until_warn_online_sweep() {
    let h = harness(1);

    h.ban_store.insert_list(ban_list(1, BanSyncMethod::BanOnConnect, None));
    // Player is offline when the record lands.
    BanListService::new(&h.ctx)
        .create_record(NewBanRecord {
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "cheating".to_string(),
            notes: None,
            expires_at: None,
        })
        .await
        .unwrap();
    deliver_last_ban_command(&h).await;

    assert!(
        h.game.state.lock().perma_bans.is_empty(),
        "enforcement deferred while offline"
    );

    // The player connects; the online sweep catches up.
    h.game.set_online(&["p1"]);
    BanCommandHandler::new(&h.ctx)
        .handle(BanCommand::WarnOnline)
        .await
        .unwrap();

    assert!(h.game.state.lock().perma_bans.contains("p1"));
}

#[tokio::test]
async fn expire_all_lifts_the_standing_punishment() {
    let h = harness(1);

    h.ban_store.insert_list(ban_list(1, BanSyncMethod::BanImmediately, None));
    h.ban_store.insert_record(ban_record(1, 1, "p1", 0, None));
    h.game.set_perma_banned("p1");

    let touched = BanListService::new(&h.ctx).expire_all_for_player("p1").await.unwrap();
    assert_eq!(touched, 1);

    deliver_last_ban_command(&h).await;

    let state = h.game.state.lock();
    assert!(state.perma_bans.is_empty(), "punishment removed after expire-all");
    assert!(state.temp_bans.is_empty());
}

#[tokio::test]
async fn deleting_the_default_list_is_rejected_and_never_published() {
    let h = harness(1);
    h.ban_store.insert_list(ban_list(0, BanSyncMethod::BanImmediately, None));

    let err = BanListService::new(&h.ctx).delete_list(0).await.unwrap_err();
    assert!(err.is_invariant_violation());
    assert!(h.bus.ban_frames().is_empty());
}

#[tokio::test]
async fn masked_list_commands_carry_the_list_mask() {
    let h = harness(1);

    let mask = ServerMask::from_servers([2, 3]);
    h.ban_store.insert_list(ban_list(1, BanSyncMethod::BanImmediately, Some(mask)));

    BanListService::new(&h.ctx)
        .create_record(NewBanRecord {
            list_id: 1,
            player_id: "p1".to_string(),
            admin_name: "admin".to_string(),
            reason: "r".to_string(),
            notes: None,
            expires_at: None,
        })
        .await
        .unwrap();

    let frames = h.bus.ban_frames();
    assert_eq!(frames[0].server_mask, mask);
    // This controller (server 1) is not targeted.
    assert!(!frames[0].targets(1));
    assert!(frames[0].targets(2));
}

#[tokio::test]
async fn widening_a_list_mask_notifies_old_and_new_servers() {
    let h = harness(1);

    let list = ban_list(1, BanSyncMethod::BanImmediately, Some(ServerMask::from_servers([1])));
    h.ban_store.insert_list(list.clone());

    let mut edited = list;
    edited.servers = Some(ServerMask::from_servers([2]));
    BanListService::new(&h.ctx).edit_list(edited).await.unwrap();

    let frames = h.bus.ban_frames();
    assert_eq!(frames[0].server_mask, ServerMask::from_servers([1, 2]));
}

// ============================================================================
// VIP scenarios
// ============================================================================

#[tokio::test]
async fn unknown_vip_removed_under_uniform_remove_unknown() {
    let h = harness(1);

    h.vip_store.insert_list(vip_list(1, VipSyncMethod::RemoveUnknown));
    h.game.add_vip("stranger", "Stray");

    let diff = VipReconciler::new(&h.ctx).reconcile().await.unwrap();
    assert_eq!(diff.to_remove, vec!["stranger".to_string()]);
    assert!(h.game.state.lock().vips.is_empty());
}

#[tokio::test]
async fn unknown_vip_spared_by_any_ignore_unknown_list() {
    let h = harness(1);

    h.vip_store.insert_list(vip_list(1, VipSyncMethod::RemoveUnknown));
    h.vip_store.insert_list(vip_list(2, VipSyncMethod::IgnoreUnknown));
    h.game.add_vip("stranger", "Stray");

    let diff = VipReconciler::new(&h.ctx).reconcile().await.unwrap();
    assert!(diff.is_empty());
    assert!(h.game.state.lock().vips.contains_key("stranger"));
}

#[tokio::test]
async fn vip_with_record_elsewhere_is_not_a_genuine_unknown() {
    let h = harness(1);

    // The only applicable list ignores unknowns, but the roster player holds
    // a record on a list scoped to another server - not a genuine unknown.
    h.vip_store.insert_list(vip_list(1, VipSyncMethod::IgnoreUnknown));
    let mut other = vip_list(2, VipSyncMethod::RemoveUnknown);
    other.servers = Some(ServerMask::from_servers([9]));
    h.vip_store.insert_list(other);
    h.vip_store.insert_record(vip_record(1, 2, "roamer", "Roamer"));
    h.game.add_vip("roamer", "Roamer");

    let diff = VipReconciler::new(&h.ctx).reconcile().await.unwrap();
    assert_eq!(diff.to_remove, vec!["roamer".to_string()]);
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let h = harness(1);

    h.vip_store.insert_list(vip_list(1, VipSyncMethod::RemoveUnknown));
    h.vip_store.insert_record(vip_record(1, 1, "p1", "Alpha"));
    h.game.add_vip("leftover", "Old");

    let first = VipReconciler::new(&h.ctx).reconcile().await.unwrap();
    assert!(!first.is_empty());

    let second = VipReconciler::new(&h.ctx).reconcile().await.unwrap();
    assert!(second.is_empty(), "second pass finds nothing to change");
}

#[tokio::test]
async fn every_vip_command_reconciles() {
    let h = harness(1);

    h.vip_store.insert_list(vip_list(1, VipSyncMethod::RemoveUnknown));
    h.vip_store.insert_record(vip_record(1, 1, "p1", "Alpha"));

    VipCommandHandler::new(&h.ctx)
        .handle(warden_sync::VipCommand::CreateRecord)
        .await
        .unwrap();

    assert_eq!(h.game.state.lock().vips.get("p1"), Some(&"Alpha".to_string()));
}
