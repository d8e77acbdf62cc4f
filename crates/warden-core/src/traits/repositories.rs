//! Repository traits (ports) - define the interface for list/record storage
//!
//! The domain layer defines what it needs; warden-db provides the PostgreSQL
//! implementation. Priority resolution is deliberately absent from these
//! interfaces: stores return candidate sets and callers fold them through
//! the one shared resolver, so every call site ranks records identically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    BanList, BanRecord, NewBanList, NewBanRecord, NewVipList, NewVipRecord, VipList, VipRecord,
};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Filters and paging for record searches.
#[derive(Debug, Clone)]
pub struct RecordSearch {
    pub player_id: Option<String>,
    pub list_id: Option<i32>,
    /// Only records that have not expired yet.
    pub exclude_expired: bool,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl Default for RecordSearch {
    fn default() -> Self {
        Self {
            player_id: None,
            list_id: None,
            exclude_expired: false,
            page: 1,
            per_page: 50,
        }
    }
}

impl RecordSearch {
    /// Row offset of the requested page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

// ============================================================================
// Ban family
// ============================================================================

#[async_trait]
pub trait BanListStore: Send + Sync {
    async fn find_list(&self, id: i32) -> RepoResult<Option<BanList>>;

    async fn all_lists(&self) -> RepoResult<Vec<BanList>>;

    async fn create_list(&self, new: &NewBanList) -> RepoResult<BanList>;

    async fn update_list(&self, list: &BanList) -> RepoResult<()>;

    /// Delete a list and (by cascade) its records.
    async fn delete_list(&self, id: i32) -> RepoResult<()>;

    async fn find_record(&self, id: i64) -> RepoResult<Option<BanRecord>>;

    async fn create_record(&self, new: &NewBanRecord) -> RepoResult<BanRecord>;

    async fn update_record(&self, record: &BanRecord) -> RepoResult<()>;

    /// Hard-delete a record, returning the deleted row if it existed.
    async fn delete_record(&self, id: i64) -> RepoResult<Option<BanRecord>>;

    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<BanRecord>>;

    /// Every record the player holds, on any list, with the owning list.
    async fn records_for_player(&self, player_id: &str)
        -> RepoResult<Vec<(BanRecord, BanList)>>;

    /// Unexpired records covering the player on lists applicable to the
    /// given server, excluding the given record ids. Expiry is evaluated
    /// lazily here; expired rows simply stop matching.
    async fn active_records_for_player(
        &self,
        player_id: &str,
        server: u8,
        exclude: &[i64],
    ) -> RepoResult<Vec<(BanRecord, BanList)>>;

    /// All unexpired records on lists applicable to the given server.
    async fn active_records_for_server(
        &self,
        server: u8,
    ) -> RepoResult<Vec<(BanRecord, BanList)>>;

    /// Set `expires_at = at` on every one of the player's records, keeping
    /// the rows for history. Returns the number of records touched.
    async fn expire_all_for_player(&self, player_id: &str, at: DateTime<Utc>)
        -> RepoResult<u64>;

    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<BanRecord>>;
}

// ============================================================================
// VIP family
// ============================================================================

#[async_trait]
pub trait VipListStore: Send + Sync {
    async fn find_list(&self, id: i32) -> RepoResult<Option<VipList>>;

    async fn all_lists(&self) -> RepoResult<Vec<VipList>>;

    async fn create_list(&self, new: &NewVipList) -> RepoResult<VipList>;

    async fn update_list(&self, list: &VipList) -> RepoResult<()>;

    /// Delete a list and (by cascade) its records.
    async fn delete_list(&self, id: i32) -> RepoResult<()>;

    async fn find_record(&self, id: i64) -> RepoResult<Option<VipRecord>>;

    async fn create_record(&self, new: &NewVipRecord) -> RepoResult<VipRecord>;

    async fn update_record(&self, record: &VipRecord) -> RepoResult<()>;

    /// Hard-delete a record, returning the deleted row if it existed.
    async fn delete_record(&self, id: i64) -> RepoResult<Option<VipRecord>>;

    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<VipRecord>>;

    /// Every record the player holds, on any list. Used by the unknown-player
    /// check, which must see lists that do not apply to this server too.
    async fn records_for_player(&self, player_id: &str) -> RepoResult<Vec<VipRecord>>;

    /// All records (including inactive and expired ones) on lists applicable
    /// to the given server. The reconciler resolves and filters in memory.
    async fn records_for_server(&self, server: u8) -> RepoResult<Vec<(VipRecord, VipList)>>;

    /// Lists applicable to the given server.
    async fn lists_for_server(&self, server: u8) -> RepoResult<Vec<VipList>>;

    /// Clear `active` on all records whose expiry has passed. Returns the
    /// number of records deactivated.
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> RepoResult<u64>;

    /// Clear `active` on all of one player's records. Returns the number of
    /// records deactivated.
    async fn deactivate_for_player(&self, player_id: &str) -> RepoResult<u64>;

    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<VipRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let search = RecordSearch::default();
        assert_eq!(search.page, 1);
        assert_eq!(search.per_page, 50);
        assert_eq!(search.offset(), 0);
    }

    #[test]
    fn test_search_offset() {
        let search = RecordSearch { page: 3, per_page: 25, ..RecordSearch::default() };
        assert_eq!(search.offset(), 50);

        // Page 0 is treated as page 1.
        let search = RecordSearch { page: 0, ..RecordSearch::default() };
        assert_eq!(search.offset(), 0);
    }
}
