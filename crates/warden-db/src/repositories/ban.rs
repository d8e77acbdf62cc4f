//! PostgreSQL implementation of the ban-family store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use warden_core::{
    BanList, BanListStore, BanRecord, NewBanList, NewBanRecord, Page, RecordSearch, RepoResult,
};

use crate::models::{mask_to_column, BanListModel, BanRecordModel, BanRecordWithListModel};

use super::error::{list_not_found, map_db_error, record_not_found, server_bit};

const RECORD_WITH_LIST_COLUMNS: &str = r"
    r.id, r.list_id, r.player_id, r.admin_name, r.reason, r.notes,
    r.created_at, r.expires_at,
    l.name AS list_name, l.sync_method, l.server_mask
";

/// PostgreSQL implementation of `BanListStore`
#[derive(Clone)]
pub struct PgBanListStore {
    pool: PgPool,
}

impl PgBanListStore {
    /// Create a new `PgBanListStore`
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn rows_to_pairs(
        rows: Vec<BanRecordWithListModel>,
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl BanListStore for PgBanListStore {
    #[instrument(skip(self))]
    async fn find_list(&self, id: i32) -> RepoResult<Option<BanList>> {
        let model = sqlx::query_as::<_, BanListModel>(
            r"
            SELECT id, name, sync_method, server_mask
            FROM ban_lists
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.map(TryInto::try_into).transpose()
    }

    #[instrument(skip(self))]
    async fn all_lists(&self) -> RepoResult<Vec<BanList>> {
        let models = sqlx::query_as::<_, BanListModel>(
            r"
            SELECT id, name, sync_method, server_mask
            FROM ban_lists
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self, new))]
    async fn create_list(&self, new: &NewBanList) -> RepoResult<BanList> {
        let model = sqlx::query_as::<_, BanListModel>(
            r"
            INSERT INTO ban_lists (name, sync_method, server_mask)
            VALUES ($1, $2, $3)
            RETURNING id, name, sync_method, server_mask
            ",
        )
        .bind(&new.name)
        .bind(new.sync_method.as_str())
        .bind(mask_to_column(new.servers))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        model.try_into()
    }

    #[instrument(skip(self, list))]
    async fn update_list(&self, list: &BanList) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE ban_lists
            SET name = $2, sync_method = $3, server_mask = $4
            WHERE id = $1
            ",
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(list.sync_method.as_str())
        .bind(BanListModel::mask_column(list))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(list_not_found(list.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_list(&self, id: i32) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM ban_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(list_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_record(&self, id: i64) -> RepoResult<Option<BanRecord>> {
        let model = sqlx::query_as::<_, BanRecordModel>(
            r"
            SELECT id, list_id, player_id, admin_name, reason, notes, created_at, expires_at
            FROM ban_records
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.map(BanRecord::from))
    }

    #[instrument(skip(self, new), fields(player_id = %new.player_id, list_id = new.list_id))]
    async fn create_record(&self, new: &NewBanRecord) -> RepoResult<BanRecord> {
        let model = sqlx::query_as::<_, BanRecordModel>(
            r"
            INSERT INTO ban_records (list_id, player_id, admin_name, reason, notes, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, list_id, player_id, admin_name, reason, notes, created_at, expires_at
            ",
        )
        .bind(new.list_id)
        .bind(&new.player_id)
        .bind(&new.admin_name)
        .bind(&new.reason)
        .bind(&new.notes)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self, record), fields(record_id = record.id))]
    async fn update_record(&self, record: &BanRecord) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE ban_records
            SET list_id = $2, player_id = $3, admin_name = $4, reason = $5,
                notes = $6, expires_at = $7
            WHERE id = $1
            ",
        )
        .bind(record.id)
        .bind(record.list_id)
        .bind(&record.player_id)
        .bind(&record.admin_name)
        .bind(&record.reason)
        .bind(&record.notes)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(record_not_found(record.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: i64) -> RepoResult<Option<BanRecord>> {
        let model = sqlx::query_as::<_, BanRecordModel>(
            r"
            DELETE FROM ban_records
            WHERE id = $1
            RETURNING id, list_id, player_id, admin_name, reason, notes, created_at, expires_at
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.map(BanRecord::from))
    }

    #[instrument(skip(self))]
    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<BanRecord>> {
        let models = sqlx::query_as::<_, BanRecordModel>(
            r"
            SELECT id, list_id, player_id, admin_name, reason, notes, created_at, expires_at
            FROM ban_records
            WHERE list_id = $1
            ORDER BY created_at
            ",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(BanRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn records_for_player(
        &self,
        player_id: &str,
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        let rows = sqlx::query_as::<_, BanRecordWithListModel>(&format!(
            r"
            SELECT {RECORD_WITH_LIST_COLUMNS}
            FROM ban_records r
            JOIN ban_lists l ON l.id = r.list_id
            WHERE r.player_id = $1
            ORDER BY r.created_at
            "
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::rows_to_pairs(rows)
    }

    #[instrument(skip(self, exclude))]
    async fn active_records_for_player(
        &self,
        player_id: &str,
        server: u8,
        exclude: &[i64],
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        // Expiry is evaluated lazily: expired rows stop matching here without
        // ever being swept.
        let rows = sqlx::query_as::<_, BanRecordWithListModel>(&format!(
            r"
            SELECT {RECORD_WITH_LIST_COLUMNS}
            FROM ban_records r
            JOIN ban_lists l ON l.id = r.list_id
            WHERE r.player_id = $1
              AND (l.server_mask IS NULL OR (l.server_mask & $2) <> 0)
              AND (r.expires_at IS NULL OR r.expires_at > NOW())
              AND r.id <> ALL($3)
            ORDER BY r.created_at
            "
        ))
        .bind(player_id)
        .bind(server_bit(server))
        .bind(exclude)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::rows_to_pairs(rows)
    }

    #[instrument(skip(self))]
    async fn active_records_for_server(
        &self,
        server: u8,
    ) -> RepoResult<Vec<(BanRecord, BanList)>> {
        let rows = sqlx::query_as::<_, BanRecordWithListModel>(&format!(
            r"
            SELECT {RECORD_WITH_LIST_COLUMNS}
            FROM ban_records r
            JOIN ban_lists l ON l.id = r.list_id
            WHERE (l.server_mask IS NULL OR (l.server_mask & $1) <> 0)
              AND (r.expires_at IS NULL OR r.expires_at > NOW())
            ORDER BY r.player_id, r.created_at
            "
        ))
        .bind(server_bit(server))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::rows_to_pairs(rows)
    }

    #[instrument(skip(self))]
    async fn expire_all_for_player(
        &self,
        player_id: &str,
        at: DateTime<Utc>,
    ) -> RepoResult<u64> {
        // Rows are kept for history; already-expired records are left alone
        // so their original expiry stays intact.
        let result = sqlx::query(
            r"
            UPDATE ban_records
            SET expires_at = $2
            WHERE player_id = $1
              AND (expires_at IS NULL OR expires_at > $2)
            ",
        )
        .bind(player_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, search))]
    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<BanRecord>> {
        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM ban_records
            WHERE ($1::TEXT IS NULL OR player_id = $1)
              AND ($2::INT IS NULL OR list_id = $2)
              AND (NOT $3 OR expires_at IS NULL OR expires_at > NOW())
            ",
        )
        .bind(&search.player_id)
        .bind(search.list_id)
        .bind(search.exclude_expired)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let models = sqlx::query_as::<_, BanRecordModel>(
            r"
            SELECT id, list_id, player_id, admin_name, reason, notes, created_at, expires_at
            FROM ban_records
            WHERE ($1::TEXT IS NULL OR player_id = $1)
              AND ($2::INT IS NULL OR list_id = $2)
              AND (NOT $3 OR expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(&search.player_id)
        .bind(search.list_id)
        .bind(search.exclude_expired)
        .bind(i64::from(search.per_page))
        .bind(search.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page {
            items: models.into_iter().map(BanRecord::from).collect(),
            total,
            page: search.page,
            per_page: search.per_page,
        })
    }
}
