//! PostgreSQL implementation of the VIP-family store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use warden_core::{
    NewVipList, NewVipRecord, Page, RecordSearch, RepoResult, VipList, VipListStore, VipRecord,
};

use crate::models::{mask_to_column, VipListModel, VipRecordModel, VipRecordWithListModel};

use super::error::{list_not_found, map_db_error, record_not_found, server_bit};

const RECORD_COLUMNS: &str = r"
    id, list_id, player_id, player_name, admin_name, description, notes,
    active, created_at, expires_at
";

/// PostgreSQL implementation of `VipListStore`
#[derive(Clone)]
pub struct PgVipListStore {
    pool: PgPool,
}

impl PgVipListStore {
    /// Create a new `PgVipListStore`
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VipListStore for PgVipListStore {
    #[instrument(skip(self))]
    async fn find_list(&self, id: i32) -> RepoResult<Option<VipList>> {
        let model = sqlx::query_as::<_, VipListModel>(
            r"
            SELECT id, name, sync_method, server_mask
            FROM vip_lists
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
    async fn all_lists(&self) -> RepoResult<Vec<VipList>> {
        let models = sqlx::query_as::<_, VipListModel>(
            r"
            SELECT id, name, sync_method, server_mask
            FROM vip_lists
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self, new))]
    async fn create_list(&self, new: &NewVipList) -> RepoResult<VipList> {
        let model = sqlx::query_as::<_, VipListModel>(
            r"
            INSERT INTO vip_lists (name, sync_method, server_mask)
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
    async fn update_list(&self, list: &VipList) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE vip_lists
            SET name = $2, sync_method = $3, server_mask = $4
            WHERE id = $1
            ",
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(list.sync_method.as_str())
        .bind(VipListModel::mask_column(list))
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
        let result = sqlx::query("DELETE FROM vip_lists WHERE id = $1")
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
    async fn find_record(&self, id: i64) -> RepoResult<Option<VipRecord>> {
        let model = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            SELECT {RECORD_COLUMNS}
            FROM vip_records
            WHERE id = $1
            "
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.map(VipRecord::from))
    }

    #[instrument(skip(self, new), fields(player_id = %new.player_id, list_id = new.list_id))]
    async fn create_record(&self, new: &NewVipRecord) -> RepoResult<VipRecord> {
        let model = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            INSERT INTO vip_records
                (list_id, player_id, player_name, admin_name, description, notes, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RECORD_COLUMNS}
            "
        ))
        .bind(new.list_id)
        .bind(&new.player_id)
        .bind(&new.player_name)
        .bind(&new.admin_name)
        .bind(&new.description)
        .bind(&new.notes)
        .bind(new.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.into())
    }

    #[instrument(skip(self, record), fields(record_id = record.id))]
    async fn update_record(&self, record: &VipRecord) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE vip_records
            SET list_id = $2, player_id = $3, player_name = $4, admin_name = $5,
                description = $6, notes = $7, active = $8, expires_at = $9
            WHERE id = $1
            ",
        )
        .bind(record.id)
        .bind(record.list_id)
        .bind(&record.player_id)
        .bind(&record.player_name)
        .bind(&record.admin_name)
        .bind(&record.description)
        .bind(&record.notes)
        .bind(record.active)
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
    async fn delete_record(&self, id: i64) -> RepoResult<Option<VipRecord>> {
        let model = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            DELETE FROM vip_records
            WHERE id = $1
            RETURNING {RECORD_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(model.map(VipRecord::from))
    }

    #[instrument(skip(self))]
    async fn records_for_list(&self, list_id: i32) -> RepoResult<Vec<VipRecord>> {
        let models = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            SELECT {RECORD_COLUMNS}
            FROM vip_records
            WHERE list_id = $1
            ORDER BY created_at
            "
        ))
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(VipRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn records_for_player(&self, player_id: &str) -> RepoResult<Vec<VipRecord>> {
        let models = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            SELECT {RECORD_COLUMNS}
            FROM vip_records
            WHERE player_id = $1
            ORDER BY created_at
            "
        ))
        .bind(player_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(models.into_iter().map(VipRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn records_for_server(&self, server: u8) -> RepoResult<Vec<(VipRecord, VipList)>> {
        // Inactive and expired rows are included; the reconciler decides what
        // they mean for the live roster.
        let rows = sqlx::query_as::<_, VipRecordWithListModel>(
            r"
            SELECT r.id, r.list_id, r.player_id, r.player_name, r.admin_name,
                   r.description, r.notes, r.active, r.created_at, r.expires_at,
                   l.name AS list_name, l.sync_method, l.server_mask
            FROM vip_records r
            JOIN vip_lists l ON l.id = r.list_id
            WHERE (l.server_mask IS NULL OR (l.server_mask & $1) <> 0)
            ORDER BY r.player_id, r.created_at
            ",
        )
        .bind(server_bit(server))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn lists_for_server(&self, server: u8) -> RepoResult<Vec<VipList>> {
        let models = sqlx::query_as::<_, VipListModel>(
            r"
            SELECT id, name, sync_method, server_mask
            FROM vip_lists
            WHERE server_mask IS NULL OR (server_mask & $1) <> 0
            ORDER BY id
            ",
        )
        .bind(server_bit(server))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        models.into_iter().map(TryInto::try_into).collect()
    }

    #[instrument(skip(self))]
    async fn deactivate_expired(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE vip_records
            SET active = FALSE
            WHERE active
              AND expires_at IS NOT NULL
              AND expires_at <= $1
            ",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn deactivate_for_player(&self, player_id: &str) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE vip_records
            SET active = FALSE
            WHERE active AND player_id = $1
            ",
        )
        .bind(player_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self, search))]
    async fn search_records(&self, search: &RecordSearch) -> RepoResult<Page<VipRecord>> {
        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM vip_records
            WHERE ($1::TEXT IS NULL OR player_id = $1)
              AND ($2::INT IS NULL OR list_id = $2)
              AND (NOT $3 OR (active AND (expires_at IS NULL OR expires_at > NOW())))
            ",
        )
        .bind(&search.player_id)
        .bind(search.list_id)
        .bind(search.exclude_expired)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let models = sqlx::query_as::<_, VipRecordModel>(&format!(
            r"
            SELECT {RECORD_COLUMNS}
            FROM vip_records
            WHERE ($1::TEXT IS NULL OR player_id = $1)
              AND ($2::INT IS NULL OR list_id = $2)
              AND (NOT $3 OR (active AND (expires_at IS NULL OR expires_at > NOW())))
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "
        ))
        .bind(&search.player_id)
        .bind(search.list_id)
        .bind(search.exclude_expired)
        .bind(i64::from(search.per_page))
        .bind(search.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page {
            items: models.into_iter().map(VipRecord::from).collect(),
            total,
            page: search.page,
            per_page: search.per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgVipListStore>();
    }
}
