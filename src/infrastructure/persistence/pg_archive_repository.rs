//! PostgreSQL implementation of the deleted-link archive.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::DeletedLink;
use crate::domain::repositories::ArchiveRepository;
use crate::error::AppError;

const ARCHIVE_COLUMNS: &str =
    "id, short_id, target_url, owner_id, was_referral, total_clicks, created_at, deleted_at";

#[derive(sqlx::FromRow)]
struct ArchiveRow {
    id: i64,
    short_id: String,
    target_url: String,
    owner_id: Option<i64>,
    was_referral: bool,
    total_clicks: i64,
    created_at: DateTime<Utc>,
    deleted_at: DateTime<Utc>,
}

impl From<ArchiveRow> for DeletedLink {
    fn from(r: ArchiveRow) -> Self {
        DeletedLink {
            id: r.id,
            short_id: r.short_id,
            target_url: r.target_url,
            owner_id: r.owner_id,
            was_referral: r.was_referral,
            total_clicks: r.total_clicks,
            created_at: r.created_at,
            deleted_at: r.deleted_at,
        }
    }
}

pub struct PgArchiveRepository {
    pool: Arc<PgPool>,
}

impl PgArchiveRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveRepository for PgArchiveRepository {
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<DeletedLink>, AppError> {
        let sql = format!(
            "SELECT {ARCHIVE_COLUMNS} FROM deleted_links WHERE owner_id = $1 \
             ORDER BY deleted_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, ArchiveRow>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM deleted_links WHERE deleted_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
