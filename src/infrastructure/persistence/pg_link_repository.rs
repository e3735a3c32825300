//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::{FamilyDeletion, LinkRepository};
use crate::error::AppError;

/// Column list shared by every query returning full link rows.
pub(super) const LINK_COLUMNS: &str = "id, short_id, target_url, owner_id, is_referral, \
     root_link_id, referrer_id, allow_referrals, is_suspended, expires_at, total_clicks, \
     created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(super) struct LinkRow {
    id: i64,
    short_id: String,
    target_url: String,
    owner_id: Option<i64>,
    is_referral: bool,
    root_link_id: Option<i64>,
    referrer_id: Option<i64>,
    allow_referrals: bool,
    is_suspended: bool,
    expires_at: Option<DateTime<Utc>>,
    total_clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            short_id: r.short_id,
            target_url: r.target_url,
            owner_id: r.owner_id,
            is_referral: r.is_referral,
            root_link_id: r.root_link_id,
            referrer_id: r.referrer_id,
            allow_referrals: r.allow_referrals,
            is_suspended: r.is_suspended,
            expires_at: r.expires_at,
            total_clicks: r.total_clicks,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for link storage, retrieval and family cascades.
///
/// Uses SQLx prepared statements; the family operations run inside explicit
/// transactions so a partial cascade can never commit.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn aborted(operation: &str, e: sqlx::Error) -> AppError {
        tracing::error!(operation, error = %e, "family transaction aborted");
        AppError::transaction_aborted(
            "Cascade transaction rolled back",
            json!({ "operation": operation }),
        )
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            "INSERT INTO links (short_id, target_url, owner_id, is_referral, root_link_id, \
             referrer_id, allow_referrals, is_suspended, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.short_id)
            .bind(&new_link.target_url)
            .bind(new_link.owner_id)
            .bind(new_link.is_referral)
            .bind(new_link.root_link_id)
            .bind(new_link.referrer_id)
            .bind(new_link.allow_referrals)
            .bind(new_link.is_suspended)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE short_id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(short_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn find_children(&self, root_id: i64) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE root_link_id = $1 ORDER BY created_at, id"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(root_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_owner_and_target(
        &self,
        owner_id: i64,
        target_url: &str,
    ) -> Result<Option<Link>, AppError> {
        // Referral links copy their parent's target and are exempt from
        // the per-owner uniqueness policy.
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner_id = $1 AND target_url = $2 AND NOT is_referral"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner_id)
            .bind(target_url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn rename(&self, id: i64, new_short_id: &str) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET short_id = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(new_short_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn update_target(&self, id: i64, target_url: &str) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET target_url = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(target_url)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn set_allow_referrals(&self, id: i64, allow: bool) -> Result<Link, AppError> {
        let sql = format!(
            "UPDATE links SET allow_referrals = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(allow)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into)
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": id })))
    }

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE links SET total_clicks = total_clicks + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn set_suspended_family(
        &self,
        root_id: i64,
        suspended: bool,
    ) -> Result<u64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::aborted("set_suspended_family", e))?;

        let result = sqlx::query(
            "UPDATE links SET is_suspended = $2, updated_at = NOW() \
             WHERE id = $1 OR root_link_id = $1",
        )
        .bind(root_id)
        .bind(suspended)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::aborted("set_suspended_family", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::aborted("set_suspended_family", e))?;

        Ok(result.rows_affected())
    }

    async fn set_expiry_family(
        &self,
        root_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::aborted("set_expiry_family", e))?;

        // Changing expiry always reactivates, including manual suspensions.
        let result = sqlx::query(
            "UPDATE links SET expires_at = $2, is_suspended = FALSE, updated_at = NOW() \
             WHERE id = $1 OR root_link_id = $1",
        )
        .bind(root_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::aborted("set_expiry_family", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::aborted("set_expiry_family", e))?;

        Ok(result.rows_affected())
    }

    async fn delete_family(&self, root_id: i64) -> Result<FamilyDeletion, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Self::aborted("delete_family", e))?;

        let archived = sqlx::query(
            "INSERT INTO deleted_links \
             (short_id, target_url, owner_id, was_referral, total_clicks, created_at) \
             SELECT short_id, target_url, owner_id, is_referral, total_clicks, created_at \
             FROM links WHERE id = $1 OR root_link_id = $1",
        )
        .bind(root_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::aborted("delete_family", e))?;

        let visits = sqlx::query(
            "DELETE FROM visits WHERE link_id IN \
             (SELECT id FROM links WHERE id = $1 OR root_link_id = $1)",
        )
        .bind(root_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::aborted("delete_family", e))?;

        // Children go before the root; its FK references the root's row.
        sqlx::query("DELETE FROM links WHERE root_link_id = $1")
            .bind(root_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::aborted("delete_family", e))?;

        sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(root_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::aborted("delete_family", e))?;

        tx.commit()
            .await
            .map_err(|e| Self::aborted("delete_family", e))?;

        Ok(FamilyDeletion {
            links_archived: archived.rows_affected(),
            visits_deleted: visits.rows_affected(),
        })
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "UPDATE links SET is_suspended = TRUE, updated_at = NOW() \
             WHERE expires_at IS NOT NULL AND expires_at < $1 AND is_suspended = FALSE \
             RETURNING short_id",
        )
        .bind(now)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(|(short_id,)| short_id).collect())
    }
}
