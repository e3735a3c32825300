//! PostgreSQL implementation of the referral request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{
    Link, NewLink, NewReferralRequest, ReferralRequest, RequestStatus,
};
use crate::domain::repositories::ReferralRequestRepository;
use crate::error::{AppError, map_sqlx_error};

use super::pg_link_repository::{LINK_COLUMNS, LinkRow};

const REQUEST_COLUMNS: &str =
    "id, link_id, requester_id, owner_id, status, custom_alias, created_at, decided_at";

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: i64,
    link_id: i64,
    requester_id: i64,
    owner_id: i64,
    status: String,
    custom_alias: Option<String>,
    created_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<RequestRow> for ReferralRequest {
    type Error = AppError;

    fn try_from(r: RequestRow) -> Result<Self, AppError> {
        let status = RequestStatus::parse(&r.status).ok_or_else(|| {
            AppError::internal(
                "Unrecognized referral request status",
                json!({ "id": r.id, "status": r.status }),
            )
        })?;

        Ok(ReferralRequest {
            id: r.id,
            link_id: r.link_id,
            requester_id: r.requester_id,
            owner_id: r.owner_id,
            status,
            custom_alias: r.custom_alias,
            created_at: r.created_at,
            decided_at: r.decided_at,
        })
    }
}

/// PostgreSQL repository for referral requests.
///
/// `approve` flips the status and inserts the referral link in one
/// transaction; a `status = 'pending'` guard on the update makes re-approval
/// lose the race instead of double-creating links.
pub struct PgReferralRequestRepository {
    pool: Arc<PgPool>,
}

impl PgReferralRequestRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralRequestRepository for PgReferralRequestRepository {
    async fn create(&self, request: NewReferralRequest) -> Result<ReferralRequest, AppError> {
        let sql = format!(
            "INSERT INTO referral_requests (link_id, requester_id, owner_id, custom_alias) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REQUEST_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request.link_id)
            .bind(request.requester_id)
            .bind(request.owner_id)
            .bind(&request.custom_alias)
            .fetch_one(self.pool.as_ref())
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ReferralRequest>, AppError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM referral_requests WHERE id = $1");

        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_for_owner(
        &self,
        owner_id: i64,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ReferralRequest>, AppError> {
        let rows = match status {
            Some(status) => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM referral_requests \
                     WHERE owner_id = $1 AND status = $2 ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, RequestRow>(&sql)
                    .bind(owner_id)
                    .bind(status.as_str())
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {REQUEST_COLUMNS} FROM referral_requests \
                     WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, RequestRow>(&sql)
                    .bind(owner_id)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn approve(&self, request_id: i64, new_link: NewLink) -> Result<Link, AppError> {
        let mut tx = self.pool.begin().await?;

        // Pending guard: a concurrent approval or decline already decided it.
        let flipped = sqlx::query(
            "UPDATE referral_requests SET status = 'approved', decided_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            return Err(AppError::bad_request(
                "Referral request is no longer pending",
                json!({ "request_id": request_id }),
            ));
        }

        let link_sql = format!(
            "INSERT INTO links (short_id, target_url, owner_id, is_referral, root_link_id, \
             referrer_id, allow_referrals, is_suspended, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&link_sql)
            .bind(&new_link.short_id)
            .bind(&new_link.target_url)
            .bind(new_link.owner_id)
            .bind(new_link.is_referral)
            .bind(new_link.root_link_id)
            .bind(new_link.referrer_id)
            .bind(new_link.allow_referrals)
            .bind(new_link.is_suspended)
            .bind(new_link.expires_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn decline(&self, request_id: i64) -> Result<ReferralRequest, AppError> {
        let sql = format!(
            "UPDATE referral_requests SET status = 'declined', decided_at = NOW() \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {REQUEST_COLUMNS}"
        );

        let row = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(request_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::bad_request(
                "Referral request is no longer pending",
                json!({ "request_id": request_id }),
            )),
        }
    }
}
