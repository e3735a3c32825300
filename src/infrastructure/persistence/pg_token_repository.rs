//! PostgreSQL implementation of the API token repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::repositories::{ApiToken, TokenRepository};
use crate::error::AppError;

const TOKEN_COLUMNS: &str = "id, account_id, label, revoked, created_at, last_used_at";

#[derive(sqlx::FromRow)]
struct TokenRow {
    id: i64,
    account_id: i64,
    label: String,
    revoked: bool,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for ApiToken {
    fn from(r: TokenRow) -> Self {
        ApiToken {
            id: r.id,
            account_id: r.account_id,
            label: r.label,
            revoked: r.revoked,
            created_at: r.created_at,
            last_used_at: r.last_used_at,
        }
    }
}

pub struct PgTokenRepository {
    pool: Arc<PgPool>,
}

impl PgTokenRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn resolve(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT account_id FROM api_tokens WHERE token_hash = $1 AND NOT revoked",
        )
        .bind(token_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(account_id,)| account_id))
    }

    async fn touch(&self, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE api_tokens SET last_used_at = NOW() WHERE token_hash = $1")
            .bind(token_hash)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create(
        &self,
        account_id: i64,
        token_hash: &str,
        label: &str,
    ) -> Result<ApiToken, AppError> {
        let sql = format!(
            "INSERT INTO api_tokens (account_id, token_hash, label) \
             VALUES ($1, $2, $3) RETURNING {TOKEN_COLUMNS}"
        );

        let row = sqlx::query_as::<_, TokenRow>(&sql)
            .bind(account_id)
            .bind(token_hash)
            .bind(label)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn list(&self, account_id: Option<i64>) -> Result<Vec<ApiToken>, AppError> {
        let rows = match account_id {
            Some(account_id) => {
                let sql = format!(
                    "SELECT {TOKEN_COLUMNS} FROM api_tokens WHERE account_id = $1 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, TokenRow>(&sql)
                    .bind(account_id)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
            None => {
                let sql =
                    format!("SELECT {TOKEN_COLUMNS} FROM api_tokens ORDER BY created_at DESC");
                sqlx::query_as::<_, TokenRow>(&sql)
                    .fetch_all(self.pool.as_ref())
                    .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn revoke_by_label(&self, label: &str) -> Result<u64, AppError> {
        let result =
            sqlx::query("UPDATE api_tokens SET revoked = TRUE WHERE label = $1 AND NOT revoked")
                .bind(label)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected())
    }
}
