//! Repository trait for API token authentication.

use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stored API token (hash only; raw tokens are never persisted).
#[derive(Debug, Clone)]
pub struct ApiToken {
    pub id: i64,
    pub account_id: i64,
    pub label: String,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Repository interface for API tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Resolves a token hash to the owning account id, or `None` when the
    /// token is unknown or revoked.
    async fn resolve(&self, token_hash: &str) -> Result<Option<i64>, AppError>;

    /// Updates the `last_used_at` timestamp for monitoring.
    async fn touch(&self, token_hash: &str) -> Result<(), AppError>;

    /// Stores a new token hash for an account.
    async fn create(&self, account_id: i64, token_hash: &str, label: &str)
    -> Result<ApiToken, AppError>;

    /// Lists an account's tokens, or all tokens when `account_id` is `None`.
    async fn list(&self, account_id: Option<i64>) -> Result<Vec<ApiToken>, AppError>;

    /// Revokes every token with the given label. Returns the number revoked.
    async fn revoke_by_label(&self, label: &str) -> Result<u64, AppError>;
}
