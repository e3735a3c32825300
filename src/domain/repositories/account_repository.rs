//! Repository trait for accounts.

use crate::domain::entities::{Account, NewAccount};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Repository interface for account lookup and registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the username is taken.
    async fn create(&self, new_account: NewAccount) -> Result<Account, AppError>;

    /// Finds an account by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, AppError>;

    /// Finds an account by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, AppError>;

    /// Display names for a set of account ids. Missing ids are simply absent
    /// from the map; callers substitute a fallback label.
    async fn display_names(&self, ids: &[i64]) -> Result<HashMap<i64, String>, AppError>;
}
