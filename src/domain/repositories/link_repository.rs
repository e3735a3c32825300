//! Repository trait for the link registry and its lifecycle cascades.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of an atomic family deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyDeletion {
    /// Archive rows written (root + every referral child).
    pub links_archived: u64,
    /// Visit rows removed across the whole family.
    pub visits_deleted: u64,
}

/// Repository interface for short links.
///
/// Plain CRUD plus the three *family* operations that must be atomic: a
/// family is a root link and every referral link whose `root_link_id` points
/// at it. Implementations wrap each family operation in a single database
/// transaction; a partial cascade must never be observable.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - Test mocks auto-generated with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AliasConflict`] when the short id is taken and
    /// [`AppError::TargetConflict`] when the owner already has a link for the
    /// target URL. [`AppError::Internal`] on database errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its short id.
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its primary key.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// All referral children of a root link, ordered by creation.
    async fn find_children(&self, root_id: i64) -> Result<Vec<Link>, AppError>;

    /// Finds an owner's link for an exact normalized target URL.
    ///
    /// Backs the per-owner target-uniqueness check on `edit_target`.
    async fn find_by_owner_and_target(
        &self,
        owner_id: i64,
        target_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Lists all links owned by an account, newest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError>;

    /// Atomically changes a link's short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AliasConflict`] when the new id is taken,
    /// [`AppError::NotFound`] when the link does not exist.
    async fn rename(&self, id: i64, new_short_id: &str) -> Result<Link, AppError>;

    /// Updates a link's target URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TargetConflict`] when the owner already has
    /// another link for that target, [`AppError::NotFound`] when the link
    /// does not exist.
    async fn update_target(&self, id: i64, target_url: &str) -> Result<Link, AppError>;

    /// Toggles `allow_referrals` on a root link.
    async fn set_allow_referrals(&self, id: i64, allow: bool) -> Result<Link, AppError>;

    /// Best-effort bump of the denormalized click counter. Never part of a
    /// transaction; failures are the caller's to ignore.
    async fn increment_clicks(&self, id: i64) -> Result<(), AppError>;

    /// Sets `is_suspended` uniformly on a root link and all its children, in
    /// one transaction. Returns the number of links updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransactionAborted`] when any row update fails;
    /// no partial state remains.
    async fn set_suspended_family(&self, root_id: i64, suspended: bool)
    -> Result<u64, AppError>;

    /// Sets `expires_at` on a root link and all its children and clears
    /// `is_suspended` on every affected row, in one transaction. Returns the
    /// number of links updated.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransactionAborted`] when any row update fails.
    async fn set_expiry_family(
        &self,
        root_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Deletes a root link and its entire family in one transaction:
    /// archives every link into `deleted_links`, deletes all their visits,
    /// deletes the children, then the root.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransactionAborted`] when any step fails; the
    /// whole transaction rolls back.
    async fn delete_family(&self, root_id: i64) -> Result<FamilyDeletion, AppError>;

    /// Suspends every unexpired-flag link whose expiry has passed.
    ///
    /// Children are picked up by the same scan (they share the root's
    /// `expires_at`), so no cascade is re-triggered. Returns the short ids of
    /// the links swept, for cache invalidation.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError>;
}
