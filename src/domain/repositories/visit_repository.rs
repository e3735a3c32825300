//! Repository trait for the append-only visit store.

use crate::domain::entities::{NewVisit, Visit};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for visit records.
///
/// Visits are append-only: created by the redirect pipeline, read by the
/// aggregation engine, and removed only inside the link deletion cascade
/// (which is owned by the link repository's transaction).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VisitRepository: Send + Sync {
    /// Persists a new visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors (including a
    /// vanished link id, which only happens when racing a delete cascade).
    async fn record(&self, new_visit: NewVisit) -> Result<Visit, AppError>;

    /// All visits for a link in insertion order (ascending id).
    ///
    /// Insertion order matters: the aggregation engine's tie-breaks are
    /// defined as "first encountered".
    async fn list_for_link(&self, link_id: i64) -> Result<Vec<Visit>, AppError>;

    /// Fresh count of visit rows for a link. This, not the denormalized
    /// `total_clicks`, is the authoritative click count.
    async fn count_for_link(&self, link_id: i64) -> Result<i64, AppError>;
}
