//! Repository trait for the deleted-link archive.

use crate::domain::entities::DeletedLink;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for retention archives.
///
/// Archive rows are *written* inside the link deletion cascade (the link
/// repository's transaction); this trait covers reading them back and the
/// retention purge.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    /// Archived links for an owner, newest deletion first.
    async fn list_for_owner(&self, owner_id: i64) -> Result<Vec<DeletedLink>, AppError>;

    /// Permanently removes archive rows deleted before `cutoff`. Returns the
    /// number purged.
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
