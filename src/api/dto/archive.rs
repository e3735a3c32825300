//! DTO for the deleted-link archive endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::DeletedLink;

/// An archive row as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct DeletedLinkResponse {
    pub short_id: String,
    pub target_url: String,
    pub was_referral: bool,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

impl From<DeletedLink> for DeletedLinkResponse {
    fn from(d: DeletedLink) -> Self {
        Self {
            short_id: d.short_id,
            target_url: d.target_url,
            was_referral: d.was_referral,
            total_clicks: d.total_clicks,
            created_at: d.created_at,
            deleted_at: d.deleted_at,
        }
    }
}
