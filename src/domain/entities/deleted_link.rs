//! Archive snapshot written when a link is deleted.

use chrono::{DateTime, Utc};

/// Retention record for a deleted link.
///
/// Written inside the delete cascade (one row per link in the family) and
/// permanently purged after the retention window elapses.
#[derive(Debug, Clone)]
pub struct DeletedLink {
    pub id: i64,
    pub short_id: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub was_referral: bool,
    /// Click count at deletion time, taken from the denormalized counter.
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_snapshot() {
        let now = Utc::now();
        let archived = DeletedLink {
            id: 1,
            short_id: "gone42".to_string(),
            target_url: "https://example.com/".to_string(),
            owner_id: Some(3),
            was_referral: false,
            total_clicks: 17,
            created_at: now,
            deleted_at: now,
        };

        assert_eq!(archived.total_clicks, 17);
        assert!(!archived.was_referral);
    }
}
