//! Link entity: a short-id-to-target mapping, root or referral.

use chrono::{DateTime, Utc};

/// A short link.
///
/// A *root* link owns zero or more *referral* links. Referral links point at
/// the same target as their root, attributed to a different creator, and
/// mirror the root's suspension and expiry through lifecycle cascades.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_id: String,
    pub target_url: String,
    /// Owning account; `None` for links created anonymously.
    pub owner_id: Option<i64>,
    pub is_referral: bool,
    /// Parent link id; set exactly when `is_referral` is true.
    pub root_link_id: Option<i64>,
    /// Account that created this referral link.
    pub referrer_id: Option<i64>,
    /// Owner-controlled gate on whether referral requests may target this link.
    pub allow_referrals: bool,
    pub is_suspended: bool,
    /// `None` means the link never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Best-effort display counter. The authoritative count is always a fresh
    /// count of visit rows; this field can race and drift.
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Id of the root of this link's family: its parent for a referral link,
    /// itself otherwise.
    pub fn family_root_id(&self) -> i64 {
        self.root_link_id.unwrap_or(self.id)
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_id: String,
    pub target_url: String,
    pub owner_id: Option<i64>,
    pub is_referral: bool,
    pub root_link_id: Option<i64>,
    pub referrer_id: Option<i64>,
    pub allow_referrals: bool,
    pub is_suspended: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLink {
    /// A root link owned by `owner_id` (or anonymous).
    pub fn root(
        short_id: String,
        target_url: String,
        owner_id: Option<i64>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            short_id,
            target_url,
            owner_id,
            is_referral: false,
            root_link_id: None,
            referrer_id: None,
            allow_referrals: false,
            is_suspended: false,
            expires_at,
        }
    }

    /// A referral link materialized from an approved request, inheriting the
    /// parent's current suspension and expiry.
    pub fn referral(short_id: String, parent: &Link, requester_id: i64) -> Self {
        Self {
            short_id,
            target_url: parent.target_url.clone(),
            owner_id: Some(requester_id),
            is_referral: true,
            root_link_id: Some(parent.id),
            referrer_id: Some(requester_id),
            allow_referrals: false,
            is_suspended: parent.is_suspended,
            expires_at: parent.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn root_link(id: i64) -> Link {
        let now = Utc::now();
        Link {
            id,
            short_id: format!("root{id}"),
            target_url: "https://example.com/".to_string(),
            owner_id: Some(1),
            is_referral: false,
            root_link_id: None,
            referrer_id: None,
            allow_referrals: true,
            is_suspended: false,
            expires_at: Some(now + Duration::days(90)),
            total_clicks: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let mut link = root_link(1);
        assert!(!link.is_expired(now));

        link.expires_at = Some(now - Duration::seconds(1));
        assert!(link.is_expired(now));

        link.expires_at = None;
        assert!(!link.is_expired(now));
    }

    #[test]
    fn test_family_root_id() {
        let root = root_link(7);
        assert_eq!(root.family_root_id(), 7);

        let referral = NewLink::referral("ref123".to_string(), &root, 42);
        assert_eq!(referral.root_link_id, Some(7));
        assert_eq!(referral.referrer_id, Some(42));
        assert!(referral.is_referral);
    }

    #[test]
    fn test_referral_inherits_parent_state() {
        let mut parent = root_link(3);
        parent.is_suspended = true;
        parent.expires_at = Some(Utc::now() + Duration::days(5));

        let referral = NewLink::referral("ref123".to_string(), &parent, 9);

        assert!(referral.is_suspended);
        assert_eq!(referral.expires_at, parent.expires_at);
        assert_eq!(referral.target_url, parent.target_url);
    }

    #[test]
    fn test_root_constructor_shape() {
        let new_link = NewLink::root(
            "abc123".to_string(),
            "https://rust-lang.org/".to_string(),
            None,
            None,
        );

        assert!(!new_link.is_referral);
        assert!(new_link.root_link_id.is_none());
        assert!(new_link.referrer_id.is_none());
        assert!(!new_link.is_suspended);
    }
}
