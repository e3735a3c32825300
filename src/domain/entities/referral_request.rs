//! Referral request entity: the workflow ticket that, on approval,
//! materializes a referral link.

use chrono::{DateTime, Utc};

/// Workflow state of a referral request.
///
/// `Pending` transitions to `Approved` or `Declined` exactly once; resolved
/// requests never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
}

impl RequestStatus {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "approved" => Some(RequestStatus::Approved),
            "declined" => Some(RequestStatus::Declined),
            _ => None,
        }
    }
}

/// A request by `requester_id` to create a referral link against `link_id`.
///
/// `owner_id` is captured from the target link at creation time and is the
/// only account allowed to resolve the request; later ownership transfer does
/// not re-route that authority.
#[derive(Debug, Clone)]
pub struct ReferralRequest {
    pub id: i64,
    pub link_id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    pub status: RequestStatus,
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Input data for opening a new referral request.
#[derive(Debug, Clone)]
pub struct NewReferralRequest {
    pub link_id: i64,
    pub requester_id: i64,
    pub owner_id: i64,
    pub custom_alias: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Declined,
        ] {
            assert_eq!(RequestStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RequestStatus::parse("open"), None);
    }

    #[test]
    fn test_new_request_shape() {
        let req = NewReferralRequest {
            link_id: 10,
            requester_id: 2,
            owner_id: 1,
            custom_alias: Some("my-referral".to_string()),
        };

        assert_eq!(req.link_id, 10);
        assert_eq!(req.custom_alias.as_deref(), Some("my-referral"));
    }
}
