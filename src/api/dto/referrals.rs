//! DTOs for the referral request workflow endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ReferralRequest;

/// Request body for `POST /api/links/{short_id}/referral-requests`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReferralRequest {
    /// Desired short id for the referral link, checked again at approval.
    #[validate(length(min = 4, max = 32))]
    pub custom_alias: Option<String>,
}

/// Query parameters for `GET /api/referral-requests`.
#[derive(Debug, Deserialize)]
pub struct ListReferralQuery {
    /// Optional status filter: `pending`, `approved` or `declined`.
    pub status: Option<String>,
}

/// A referral request as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct ReferralRequestResponse {
    pub id: i64,
    pub link_id: i64,
    pub requester_id: i64,
    pub status: &'static str,
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<ReferralRequest> for ReferralRequestResponse {
    fn from(r: ReferralRequest) -> Self {
        Self {
            id: r.id,
            link_id: r.link_id,
            requester_id: r.requester_id,
            status: r.status.as_str(),
            custom_alias: r.custom_alias,
            created_at: r.created_at,
            decided_at: r.decided_at,
        }
    }
}
