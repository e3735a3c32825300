//! DTOs for link creation and maintenance endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Link;

/// Request body for `POST /api/links`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The target URL to shorten (must be valid HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub target_url: String,

    /// Optional custom short id; character rules are checked downstream.
    #[validate(length(min = 4, max = 32))]
    pub custom_id: Option<String>,

    /// Lifetime in days; defaults to 90 when absent.
    #[validate(range(min = 1, message = "expires_in_days must be positive"))]
    pub expires_in_days: Option<i64>,
}

/// Request body for `PATCH /api/links/{short_id}`.
///
/// All fields are optional; only provided fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New short id for this link.
    #[validate(length(min = 4, max = 32))]
    pub new_short_id: Option<String>,

    /// New destination URL for this link.
    #[validate(url(message = "Invalid URL format"))]
    pub target_url: Option<String>,

    /// Toggle whether referral requests may be opened against this link.
    pub allow_referrals: Option<bool>,
}

/// Request body for `POST /api/links/{short_id}/suspend`.
#[derive(Debug, Deserialize)]
pub struct SuspendRequest {
    pub suspended: bool,
    /// Owner password, re-verified before the cascade runs.
    pub password: String,
}

/// Request body for `POST /api/links/{short_id}/expiry`.
#[derive(Debug, Deserialize)]
pub struct ShiftExpiryRequest {
    /// Signed day delta; positive extends, negative reduces (floored at one
    /// day out).
    pub delta_days: i64,
}

/// Request body for `DELETE /api/links/{short_id}`.
#[derive(Debug, Deserialize)]
pub struct DeleteLinkRequest {
    /// Owner password, re-verified before the cascade runs.
    pub password: String,
}

/// A link as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub short_id: String,
    pub short_url: String,
    pub target_url: String,
    pub is_referral: bool,
    pub allow_referrals: bool,
    pub is_suspended: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub total_clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, base_url: &str) -> Self {
        let short_url = format!("{}/{}", base_url.trim_end_matches('/'), link.short_id);
        Self {
            short_id: link.short_id,
            short_url,
            target_url: link.target_url,
            is_referral: link.is_referral,
            allow_referrals: link.allow_referrals,
            is_suspended: link.is_suspended,
            expires_at: link.expires_at,
            total_clicks: link.total_clicks,
            created_at: link.created_at,
        }
    }
}

/// Response for family-wide suspension changes.
#[derive(Debug, Serialize)]
pub struct SuspendResponse {
    pub short_id: String,
    pub suspended: bool,
    pub links_updated: u64,
}

/// Response for expiry changes.
#[derive(Debug, Serialize)]
pub struct ShiftExpiryResponse {
    pub short_id: String,
    pub expires_at: DateTime<Utc>,
    pub links_updated: u64,
}

/// Response for family deletion.
#[derive(Debug, Serialize)]
pub struct DeleteLinkResponse {
    pub links_archived: u64,
    pub visits_deleted: u64,
}
