//! DTOs for statistics and visit listing endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Visit;

/// One visit row as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct VisitResponse {
    pub visited_at: DateTime<Utc>,
    pub ip_address: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub referer: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl From<Visit> for VisitResponse {
    fn from(v: Visit) -> Self {
        Self {
            visited_at: v.visited_at,
            ip_address: v.ip_address,
            device: v.device,
            browser: v.browser,
            os: v.os,
            referer: v.referer,
            country: v.geo.country,
            city: v.geo.city,
        }
    }
}
