//! Visit entity: one recorded redirect event with enrichment metadata.

use chrono::{DateTime, Utc};

/// Sentinel value stored when the user-agent parser cannot identify a field.
pub const UNKNOWN: &str = "unknown";

/// Geolocation enrichment bundle.
///
/// Produced by a best-effort provider; absent entirely (or field by field)
/// when the lookup fails or times out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoInfo {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub city: Option<String>,
    pub continent: Option<String>,
    pub region: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
}

/// A single redirect event. Immutable after creation; removed only by the
/// cascade deletion of its link.
#[derive(Debug, Clone)]
pub struct Visit {
    pub id: i64,
    pub link_id: i64,
    pub visited_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    /// Parsed device class; [`UNKNOWN`] when unparseable.
    pub device: String,
    pub browser: String,
    pub os: String,
    pub referer: Option<String>,
    pub geo: GeoInfo,
}

/// Input data for persisting a new visit.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub link_id: i64,
    pub visited_at: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub referer: Option<String>,
    pub geo: GeoInfo,
}
