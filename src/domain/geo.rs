//! Geolocation provider contract.

use crate::domain::entities::GeoInfo;
use async_trait::async_trait;

/// Best-effort IP geolocation.
///
/// Implementations return an enrichment record or nothing; they never fail
/// the caller. The visit worker additionally bounds every lookup with its
/// own timeout, so a slow provider degrades to absent geo fields rather than
/// delaying visit persistence.
///
/// # Implementations
///
/// - [`crate::infrastructure::geo::MaxMindProvider`] - local GeoLite2 database
/// - [`crate::infrastructure::geo::NullGeoProvider`] - always `None`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Looks up the location of an IP address.
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}
