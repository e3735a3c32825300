//! No-op geolocation provider.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::GeoInfo;
use crate::domain::geo::GeoProvider;

/// Provider used when no GeoLite2 database is configured.
///
/// Every lookup returns nothing, so visits are stored with absent geo
/// fields and the aggregation engine's sentinel handling takes over.
pub struct NullGeoProvider;

impl NullGeoProvider {
    pub fn new() -> Self {
        debug!("geolocation disabled, visits will carry no geo fields");
        Self
    }
}

impl Default for NullGeoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GeoProvider for NullGeoProvider {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
