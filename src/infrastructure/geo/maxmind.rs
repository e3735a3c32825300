//! GeoLite2-backed geolocation provider.

use std::net::IpAddr;

use async_trait::async_trait;
use maxminddb::geoip2;
use tracing::{debug, info};

use crate::domain::entities::GeoInfo;
use crate::domain::geo::GeoProvider;

/// Looks up visitor locations in a local MaxMind GeoLite2 City database.
///
/// The whole database is loaded into memory at startup; lookups are pure
/// reads and never touch the network. The City database carries no ISP
/// data, so that field stays empty.
pub struct MaxMindProvider {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl MaxMindProvider {
    /// Loads the database file from disk.
    ///
    /// # Errors
    ///
    /// Returns the underlying error when the file is missing or not a valid
    /// MaxMind database.
    pub fn open(path: &str) -> Result<Self, maxminddb::MaxMindDBError> {
        let reader = maxminddb::Reader::open_readfile(path)?;
        info!(path, "loaded GeoLite2 database");
        Ok(Self { reader })
    }

    fn english<'a>(
        names: &Option<std::collections::BTreeMap<&'a str, &'a str>>,
    ) -> Option<String> {
        names
            .as_ref()
            .and_then(|m| m.get("en"))
            .map(|s| s.to_string())
    }
}

#[async_trait]
impl GeoProvider for MaxMindProvider {
    async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        let addr: IpAddr = match ip.parse() {
            Ok(addr) => addr,
            Err(_) => {
                debug!(ip, "unparseable IP address, skipping geolocation");
                return None;
            }
        };

        let city: geoip2::City = self.reader.lookup(addr).ok()?;

        let mut geo = GeoInfo {
            country: city.country.as_ref().and_then(|c| Self::english(&c.names)),
            country_code: city
                .country
                .as_ref()
                .and_then(|c| c.iso_code)
                .map(|s| s.to_string()),
            city: city.city.as_ref().and_then(|c| Self::english(&c.names)),
            continent: city
                .continent
                .as_ref()
                .and_then(|c| Self::english(&c.names)),
            region: city
                .subdivisions
                .as_ref()
                .and_then(|subs| subs.first())
                .and_then(|sub| Self::english(&sub.names)),
            ..GeoInfo::default()
        };

        if let Some(location) = &city.location {
            geo.latitude = location.latitude;
            geo.longitude = location.longitude;
            geo.timezone = location.time_zone.map(|s| s.to_string());
        }

        if geo == GeoInfo::default() {
            return None;
        }

        Some(geo)
    }

    fn name(&self) -> &'static str {
        "maxmind"
    }
}
