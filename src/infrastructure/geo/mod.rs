//! Geolocation provider implementations.

mod maxmind;
mod null;

pub use maxmind::MaxMindProvider;
pub use null::NullGeoProvider;
