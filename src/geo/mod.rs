//! Geocoding module
//!
//! Place search, name-to-coordinate lookup, administrative boundary
//! polygons and reverse geocoding.

pub mod nominatim;
pub mod reverse;

use crate::config::Config;
use crate::constants::map::BOUNDARY_KEYWORDS;
use crate::error::Result;
use crate::place::{LonLat, Place};
use serde::{Deserialize, Serialize};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Longitude
    pub lon: f64,
    /// Latitude
    pub lat: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    pub fn lon_lat(&self) -> LonLat {
        LonLat::new(self.lon, self.lat)
    }
}

/// Trait for place lookup backends
pub trait GeoLookup: Send + Sync {
    /// Free-text place search
    ///
    /// An empty result set is valid. A response that is not a feature
    /// collection is an `Error::Lookup`.
    fn search_by_term(&self, term: &str) -> impl std::future::Future<Output = Result<Vec<Place>>> + Send;

    /// Resolve a place name to its best match, or None if not found
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;

    /// Administrative boundary polygon for a place title
    ///
    /// None when no polygon exists, which is normal for point-like places.
    fn fetch_boundary(&self, title: &str) -> impl std::future::Future<Output = Option<geojson::Feature>> + Send;
}

/// Whether a place's description warrants a boundary lookup
///
/// Approximate on purpose: a city whose description lacks every keyword
/// simply gets no overlay.
pub fn needs_boundary(place: &Place) -> bool {
    place.description_matches(BOUNDARY_KEYWORDS)
}

/// Get the default geocoding backend
pub fn get_geocoder(config: &Config) -> nominatim::NominatimBackend {
    nominatim::NominatimBackend::from_config(config)
}

/// Get the reverse geocoder
pub fn get_reverse_geocoder(config: &Config) -> reverse::ReverseGeocoder {
    reverse::ReverseGeocoder::from_config(config)
}
