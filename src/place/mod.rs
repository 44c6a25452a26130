//! Place model
//!
//! A place is a named point of interest: a search result, the selected
//! location, a history or favorite entry, or a nearby POI.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A coordinate pair in upstream order: longitude first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Display order used by map widgets: `[lat, lon]`
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    /// True when both components are finite and inside WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(value: LonLat) -> Self {
        [value.lon, value.lat]
    }
}

/// A named location with descriptive text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Upstream identifier (e.g. Nominatim `place_id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name, also the key for enrichment lookups
    pub title: String,

    /// Free-text classification
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub latitude: Option<f64>,

    /// Overrides the description-based zoom heuristic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<u8>,
}

impl Place {
    /// Create a place at a coordinate
    pub fn new(title: impl Into<String>, description: impl Into<String>, at: LonLat) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            thumbnail: None,
            longitude: Some(at.lon),
            latitude: Some(at.lat),
            zoom_level: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom_level = Some(zoom);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// The coordinate pair, only when both halves are present and finite
    ///
    /// A place with a single coordinate is malformed and must not be drawn.
    pub fn coordinates(&self) -> Option<LonLat> {
        match (self.longitude, self.latitude) {
            (Some(lon), Some(lat)) if lon.is_finite() && lat.is_finite() => {
                Some(LonLat::new(lon, lat))
            }
            _ => None,
        }
    }

    /// Reject places a client should never have sent
    ///
    /// A title is required, and coordinates must come as a valid pair or
    /// not at all.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidPlace("Place title is required".to_string()));
        }
        match (self.longitude, self.latitude) {
            (None, None) => Ok(()),
            (Some(lon), Some(lat)) if LonLat::new(lon, lat).is_valid() => Ok(()),
            (Some(_), Some(_)) => Err(Error::InvalidPlace(format!(
                "{} has out-of-range coordinates",
                self.title
            ))),
            _ => Err(Error::InvalidPlace(format!(
                "{} needs both longitude and latitude",
                self.title
            ))),
        }
    }

    /// True when the place can be put on a map
    pub fn is_renderable(&self) -> bool {
        self.coordinates().is_some()
    }

    /// Key used to recognise the same place across searches
    ///
    /// The upstream id when known, otherwise the title plus rounded
    /// coordinates.
    pub fn identity_key(&self) -> String {
        if let Some(id) = &self.id {
            return format!("id:{}", id);
        }
        match self.coordinates() {
            Some(c) => format!("{}@{:.6},{:.6}", self.title, c.lat, c.lon),
            None => format!("{}@-", self.title),
        }
    }

    /// Case-insensitive check for any of the keywords in the description
    pub fn description_matches(&self, keywords: &[&str]) -> bool {
        let description = self.description.to_lowercase();
        keywords.iter().any(|k| description.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Place {
        Place::new("Paris", "Capital of France", LonLat::new(2.3522, 48.8566))
    }

    #[test]
    fn test_coordinates_require_both_halves() {
        let mut place = paris();
        assert_eq!(place.coordinates(), Some(LonLat::new(2.3522, 48.8566)));

        place.latitude = None;
        assert!(place.coordinates().is_none());
        assert!(!place.is_renderable());

        place.latitude = Some(f64::NAN);
        assert!(place.coordinates().is_none());
    }

    #[test]
    fn test_identity_key_prefers_id() {
        let place = paris().with_id("12345");
        assert_eq!(place.identity_key(), "id:12345");

        let a = paris();
        let mut b = paris();
        b.description = "City of light".to_string();
        assert_eq!(a.identity_key(), b.identity_key());

        let mut moved = paris();
        moved.longitude = Some(2.4);
        assert_ne!(a.identity_key(), moved.identity_key());
    }

    #[test]
    fn test_description_matches_is_case_insensitive() {
        let place = paris();
        assert!(place.description_matches(&["capital"]));
        assert!(!place.description_matches(&["restaurant"]));
    }

    #[test]
    fn test_lon_lat_serializes_as_pair() {
        let json = serde_json::to_string(&LonLat::new(2.35, 48.85)).unwrap();
        assert_eq!(json, "[2.35,48.85]");

        let parsed: LonLat = serde_json::from_str("[13.4, 52.5]").unwrap();
        assert_eq!(parsed.to_lat_lon(), [52.5, 13.4]);
    }

    #[test]
    fn test_lon_lat_validity() {
        assert!(LonLat::new(2.35, 48.85).is_valid());
        assert!(!LonLat::new(200.0, 48.85).is_valid());
        assert!(!LonLat::new(2.35, -91.0).is_valid());
    }

    #[test]
    fn test_place_wire_format() {
        let place = paris().with_zoom(11);
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["zoomLevel"], 11);
        assert_eq!(json["longitude"], 2.3522);

        let parsed: Place = serde_json::from_value(serde_json::json!({
            "title": "Somewhere",
            "longitude": 1.0
        }))
        .unwrap();
        assert!(parsed.coordinates().is_none());
        assert!(parsed.description.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(paris().validate().is_ok());

        let mut half = paris();
        half.longitude = None;
        assert!(matches!(half.validate(), Err(Error::InvalidPlace(_))));

        let mut far = paris();
        far.latitude = Some(123.0);
        assert!(far.validate().is_err());

        let untitled = Place { title: " ".to_string(), ..paris() };
        assert!(untitled.validate().is_err());

        let unplaced = Place { longitude: None, latitude: None, ..paris() };
        assert!(unplaced.validate().is_ok());
    }
}
