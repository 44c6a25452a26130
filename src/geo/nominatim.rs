//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for place search, geocoding, boundary
//! polygons and nearby hospitals.
//! Rate limit: 1 request per second (enforced by User-Agent requirement)

use crate::config::Config;
use crate::constants::api::{NOMINATIM_URL, USER_AGENT};
use crate::constants::geo::METERS_PER_DEGREE_LAT;
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, GeoLookup};
use crate::place::{LonLat, Place};
use serde::Deserialize;
use tracing::{debug, warn};

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
    search_limit: usize,
}

/// Nominatim `format=json` result item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    display_name: String,
    /// Present when `polygon_geojson=1` was requested
    #[serde(default)]
    geojson: Option<serde_json::Value>,
}

/// Nominatim `format=geojson` search body
#[derive(Debug, Deserialize)]
struct SearchCollection {
    features: Vec<SearchFeature>,
}

#[derive(Debug, Deserialize)]
struct SearchFeature {
    #[serde(default)]
    properties: SearchProperties,
    #[serde(default)]
    geometry: Option<SearchGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchProperties {
    #[serde(default)]
    place_id: Option<serde_json::Value>,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    addresstype: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchGeometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl SearchFeature {
    fn into_place(self) -> Place {
        let props = self.properties;
        let id = props.place_id.map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        let description = match props.addresstype.or(props.kind) {
            Some(kind) if !kind.is_empty() => format!("{}, {}", kind, props.display_name),
            _ => props.display_name.clone(),
        };
        let (longitude, latitude) = match self.geometry.as_ref().map(|g| g.coordinates.as_slice()) {
            Some([lon, lat, ..]) => (Some(*lon), Some(*lat)),
            _ => (None, None),
        };

        Place {
            id,
            title: props.display_name,
            description,
            thumbnail: None,
            longitude,
            latitude,
            zoom_level: None,
        }
    }
}

impl NominatimBackend {
    /// Create a new Nominatim backend against the public instance
    pub fn new() -> Self {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Create a backend against a specific Nominatim instance
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            search_limit: crate::config::defaults::DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Create a backend from configuration
    pub fn from_config(config: &Config) -> Self {
        let mut backend = Self::with_base_url(config.endpoints.nominatim.clone());
        backend.search_limit = config.defaults.search_limit;
        backend
    }

    /// Parse lat/lon strings to f64
    fn parse_coords(lat: &str, lon: &str) -> Result<LonLat> {
        let lat: f64 = lat.parse().map_err(|_| {
            Error::Lookup(format!("Invalid latitude: {}", lat))
        })?;
        let lon: f64 = lon.parse().map_err(|_| {
            Error::Lookup(format!("Invalid longitude: {}", lon))
        })?;
        Ok(LonLat::new(lon, lat))
    }

    /// Run a `format=json` query and return the raw result list
    async fn query_json(&self, params: &[(&str, String)]) -> Result<Vec<NominatimResult>> {
        let url = format!("{}/search", self.base_url);
        debug!(url = %url, "Nominatim query");

        let response = self.client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Lookup(format!("Failed to parse Nominatim response: {}", e)))
    }

    /// Hospitals inside a square box around a point
    ///
    /// Failures degrade to an empty list.
    pub async fn nearby_hospitals(&self, center: LonLat, radius_m: u32, limit: usize) -> Vec<Place> {
        let (min, max) = bounding_box(center, radius_m);
        let params = [
            ("q", "hospital".to_string()),
            ("format", "json".to_string()),
            ("bounded", "1".to_string()),
            ("limit", limit.to_string()),
            ("viewbox", format!("{},{},{},{}", min.lon, max.lat, max.lon, min.lat)),
        ];

        match self.query_json(&params).await {
            Ok(results) => results
                .into_iter()
                .filter_map(|r| {
                    let at = Self::parse_coords(&r.lat, &r.lon).ok()?;
                    Some(Place::new(r.display_name, "hospital", at))
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "Nearby hospital lookup failed");
                Vec::new()
            }
        }
    }
}

impl Default for NominatimBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Corners (south-west, north-east) of a square box around a point
fn bounding_box(center: LonLat, radius_m: u32) -> (LonLat, LonLat) {
    let radius = f64::from(radius_m);
    let d_lat = radius / METERS_PER_DEGREE_LAT;
    let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
    let d_lon = (radius / (METERS_PER_DEGREE_LAT * cos_lat)).min(180.0);
    (
        LonLat::new(center.lon - d_lon, center.lat - d_lat),
        LonLat::new(center.lon + d_lon, center.lat + d_lat),
    )
}

impl GeoLookup for NominatimBackend {
    async fn search_by_term(&self, term: &str) -> Result<Vec<Place>> {
        let url = format!("{}/search", self.base_url);
        debug!(term, "Nominatim search");

        let response = self.client
            .get(&url)
            .query(&[
                ("q", term.to_string()),
                ("format", "geojson".to_string()),
                ("addressdetails", "1".to_string()),
                ("layer", "address".to_string()),
                ("limit", self.search_limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Lookup(format!("Failed to read Nominatim response: {}", e)))?;

        let collection: SearchCollection = serde_json::from_str(&body).map_err(|e| {
            Error::Lookup(format!("Search response is not a feature collection: {}", e))
        })?;

        Ok(collection
            .features
            .into_iter()
            .map(SearchFeature::into_place)
            .collect())
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeoLocation>> {
        let results = self
            .query_json(&[
                ("q", query.to_string()),
                ("format", "json".to_string()),
                ("limit", "1".to_string()),
            ])
            .await?;

        if let Some(result) = results.into_iter().next() {
            let at = Self::parse_coords(&result.lat, &result.lon)?;
            Ok(Some(GeoLocation {
                lon: at.lon,
                lat: at.lat,
                display_name: result.display_name,
            }))
        } else {
            Ok(None)
        }
    }

    async fn fetch_boundary(&self, title: &str) -> Option<geojson::Feature> {
        let results = match self
            .query_json(&[
                ("q", title.to_string()),
                ("format", "json".to_string()),
                ("polygon_geojson", "1".to_string()),
            ])
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!(error = %e, title, "Boundary lookup failed");
                return None;
            }
        };

        let first = results.into_iter().next()?;
        boundary_feature(first.geojson?, first.display_name)
    }
}

/// Wrap a polygonal geometry as a Feature named after the place
///
/// Points and lines yield None.
fn boundary_feature(geometry: serde_json::Value, name: String) -> Option<geojson::Feature> {
    let geometry: geojson::Geometry = serde_json::from_value(geometry).ok()?;
    match geometry.value {
        geojson::Value::Polygon(_) | geojson::Value::MultiPolygon(_) => {}
        _ => return None,
    }

    let mut properties = geojson::JsonObject::new();
    properties.insert("name".to_string(), serde_json::Value::String(name));

    Some(geojson::Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coords() {
        let at = NominatimBackend::parse_coords("48.8566", "2.3522").unwrap();
        assert!((at.lat - 48.8566).abs() < 0.0001);
        assert!((at.lon - 2.3522).abs() < 0.0001);
    }

    #[test]
    fn test_parse_coords_invalid() {
        assert!(NominatimBackend::parse_coords("invalid", "0").is_err());
        assert!(NominatimBackend::parse_coords("0", "invalid").is_err());
    }

    #[test]
    fn test_feature_into_place() {
        let feature: SearchFeature = serde_json::from_value(serde_json::json!({
            "type": "Feature",
            "properties": {
                "place_id": 88066702,
                "display_name": "Paris, Ile-de-France, France",
                "addresstype": "city"
            },
            "geometry": { "type": "Point", "coordinates": [2.3514992, 48.8566101] }
        }))
        .unwrap();

        let place = feature.into_place();
        assert_eq!(place.id.as_deref(), Some("88066702"));
        assert_eq!(place.title, "Paris, Ile-de-France, France");
        assert_eq!(place.description, "city, Paris, Ile-de-France, France");
        assert_eq!(place.coordinates(), Some(LonLat::new(2.3514992, 48.8566101)));
    }

    #[test]
    fn test_feature_without_geometry_is_unrenderable() {
        let feature: SearchFeature = serde_json::from_value(serde_json::json!({
            "properties": { "display_name": "Nowhere" },
            "geometry": null
        }))
        .unwrap();

        let place = feature.into_place();
        assert!(place.coordinates().is_none());
        assert_eq!(place.description, "Nowhere");
    }

    #[test]
    fn test_boundary_feature_only_for_polygons() {
        let polygon = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        let feature = boundary_feature(polygon, "Square".to_string()).unwrap();
        assert_eq!(
            feature.property("name").and_then(|v| v.as_str()),
            Some("Square")
        );

        let point = serde_json::json!({ "type": "Point", "coordinates": [1.0, 1.0] });
        assert!(boundary_feature(point, "Dot".to_string()).is_none());
    }

    #[test]
    fn test_bounding_box_is_centered() {
        let center = LonLat::new(55.3, 25.2);
        let (min, max) = bounding_box(center, 10_000);
        assert!(min.lon < center.lon && center.lon < max.lon);
        assert!(min.lat < center.lat && center.lat < max.lat);
        assert!(((max.lat - min.lat) / 2.0 - 10_000.0 / METERS_PER_DEGREE_LAT).abs() < 1e-9);
    }

    #[test]
    fn test_backend_creation() {
        let backend = NominatimBackend::with_base_url("http://localhost:8080/");
        assert_eq!(backend.base_url, "http://localhost:8080");
        assert!(format!("{:?}", backend).contains("NominatimBackend"));
    }
}
