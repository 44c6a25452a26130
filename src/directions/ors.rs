//! OpenRouteService routing backend
//!
//! POSTs a coordinate pair and reads the first route's geometry, the first
//! segment's steps and the summary. Geometry may arrive as a coordinate
//! array or as an encoded polyline (precision 5).

use crate::config::Config;
use crate::constants::api::{ORS_DIRECTIONS_URL, USER_AGENT};
use crate::directions::{maneuver_name, DirectionsError, RouteProvider, RouteResult, RouteSummary, Step};
use crate::place::LonLat;
use serde::Deserialize;
use tracing::{debug, warn};

/// OpenRouteService directions client
#[derive(Debug, Clone)]
pub struct OrsBackend {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    #[serde(default)]
    routes: Vec<OrsRoute>,
}

#[derive(Debug, Deserialize)]
struct OrsRoute {
    geometry: OrsGeometry,
    #[serde(default)]
    segments: Vec<OrsSegment>,
    summary: OneOrMany<OrsSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrsGeometry {
    Encoded(String),
    Coordinates { coordinates: Vec<Vec<f64>> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Default, Deserialize)]
struct OrsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OrsSegment {
    #[serde(default)]
    steps: Vec<OrsStep>,
}

#[derive(Debug, Deserialize)]
struct OrsStep {
    #[serde(default)]
    instruction: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    distance: f64,
    #[serde(default, rename = "type")]
    kind: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OrsErrorBody {
    error: OrsErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrsErrorDetail {
    Detailed {
        #[serde(default)]
        message: Option<String>,
    },
    Text(String),
}

impl OrsErrorDetail {
    fn message(&self) -> Option<&str> {
        match self {
            Self::Detailed { message } => message.as_deref(),
            Self::Text(text) => Some(text),
        }
    }
}

impl OrsGeometry {
    fn into_coordinates(self) -> Result<Vec<LonLat>, DirectionsError> {
        match self {
            Self::Coordinates { coordinates } => Ok(coordinates
                .into_iter()
                .filter_map(|c| match c.as_slice() {
                    [lon, lat, ..] => Some(LonLat::new(*lon, *lat)),
                    _ => None,
                })
                .collect()),
            Self::Encoded(encoded) => {
                let line = polyline::decode_polyline(&encoded, 5).map_err(|e| {
                    warn!(error = %e, "Failed to decode route polyline");
                    DirectionsError::generic()
                })?;
                Ok(line.0.into_iter().map(|c| LonLat::new(c.x, c.y)).collect())
            }
        }
    }
}

impl From<OrsStep> for Step {
    fn from(step: OrsStep) -> Self {
        Step {
            instruction: step.instruction,
            road_name: step.name.filter(|n| !n.is_empty() && n != "-"),
            distance_meters: step.distance,
            maneuver: step.kind.and_then(maneuver_name).map(str::to_string),
        }
    }
}

impl OrsBackend {
    /// Create a client for a directions endpoint
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a client from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoints.directions.clone(), config.api_keys.directions.clone())
    }

    fn parse_route(body: OrsResponse) -> Result<RouteResult, DirectionsError> {
        let route = body.routes.into_iter().next().ok_or_else(|| {
            warn!("Directions response contained no routes");
            DirectionsError::generic()
        })?;

        let coordinates = route.geometry.into_coordinates()?;
        let steps = route
            .segments
            .into_iter()
            .next()
            .map(|s| s.steps.into_iter().map(Step::from).collect())
            .unwrap_or_default();
        let summary = match route.summary {
            OneOrMany::One(s) => s,
            OneOrMany::Many(list) => list.into_iter().next().unwrap_or_default(),
        };

        Ok(RouteResult {
            coordinates,
            steps,
            summary: RouteSummary {
                duration_seconds: summary.duration,
                distance_meters: summary.distance,
            },
        })
    }
}

impl Default for OrsBackend {
    fn default() -> Self {
        Self::new(ORS_DIRECTIONS_URL, "")
    }
}

impl RouteProvider for OrsBackend {
    async fn route(&self, from: LonLat, to: LonLat) -> Result<RouteResult, DirectionsError> {
        let body = serde_json::json!({
            "coordinates": [[from.lon, from.lat], [to.lon, to.lat]],
        });
        debug!(url = %self.url, ?from, ?to, "Requesting directions");

        let response = self.client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Directions request failed");
                DirectionsError::generic()
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let upstream = serde_json::from_str::<OrsErrorBody>(&text).ok();
            warn!(%status, body = %text, "Directions service returned an error");
            return Err(DirectionsError::from_upstream(
                upstream.as_ref().and_then(|b| b.error.message()),
            ));
        }

        let parsed: OrsResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse directions response");
            DirectionsError::generic()
        })?;

        Self::parse_route(parsed)
    }
}
