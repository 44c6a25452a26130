//! Turn-by-turn directions
//!
//! Route types, the user-facing error policy, the routing backend trait and
//! the directions workflow that ties geocoding and routing together.

pub mod ors;
pub mod workflow;

use crate::constants::messages::{
    DIRECTIONS_GENERIC, DISTANCE_LIMIT_MARKER, LOCATIONS_NOT_FOUND, ROUTE_TOO_LONG,
};
use crate::place::LonLat;
use chrono::{DateTime, Duration, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use workflow::DirectionsWorkflow;

/// A routed path between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Polyline in `[lon, lat]` order
    pub coordinates: Vec<LonLat>,
    pub steps: Vec<Step>,
    pub summary: RouteSummary,
}

/// One turn-by-turn instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_name: Option<String>,
    pub distance_meters: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maneuver: Option<String>,
}

/// Totals for a route
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSummary {
    pub duration_seconds: f64,
    pub distance_meters: f64,
}

impl RouteResult {
    /// A polyline needs at least two vertices to be drawn
    pub fn has_polyline(&self) -> bool {
        self.coordinates.len() >= 2
    }

    pub fn distance_km(&self) -> f64 {
        self.summary.distance_meters / 1000.0
    }

    pub fn duration_hours(&self) -> f64 {
        self.summary.duration_seconds / 3600.0
    }

    /// Arrival time when leaving at `departure`
    ///
    /// None when the duration does not fit a calendar date.
    pub fn eta<Tz: TimeZone>(&self, departure: DateTime<Tz>) -> Option<DateTime<Tz>> {
        let millis = (self.summary.duration_seconds * 1000.0).round();
        if !millis.is_finite() {
            return None;
        }
        let travel = Duration::try_milliseconds(millis as i64)?;
        departure.checked_add_signed(travel)
    }

    pub fn origin(&self) -> Option<LonLat> {
        self.coordinates.first().copied()
    }

    pub fn destination(&self) -> Option<LonLat> {
        self.coordinates.last().copied()
    }
}

/// What went wrong with a directions request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionsErrorKind {
    /// An endpoint name did not geocode
    LocationNotFound,
    /// The routing service failed or refused
    #[default]
    Upstream,
}

/// Directions failure carrying a message fit for the user
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct DirectionsError {
    #[serde(default)]
    pub kind: DirectionsErrorKind,
    pub message: String,
}

impl DirectionsError {
    /// An upstream failure with the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: DirectionsErrorKind::Upstream,
            message: message.into(),
        }
    }

    /// Sanitise an upstream error message
    ///
    /// Distance-limit refusals get a fixed explanation, other upstream
    /// messages pass through verbatim, and a missing message becomes the
    /// generic text.
    pub fn from_upstream(message: Option<&str>) -> Self {
        match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) if m.contains(DISTANCE_LIMIT_MARKER) => Self::new(ROUTE_TOO_LONG),
            Some(m) => Self::new(m),
            None => Self::generic(),
        }
    }

    pub fn generic() -> Self {
        Self::new(DIRECTIONS_GENERIC)
    }

    /// One or both endpoint names could not be geocoded
    pub fn locations_not_found() -> Self {
        Self {
            kind: DirectionsErrorKind::LocationNotFound,
            message: LOCATIONS_NOT_FOUND.to_string(),
        }
    }
}

/// Trait for routing backends
pub trait RouteProvider: Send + Sync {
    /// Route between two coordinates
    fn route(
        &self,
        from: LonLat,
        to: LonLat,
    ) -> impl std::future::Future<Output = Result<RouteResult, DirectionsError>> + Send;
}

/// Named maneuver for an upstream instruction type code
pub fn maneuver_name(code: u8) -> Option<&'static str> {
    let name = match code {
        0 => "turn-left",
        1 => "turn-right",
        2 => "sharp-left",
        3 => "sharp-right",
        4 => "slight-left",
        5 => "slight-right",
        6 => "straight",
        7 => "enter-roundabout",
        8 => "exit-roundabout",
        9 => "u-turn",
        10 => "arrive",
        11 => "depart",
        12 => "keep-left",
        13 => "keep-right",
        _ => return None,
    };
    Some(name)
}
