//! Map view composition
//!
//! Turns the current selection, enrichment and route into one render plan:
//! the markers to draw, an optional boundary overlay, an optional route
//! polyline and a single viewport decision.
//!
//! Viewport priority, first match wins:
//! 1. boundary polygon present: fit to its bounds
//! 2. directions mode with a route of at least two points: fit to the route
//! 3. a place is selected: center on it
//! 4. otherwise: placeholder prompt

use crate::constants::map::{CITY_ZOOM, CITY_ZOOM_KEYWORDS, DEFAULT_ZOOM, ROUTE_FIT_PADDING_PX};
use crate::directions::RouteResult;
use crate::enrichment::EnrichmentBundle;
use crate::place::{LonLat, Place};
use geo::{BoundingRect, Geometry, LineString, Rect};
use serde::Serialize;
use tracing::debug;

/// Prompt shown when there is nothing to center on
pub const PLACEHOLDER_MESSAGE: &str = "Search for a place to see it on the map.";

/// Whether the map lists search results or focuses on one place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    ResultList,
    SinglePlace,
}

/// Icon style for a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    SearchResult,
    Selected,
    Hospital,
    Notable,
    Origin,
    Destination,
}

/// A pin on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    /// `[lat, lon]`
    pub position: [f64; 2],
    pub title: String,
    pub category: MarkerCategory,
    /// The place to select when the marker is clicked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<Place>,
}

impl Marker {
    fn for_place(place: &Place, category: MarkerCategory) -> Option<Self> {
        let at = place.coordinates()?;
        Some(Self {
            position: at.to_lat_lon(),
            title: place.title.clone(),
            category,
            place: Some(place.clone()),
        })
    }

    fn endpoint(at: LonLat, title: &str, category: MarkerCategory) -> Self {
        Self {
            position: at.to_lat_lon(),
            title: title.to_string(),
            category,
            place: None,
        }
    }
}

/// What the map should show
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    /// Fit the view to a `[lat, lon]` box
    FitBounds {
        south_west: [f64; 2],
        north_east: [f64; 2],
        padding: u32,
    },
    Center { center: [f64; 2], zoom: u8 },
    Placeholder { message: String },
}

impl Viewport {
    fn fit(rect: Rect<f64>, padding: u32) -> Self {
        Self::FitBounds {
            south_west: [rect.min().y, rect.min().x],
            north_east: [rect.max().y, rect.max().x],
            padding,
        }
    }
}

/// Everything a map widget needs for one render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub markers: Vec<Marker>,
    pub boundary_overlay: Option<geojson::Feature>,
    /// Route vertices in `[lat, lon]` display order
    pub polyline: Vec<[f64; 2]>,
    pub viewport: Viewport,
}

/// Inputs to [`compose`]
#[derive(Debug, Clone, Copy)]
pub struct ViewInput<'a> {
    pub selected: Option<&'a Place>,
    pub search_results: &'a [Place],
    pub view: ViewMode,
    pub enrichment: &'a EnrichmentBundle,
    pub route: Option<&'a RouteResult>,
    pub directions_mode: bool,
    /// Resolved origin and destination, drawn in directions mode
    pub endpoints: (Option<LonLat>, Option<LonLat>),
}

/// Zoom for centering on a place
///
/// An explicit zoom level wins; otherwise city-like descriptions get a
/// wider view.
pub fn zoom_for(place: &Place) -> u8 {
    match place.zoom_level {
        Some(zoom) => zoom,
        None if place.description_matches(CITY_ZOOM_KEYWORDS) => CITY_ZOOM,
        None => DEFAULT_ZOOM,
    }
}

/// Bounds of a GeoJSON feature's geometry
pub fn feature_bounds(feature: &geojson::Feature) -> Option<Rect<f64>> {
    let value = feature.geometry.as_ref()?.value.clone();
    let geometry: Geometry<f64> = value.try_into().ok()?;
    geometry.bounding_rect()
}

/// Bounds of a route polyline
pub fn route_bounds(route: &RouteResult) -> Option<Rect<f64>> {
    let line: LineString<f64> = route
        .coordinates
        .iter()
        .map(|c| (c.lon, c.lat))
        .collect::<Vec<_>>()
        .into();
    line.bounding_rect()
}

fn markers(input: &ViewInput<'_>) -> Vec<Marker> {
    if input.directions_mode {
        let (origin, destination) = input.endpoints;
        return origin
            .map(|at| Marker::endpoint(at, "Origin", MarkerCategory::Origin))
            .into_iter()
            .chain(destination.map(|at| Marker::endpoint(at, "Destination", MarkerCategory::Destination)))
            .collect();
    }

    let primary: Vec<Marker> = match input.view {
        ViewMode::ResultList => input
            .search_results
            .iter()
            .filter_map(|p| Marker::for_place(p, MarkerCategory::SearchResult))
            .collect(),
        ViewMode::SinglePlace => input
            .selected
            .and_then(|p| Marker::for_place(p, MarkerCategory::Selected))
            .into_iter()
            .collect(),
    };

    let hospitals = input
        .enrichment
        .nearby_hospitals
        .iter()
        .filter_map(|p| Marker::for_place(p, MarkerCategory::Hospital));
    let notable = input
        .enrichment
        .nearby_notable
        .iter()
        .filter_map(|p| Marker::for_place(p, MarkerCategory::Notable));

    primary.into_iter().chain(hospitals).chain(notable).collect()
}

fn viewport(input: &ViewInput<'_>) -> Viewport {
    if let Some(rect) = input.enrichment.boundary.as_ref().and_then(feature_bounds) {
        return Viewport::fit(rect, 0);
    }

    if input.directions_mode {
        if let Some(rect) = input
            .route
            .filter(|r| r.has_polyline())
            .and_then(route_bounds)
        {
            return Viewport::fit(rect, ROUTE_FIT_PADDING_PX);
        }
    }

    if let Some(place) = input.selected {
        if let Some(at) = place.coordinates() {
            return Viewport::Center {
                center: at.to_lat_lon(),
                zoom: zoom_for(place),
            };
        }
        debug!(title = %place.title, "Selected place has no usable coordinates");
    }

    Viewport::Placeholder {
        message: PLACEHOLDER_MESSAGE.to_string(),
    }
}

/// Compute the render plan for a view
pub fn compose(input: &ViewInput<'_>) -> RenderPlan {
    let polyline = input
        .route
        .filter(|r| r.has_polyline())
        .map(|r| r.coordinates.iter().map(|c| c.to_lat_lon()).collect())
        .unwrap_or_default();

    RenderPlan {
        markers: markers(input),
        boundary_overlay: input.enrichment.boundary.clone(),
        polyline,
        viewport: viewport(input),
    }
}
