//! Place selection state
//!
//! One explicit session object owns the search term, results, selection,
//! history, favorites, enrichment and directions state. Every mutation goes
//! through a method here and publishes a [`SessionEvent`]; subscribers then
//! call [`Session::render_plan`] to recompute the map.
//!
//! Enrichment and implicit-route responses carry the selection generation
//! they were issued for. A response for an older generation is dropped.

pub mod directions;

use crate::compose::{compose, RenderPlan, ViewInput};
use crate::constants::session::{EVENT_CHANNEL_CAPACITY, MAX_HISTORY_ENTRIES};
use crate::directions::{DirectionsError, RouteResult};
use crate::enrichment::{EnrichmentBundle, EnrichmentUpdate};
use crate::error::Result;
use crate::geo::GeoLookup;
use crate::place::{LonLat, Place};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub use crate::compose::ViewMode;
pub use directions::{DirectionsPhase, DirectionsState, DirectionsTicket};

/// Published after every session mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Searched { term: String, count: usize },
    Selected { generation: u64, title: String },
    FavoriteAdded { title: String },
    EnrichmentApplied { generation: u64, kind: &'static str },
    DirectionsChanged { phase: &'static str },
    ImplicitRouteApplied { generation: u64 },
}

/// Result of selecting a place
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Generation to tag enrichment requests with
    pub generation: u64,
    /// Previous and new coordinates when a route between them should be fetched
    pub implicit_route: Option<(LonLat, LonLat)>,
}

/// Serializable copy of the session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub search_term: String,
    pub search_results: Vec<Place>,
    pub view: ViewMode,
    pub selected: Option<Place>,
    pub history: Vec<Place>,
    pub favorites: Vec<Place>,
    pub generation: u64,
    pub enrichment: EnrichmentBundle,
    pub implicit_route: Option<RouteResult>,
    pub directions: DirectionsState,
}

/// The single active selection session
#[derive(Debug)]
pub struct Session {
    search_term: String,
    search_results: Vec<Place>,
    view: ViewMode,
    selected: Option<Place>,
    history: Vec<Place>,
    favorites: Vec<Place>,
    generation: u64,
    enrichment: EnrichmentBundle,
    implicit_route: Option<RouteResult>,
    directions: DirectionsState,
    events: broadcast::Sender<SessionEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Implicit directions need both coordinates to change
///
/// Moving along a single axis does not count.
fn differs_on_both_axes(a: LonLat, b: LonLat) -> bool {
    a.lon != b.lon && a.lat != b.lat
}

impl Session {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            search_term: String::new(),
            search_results: Vec::new(),
            view: ViewMode::ResultList,
            selected: None,
            history: Vec::new(),
            favorites: Vec::new(),
            generation: 0,
            enrichment: EnrichmentBundle::default(),
            implicit_route: None,
            directions: DirectionsState::default(),
            events,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn search_results(&self) -> &[Place] {
        &self.search_results
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn selected(&self) -> Option<&Place> {
        self.selected.as_ref()
    }

    /// Most recent first
    pub fn history(&self) -> &[Place] {
        &self.history
    }

    pub fn favorites(&self) -> &[Place] {
        &self.favorites
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn enrichment(&self) -> &EnrichmentBundle {
        &self.enrichment
    }

    pub fn implicit_route(&self) -> Option<&RouteResult> {
        self.implicit_route.as_ref()
    }

    pub fn directions(&self) -> &DirectionsState {
        &self.directions
    }

    /// Receive an event after every mutation
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn emit_directions(&self) {
        self.emit(SessionEvent::DirectionsChanged {
            phase: self.directions.phase.name(),
        });
    }

    /// Run a search and store its results
    pub async fn search<G: GeoLookup>(&mut self, geo: &G, term: &str) -> Result<&[Place]> {
        let results = geo.search_by_term(term).await?;
        self.apply_search(term, results);
        Ok(&self.search_results)
    }

    /// Replace the search results and clear the selection
    pub fn apply_search(&mut self, term: &str, results: Vec<Place>) {
        self.search_term = term.to_string();
        self.search_results = results;
        self.selected = None;
        self.view = ViewMode::ResultList;
        self.generation += 1;
        self.enrichment = EnrichmentBundle::default();
        self.implicit_route = None;

        debug!(term, count = self.search_results.len(), "Search results stored");
        self.emit(SessionEvent::Searched {
            term: self.search_term.clone(),
            count: self.search_results.len(),
        });
    }

    /// Select a place and move it to the front of the history
    ///
    /// Clicking a second place while another is selected asks for a route
    /// between them, unless directions mode is active.
    pub fn select(&mut self, place: Place) -> Selection {
        let implicit_route = match (
            self.directions.active,
            self.selected.as_ref().and_then(Place::coordinates),
            place.coordinates(),
        ) {
            (false, Some(from), Some(to)) if differs_on_both_axes(from, to) => Some((from, to)),
            _ => None,
        };

        let key = place.identity_key();
        self.history.retain(|p| p.identity_key() != key);
        self.history.insert(0, place.clone());
        self.history.truncate(MAX_HISTORY_ENTRIES);

        self.selected = Some(place);
        self.view = ViewMode::SinglePlace;
        self.generation += 1;
        self.enrichment = EnrichmentBundle::default();
        self.implicit_route = None;

        let title = self.selected.as_ref().map(|p| p.title.clone()).unwrap_or_default();
        debug!(generation = self.generation, title = %title, "Place selected");
        self.emit(SessionEvent::Selected {
            generation: self.generation,
            title,
        });

        Selection {
            generation: self.generation,
            implicit_route,
        }
    }

    /// Append to favorites; duplicates are kept
    pub fn favorite(&mut self, place: Place) {
        let title = place.title.clone();
        self.favorites.push(place);
        self.emit(SessionEvent::FavoriteAdded { title });
    }

    /// Merge an enrichment result if it belongs to the current selection
    pub fn apply_enrichment(&mut self, update: EnrichmentUpdate) -> bool {
        let kind = update.payload.kind();
        if update.generation != self.generation {
            debug!(
                kind,
                stale = update.generation,
                current = self.generation,
                "Dropping stale enrichment"
            );
            return false;
        }

        self.enrichment.apply(update.payload);
        self.emit(SessionEvent::EnrichmentApplied {
            generation: self.generation,
            kind,
        });
        true
    }

    /// Store the route fetched for an implicit selection pair
    pub fn apply_implicit_route(
        &mut self,
        generation: u64,
        outcome: std::result::Result<RouteResult, DirectionsError>,
    ) -> bool {
        if generation != self.generation || self.directions.active {
            debug!(generation, current = self.generation, "Dropping stale implicit route");
            return false;
        }

        match outcome {
            Ok(route) => {
                self.implicit_route = Some(route);
                self.emit(SessionEvent::ImplicitRouteApplied { generation });
                true
            }
            Err(e) => {
                warn!(error = %e, "Implicit directions failed");
                false
            }
        }
    }

    pub fn enter_directions_mode(&mut self) {
        self.directions.enter();
        self.emit_directions();
    }

    /// Leave directions mode, clearing inputs and any route in flight
    pub fn exit_directions_mode(&mut self) {
        self.directions.exit();
        self.emit_directions();
    }

    pub fn edit_origin(&mut self, text: &str) {
        self.directions.edit_origin(text);
        self.emit_directions();
    }

    pub fn edit_destination(&mut self, text: &str) {
        self.directions.edit_destination(text);
        self.emit_directions();
    }

    /// Start a directions request, entering directions mode if needed
    pub fn begin_directions(&mut self, origin: &str, destination: &str) -> DirectionsTicket {
        let ticket = self.directions.begin(origin, destination);
        self.emit_directions();
        ticket
    }

    pub fn directions_resolved(&mut self, ticket: DirectionsTicket, origin: LonLat, destination: LonLat) -> bool {
        let applied = self.directions.resolved(ticket, origin, destination);
        if applied {
            self.emit_directions();
        }
        applied
    }

    pub fn display_directions(&mut self, ticket: DirectionsTicket, route: RouteResult) -> bool {
        let applied = self.directions.display(ticket, route);
        if applied {
            self.emit_directions();
        }
        applied
    }

    pub fn fail_directions(&mut self, ticket: DirectionsTicket, error: DirectionsError) -> bool {
        let applied = self.directions.fail(ticket, error);
        if applied {
            self.emit_directions();
        }
        applied
    }

    /// Borrowed view of the state for the composer
    pub fn compose_input(&self) -> ViewInput<'_> {
        let route = if self.directions.active {
            self.directions.route()
        } else {
            self.implicit_route.as_ref()
        };

        ViewInput {
            selected: self.selected.as_ref(),
            search_results: &self.search_results,
            view: self.view,
            enrichment: &self.enrichment,
            route,
            directions_mode: self.directions.active,
            endpoints: (self.directions.origin_coords, self.directions.destination_coords),
        }
    }

    /// Recompute the map for the current state
    pub fn render_plan(&self) -> RenderPlan {
        compose(&self.compose_input())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            search_term: self.search_term.clone(),
            search_results: self.search_results.clone(),
            view: self.view,
            selected: self.selected.clone(),
            history: self.history.clone(),
            favorites: self.favorites.clone(),
            generation: self.generation,
            enrichment: self.enrichment.clone(),
            implicit_route: self.implicit_route.clone(),
            directions: self.directions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Viewport;
    use crate::directions::RouteSummary;
    use crate::enrichment::{EnrichmentPayload, WeatherReport};
    use crate::geo::GeoLocation;

    struct FixedSearch(Vec<Place>);

    impl GeoLookup for FixedSearch {
        async fn search_by_term(&self, _term: &str) -> Result<Vec<Place>> {
            Ok(self.0.clone())
        }

        async fn geocode(&self, _query: &str) -> Result<Option<GeoLocation>> {
            Ok(None)
        }

        async fn fetch_boundary(&self, _title: &str) -> Option<geojson::Feature> {
            None
        }
    }

    fn paris() -> Place {
        Place::new("Paris", "city, Paris, France", LonLat::new(2.3522, 48.8566)).with_id("1")
    }

    fn lyon() -> Place {
        Place::new("Lyon", "city, Lyon, France", LonLat::new(4.8357, 45.764)).with_id("2")
    }

    fn weather() -> EnrichmentPayload {
        EnrichmentPayload::Weather(Some(WeatherReport {
            temperature: 18.0,
            description: "Sunny".to_string(),
            icon: "01d".to_string(),
            city: None,
            fetched_at: chrono::Local::now(),
        }))
    }

    fn route() -> RouteResult {
        RouteResult {
            coordinates: vec![LonLat::new(2.3522, 48.8566), LonLat::new(4.8357, 45.764)],
            steps: vec![],
            summary: RouteSummary::default(),
        }
    }

    #[test]
    fn test_reselect_moves_to_front_without_duplicates() {
        let mut session = Session::new();
        session.select(paris());
        session.select(lyon());
        session.select(paris());

        let titles: Vec<_> = session.history().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Paris", "Lyon"]);

        session.select(paris());
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history()[0].title, "Paris");
    }

    #[test]
    fn test_history_is_capped() {
        let mut session = Session::new();
        for i in 0..(MAX_HISTORY_ENTRIES + 5) {
            session.select(Place::new(format!("P{}", i), "", LonLat::new(i as f64 * 0.01, 1.0)));
        }
        assert_eq!(session.history().len(), MAX_HISTORY_ENTRIES);
        assert_eq!(session.history()[0].title, format!("P{}", MAX_HISTORY_ENTRIES + 4));
    }

    #[tokio::test]
    async fn test_empty_search_is_empty_results() {
        let mut session = Session::new();
        session.select(paris());

        let results = session.search(&FixedSearch(vec![]), "Paris").await.unwrap();
        assert!(results.is_empty());
        assert!(session.selected().is_none());
        assert_eq!(session.view(), ViewMode::ResultList);
        assert_eq!(session.search_term(), "Paris");
    }

    #[test]
    fn test_stale_enrichment_is_dropped() {
        let mut session = Session::new();
        let first = session.select(paris());
        let second = session.select(lyon());

        assert!(!session.apply_enrichment(EnrichmentUpdate {
            generation: first.generation,
            payload: weather(),
        }));
        assert!(session.enrichment().weather.is_none());

        assert!(session.apply_enrichment(EnrichmentUpdate {
            generation: second.generation,
            payload: weather(),
        }));
        assert!(session.enrichment().weather.is_some());
    }

    #[test]
    fn test_search_invalidates_pending_enrichment() {
        let mut session = Session::new();
        let selection = session.select(paris());
        session.apply_search("Lyon", vec![lyon()]);

        assert!(!session.apply_enrichment(EnrichmentUpdate {
            generation: selection.generation,
            payload: weather(),
        }));
    }

    #[test]
    fn test_implicit_route_needs_both_axes_to_differ() {
        let mut session = Session::new();
        assert!(session.select(paris()).implicit_route.is_none());

        let same_lat = Place::new("East", "", LonLat::new(3.0, 48.8566));
        assert!(session.select(same_lat).implicit_route.is_none());

        let selection = session.select(lyon());
        assert_eq!(
            selection.implicit_route,
            Some((LonLat::new(3.0, 48.8566), LonLat::new(4.8357, 45.764)))
        );
    }

    #[test]
    fn test_no_implicit_route_in_directions_mode() {
        let mut session = Session::new();
        session.select(paris());
        session.enter_directions_mode();
        assert!(session.select(lyon()).implicit_route.is_none());
    }

    #[test]
    fn test_implicit_route_is_drawn_without_moving_viewport() {
        let mut session = Session::new();
        session.select(paris());
        let selection = session.select(lyon());

        assert!(session.apply_implicit_route(selection.generation, Ok(route())));
        let plan = session.render_plan();
        assert_eq!(plan.polyline.len(), 2);
        assert!(matches!(plan.viewport, Viewport::Center { zoom: 10, .. }));

        session.select(paris());
        assert!(session.implicit_route().is_none());
        assert!(!session.apply_implicit_route(selection.generation, Ok(route())));
    }

    #[test]
    fn test_favorites_keep_duplicates() {
        let mut session = Session::new();
        session.favorite(paris());
        session.favorite(paris());
        assert_eq!(session.favorites().len(), 2);
    }

    #[test]
    fn test_directions_route_fits_viewport() {
        let mut session = Session::new();
        let ticket = session.begin_directions("Paris", "Lyon");
        session.directions_resolved(ticket, LonLat::new(2.3522, 48.8566), LonLat::new(4.8357, 45.764));
        session.display_directions(ticket, route());

        let plan = session.render_plan();
        assert!(matches!(plan.viewport, Viewport::FitBounds { .. }));
        assert_eq!(plan.markers.len(), 2);

        session.exit_directions_mode();
        let plan = session.render_plan();
        assert!(plan.polyline.is_empty());
        assert!(matches!(plan.viewport, Viewport::Placeholder { .. }));
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut session = Session::new();
        let mut rx = session.subscribe();

        session.apply_search("Paris", vec![paris()]);
        let selection = session.select(paris());
        session.favorite(paris());
        session.enter_directions_mode();

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Searched { term: "Paris".to_string(), count: 1 }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::Selected { generation: selection.generation, title: "Paris".to_string() }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::FavoriteAdded { title: "Paris".to_string() }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::DirectionsChanged { phase: "idle" }
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut session = Session::new();
        session.select(paris());
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["selected"]["title"], "Paris");
        assert_eq!(json["view"], "single_place");
        assert_eq!(json["directions"]["phase"]["state"], "idle");
    }
}
