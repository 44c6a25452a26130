//! Directions workflow
//!
//! Resolve two place names in parallel, route between them and record the
//! outcome on the session. The staged functions let a caller drop its
//! session lock while the network calls run; [`DirectionsWorkflow::submit`]
//! does all of it against an exclusively borrowed session.

use crate::directions::{DirectionsError, RouteProvider, RouteResult};
use crate::geo::GeoLookup;
use crate::place::LonLat;
use crate::session::{DirectionsPhase, DirectionsTicket, Session};
use tracing::{debug, warn};

/// Geocoder plus router
#[derive(Debug, Clone)]
pub struct DirectionsWorkflow<G, R> {
    geo: G,
    router: R,
}

impl<G: GeoLookup, R: RouteProvider> DirectionsWorkflow<G, R> {
    pub fn new(geo: G, router: R) -> Self {
        Self { geo, router }
    }

    pub fn geo(&self) -> &G {
        &self.geo
    }

    pub fn router(&self) -> &R {
        &self.router
    }

    async fn resolve_one(&self, name: &str) -> Option<LonLat> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        match self.geo.geocode(name).await {
            Ok(found) => found.map(|loc| loc.lon_lat()),
            Err(e) => {
                warn!(error = %e, name, "Failed to geocode directions endpoint");
                None
            }
        }
    }

    /// Geocode both names concurrently; None if either fails
    pub async fn resolve(&self, origin: &str, destination: &str) -> Option<(LonLat, LonLat)> {
        let (from, to) = tokio::join!(self.resolve_one(origin), self.resolve_one(destination));
        debug!(origin, destination, ?from, ?to, "Resolved directions endpoints");
        Some((from?, to?))
    }

    pub async fn route(&self, from: LonLat, to: LonLat) -> Result<RouteResult, DirectionsError> {
        self.router.route(from, to).await
    }

    /// Run the whole request and return the final phase
    pub async fn submit(&self, session: &mut Session, origin: &str, destination: &str) -> DirectionsPhase {
        let ticket = begin(session, origin, destination);
        let resolved = self.resolve(origin, destination).await;

        if let Some((from, to)) = accept_resolution(session, ticket, resolved) {
            let outcome = self.route(from, to).await;
            finish(session, ticket, outcome);
        }

        session.directions().phase.clone()
    }
}

/// Clear the previous outcome and start a request
pub fn begin(session: &mut Session, origin: &str, destination: &str) -> DirectionsTicket {
    session.begin_directions(origin, destination)
}

/// Record the geocoding outcome
///
/// Returns the pair to route between, or None when the request failed
/// or was superseded.
pub fn accept_resolution(
    session: &mut Session,
    ticket: DirectionsTicket,
    resolved: Option<(LonLat, LonLat)>,
) -> Option<(LonLat, LonLat)> {
    match resolved {
        Some((from, to)) => session
            .directions_resolved(ticket, from, to)
            .then_some((from, to)),
        None => {
            session.fail_directions(ticket, DirectionsError::locations_not_found());
            None
        }
    }
}

/// Record the routing outcome; false when the request was superseded
pub fn finish(
    session: &mut Session,
    ticket: DirectionsTicket,
    outcome: Result<RouteResult, DirectionsError>,
) -> bool {
    match outcome {
        Ok(route) => session.display_directions(ticket, route),
        Err(e) => session.fail_directions(ticket, e),
    }
}
