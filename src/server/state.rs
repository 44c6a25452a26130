//! Server shared state
//!
//! Holds configuration, the single active session, the lookup clients and
//! the place store.

use crate::config::Config;
use crate::directions::ors::OrsBackend;
use crate::directions::DirectionsWorkflow;
use crate::enrichment::Enricher;
use crate::error::Result;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::reverse::ReverseGeocoder;
use crate::place::{LonLat, Place};
use crate::session::Session;
use crate::store::PlaceStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Directions workflow as wired for the server
pub type ServerWorkflow = DirectionsWorkflow<NominatimBackend, OrsBackend>;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// The active selection session
    pub session: RwLock<Session>,

    pub geo: NominatimBackend,
    pub reverse: ReverseGeocoder,
    pub enricher: Enricher,
    pub workflow: ServerWorkflow,

    /// Saved places
    pub store: Mutex<PlaceStore>,

    started: Instant,
}

impl AppState {
    /// Create application state around an already loaded store
    pub fn new(config: Config, store: PlaceStore) -> Self {
        let geo = NominatimBackend::from_config(&config);
        Self {
            reverse: ReverseGeocoder::from_config(&config),
            enricher: Enricher::from_config(&config),
            workflow: DirectionsWorkflow::new(geo.clone(), OrsBackend::from_config(&config)),
            geo,
            session: RwLock::new(Session::new()),
            store: Mutex::new(store),
            config: Arc::new(RwLock::new(config)),
            started: Instant::now(),
        }
    }

    /// Create application state with the default place store
    pub fn load(config: Config) -> Result<Self> {
        Ok(Self::new(config, PlaceStore::load()?))
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Stream enrichment for a selection into the session
///
/// Results for an older selection are dropped by the session itself.
pub fn spawn_enrichment(state: Arc<AppState>, place: &Place, generation: u64) {
    let mut rx = state.enricher.dispatch(place, generation);
    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            state.session.write().await.apply_enrichment(update);
        }
        debug!(generation, "Enrichment finished");
    });
}

/// Fetch the route between two consecutive selections
pub fn spawn_implicit_route(state: Arc<AppState>, generation: u64, from: LonLat, to: LonLat) {
    tokio::spawn(async move {
        let outcome = state.workflow.route(from, to).await;
        state
            .session
            .write()
            .await
            .apply_implicit_route(generation, outcome);
    });
}
