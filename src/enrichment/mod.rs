//! Best-effort data attached to a selected place
//!
//! Five independent lookups: weather, encyclopedia summary, boundary
//! polygon, nearby hospitals and nearby notable places. None of them can
//! fail the selection; each degrades to `None` or an empty list.

pub mod weather;
pub mod wiki;

use crate::config::Config;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{needs_boundary, GeoLookup};
use crate::place::{LonLat, Place};
use serde::Serialize;
use std::future::Future;
use tokio::sync::mpsc;
use tracing::debug;

pub use weather::{WeatherClient, WeatherReport};
pub use wiki::{WikiClient, WikiSummary};

/// Enrichment results for the current selection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentBundle {
    pub weather: Option<WeatherReport>,
    pub wiki_summary: Option<WikiSummary>,
    pub boundary: Option<geojson::Feature>,
    pub nearby_hospitals: Vec<Place>,
    pub nearby_notable: Vec<Place>,
}

/// One completed lookup
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentPayload {
    Weather(Option<WeatherReport>),
    WikiSummary(Option<WikiSummary>),
    Boundary(Option<geojson::Feature>),
    NearbyHospitals(Vec<Place>),
    NearbyNotable(Vec<Place>),
}

impl EnrichmentPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Weather(_) => "weather",
            Self::WikiSummary(_) => "wiki_summary",
            Self::Boundary(_) => "boundary",
            Self::NearbyHospitals(_) => "nearby_hospitals",
            Self::NearbyNotable(_) => "nearby_notable",
        }
    }
}

/// A lookup result tagged with the selection generation it was issued for
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentUpdate {
    pub generation: u64,
    pub payload: EnrichmentPayload,
}

impl EnrichmentBundle {
    /// Merge one lookup into the bundle
    pub fn apply(&mut self, payload: EnrichmentPayload) {
        match payload {
            EnrichmentPayload::Weather(w) => self.weather = w,
            EnrichmentPayload::WikiSummary(s) => self.wiki_summary = s,
            EnrichmentPayload::Boundary(b) => self.boundary = b,
            EnrichmentPayload::NearbyHospitals(p) => self.nearby_hospitals = p,
            EnrichmentPayload::NearbyNotable(p) => self.nearby_notable = p,
        }
    }
}

/// Runs the enrichment lookups for a place
#[derive(Debug, Clone)]
pub struct Enricher {
    nominatim: NominatimBackend,
    weather: WeatherClient,
    wiki: WikiClient,
    radius_m: u32,
    limit: usize,
}

impl Enricher {
    pub fn new(
        nominatim: NominatimBackend,
        weather: WeatherClient,
        wiki: WikiClient,
        radius_m: u32,
        limit: usize,
    ) -> Self {
        Self {
            nominatim,
            weather,
            wiki,
            radius_m,
            limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            NominatimBackend::from_config(config),
            WeatherClient::from_config(config),
            WikiClient::from_config(config),
            config.defaults.nearby_radius_m,
            config.defaults.nearby_limit,
        )
    }

    async fn weather_for(&self, at: Option<LonLat>) -> Option<WeatherReport> {
        let at = at?;
        self.weather.fetch_weather(at.lat, at.lon).await
    }

    async fn boundary_for(&self, place: &Place) -> Option<geojson::Feature> {
        if !needs_boundary(place) {
            debug!(title = %place.title, "Skipping boundary lookup");
            return None;
        }
        self.nominatim.fetch_boundary(&place.title).await
    }

    async fn hospitals_for(&self, at: Option<LonLat>) -> Vec<Place> {
        match at {
            Some(at) => self.nominatim.nearby_hospitals(at, self.radius_m, self.limit).await,
            None => Vec::new(),
        }
    }

    async fn notable_for(&self, at: Option<LonLat>) -> Vec<Place> {
        match at {
            Some(at) => self.wiki.nearby_notable(at, self.radius_m, self.limit).await,
            None => Vec::new(),
        }
    }

    /// Run every lookup concurrently and wait for all of them
    pub async fn fetch_all(&self, place: &Place) -> EnrichmentBundle {
        let at = place.coordinates();
        let (weather, wiki_summary, boundary, nearby_hospitals, nearby_notable) = tokio::join!(
            self.weather_for(at),
            self.wiki.fetch_summary(&place.title),
            self.boundary_for(place),
            self.hospitals_for(at),
            self.notable_for(at),
        );

        EnrichmentBundle {
            weather,
            wiki_summary,
            boundary,
            nearby_hospitals,
            nearby_notable,
        }
    }

    /// Spawn one task per lookup and stream results in completion order
    ///
    /// The channel closes once every lookup has reported.
    pub fn dispatch(&self, place: &Place, generation: u64) -> mpsc::UnboundedReceiver<EnrichmentUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let at = place.coordinates();

        let this = self.clone();
        spawn_lookup(&tx, generation, async move {
            EnrichmentPayload::Weather(this.weather_for(at).await)
        });

        let this = self.clone();
        let title = place.title.clone();
        spawn_lookup(&tx, generation, async move {
            EnrichmentPayload::WikiSummary(this.wiki.fetch_summary(&title).await)
        });

        let this = self.clone();
        let target = place.clone();
        spawn_lookup(&tx, generation, async move {
            EnrichmentPayload::Boundary(this.boundary_for(&target).await)
        });

        let this = self.clone();
        spawn_lookup(&tx, generation, async move {
            EnrichmentPayload::NearbyHospitals(this.hospitals_for(at).await)
        });

        let this = self.clone();
        spawn_lookup(&tx, generation, async move {
            EnrichmentPayload::NearbyNotable(this.notable_for(at).await)
        });

        rx
    }
}

fn spawn_lookup<F>(tx: &mpsc::UnboundedSender<EnrichmentUpdate>, generation: u64, lookup: F)
where
    F: Future<Output = EnrichmentPayload> + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let payload = lookup.await;
        // Receiver gone means nobody wants the result anymore
        let _ = tx.send(EnrichmentUpdate { generation, payload });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_enricher() -> Enricher {
        // Port 9 (discard) refuses connections, so every lookup misses fast
        Enricher::new(
            NominatimBackend::with_base_url("http://127.0.0.1:9"),
            WeatherClient::new("http://127.0.0.1:9/weather", "key"),
            WikiClient::new("http://127.0.0.1:9/rest", "http://127.0.0.1:9/api"),
            1_000,
            5,
        )
    }

    #[test]
    fn test_apply_replaces_one_field() {
        let mut bundle = EnrichmentBundle::default();
        let hospital = Place::new("City Hospital", "hospital", LonLat::new(1.0, 2.0));
        bundle.apply(EnrichmentPayload::NearbyHospitals(vec![hospital.clone()]));

        assert_eq!(bundle.nearby_hospitals, vec![hospital]);
        assert!(bundle.weather.is_none());
        assert!(bundle.nearby_notable.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_degrades_to_empty_bundle() {
        let place = Place::new("Famous restaurant", "restaurant", LonLat::new(2.35, 48.85));
        let bundle = offline_enricher().fetch_all(&place).await;
        assert_eq!(bundle, EnrichmentBundle::default());
    }

    #[tokio::test]
    async fn test_dispatch_reports_every_lookup_once() {
        let place = Place::new("Paris", "city, Paris, France", LonLat::new(2.35, 48.85));
        let mut rx = offline_enricher().dispatch(&place, 7);

        let mut kinds = Vec::new();
        while let Some(update) = rx.recv().await {
            assert_eq!(update.generation, 7);
            kinds.push(update.payload.kind());
        }
        kinds.sort_unstable();
        assert_eq!(
            kinds,
            vec!["boundary", "nearby_hospitals", "nearby_notable", "weather", "wiki_summary"]
        );
    }
}
