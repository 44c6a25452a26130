//! Wikipedia lookups
//!
//! Page summaries by title (REST API) and notable places near a point
//! (MediaWiki geosearch).

use crate::config::Config;
use crate::constants::api::USER_AGENT;
use crate::constants::messages::NO_OVERVIEW;
use crate::error::{Error, Result};
use crate::place::{LonLat, Place};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// MediaWiki accepts geosearch radii between these bounds (meters)
const GEOSEARCH_RADIUS_RANGE: (u32, u32) = (10, 10_000);

/// Encyclopedia overview of a place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WikiSummary {
    pub summary: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
    #[serde(default)]
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct ContentUrls {
    desktop: PageUrl,
}

#[derive(Debug, Deserialize)]
struct PageUrl {
    page: String,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    source: String,
}

impl From<SummaryResponse> for WikiSummary {
    fn from(body: SummaryResponse) -> Self {
        WikiSummary {
            summary: body
                .extract
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| NO_OVERVIEW.to_string()),
            url: body.content_urls.map(|c| c.desktop.page).unwrap_or_default(),
            thumbnail: body.thumbnail.map(|t| t.source),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoSearchResponse {
    #[serde(default)]
    query: Option<GeoSearchQuery>,
}

#[derive(Debug, Deserialize)]
struct GeoSearchQuery {
    #[serde(default)]
    geosearch: Vec<GeoSearchHit>,
}

#[derive(Debug, Deserialize)]
struct GeoSearchHit {
    #[serde(default)]
    pageid: Option<u64>,
    title: String,
    lat: f64,
    lon: f64,
}

impl From<GeoSearchHit> for Place {
    fn from(hit: GeoSearchHit) -> Self {
        let place = Place::new(hit.title, "notable place", LonLat::new(hit.lon, hit.lat));
        match hit.pageid {
            Some(id) => place.with_id(format!("wiki:{}", id)),
            None => place,
        }
    }
}

/// Wikipedia client
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: reqwest::Client,
    rest_url: String,
    api_url: String,
}

impl WikiClient {
    pub fn new(rest_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            rest_url: rest_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoints.wiki_rest.clone(), config.endpoints.wiki_api.clone())
    }

    /// Page summary for a title, or None on any failure
    pub async fn fetch_summary(&self, title: &str) -> Option<WikiSummary> {
        match self.summary(title).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, title, "Encyclopedia lookup failed");
                None
            }
        }
    }

    /// Page summary with errors
    pub async fn summary(&self, title: &str) -> Result<WikiSummary> {
        let url = format!("{}/page/summary/{}", self.rest_url, urlencoding::encode(title));
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Encyclopedia returned status: {}",
                response.status()
            )));
        }

        let body: SummaryResponse = response.json().await?;
        Ok(body.into())
    }

    /// Notable places near a point; failures give an empty list
    pub async fn nearby_notable(&self, center: LonLat, radius_m: u32, limit: usize) -> Vec<Place> {
        match self.geosearch(center, radius_m, limit).await {
            Ok(places) => places,
            Err(e) => {
                warn!(error = %e, "Nearby notable place lookup failed");
                Vec::new()
            }
        }
    }

    async fn geosearch(&self, center: LonLat, radius_m: u32, limit: usize) -> Result<Vec<Place>> {
        let radius = radius_m.clamp(GEOSEARCH_RADIUS_RANGE.0, GEOSEARCH_RADIUS_RANGE.1);
        let response = self.client
            .get(&self.api_url)
            .query(&[
                ("action", "query".to_string()),
                ("list", "geosearch".to_string()),
                ("gscoord", format!("{}|{}", center.lat, center.lon)),
                ("gsradius", radius.to_string()),
                ("gslimit", limit.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Geosearch returned status: {}",
                response.status()
            )));
        }

        let body: GeoSearchResponse = response.json().await?;
        Ok(body
            .query
            .map(|q| q.geosearch.into_iter().map(Place::from).collect())
            .unwrap_or_default())
    }
}
