//! Reverse geocoding (OpenCage)
//!
//! Turns coordinates into a short place name. Never fails: a missing key,
//! a slow or broken upstream, or an answer without a usable component all
//! fall back to the configured default location.

use crate::config::Config;
use crate::constants::api::{OPENCAGE_URL, USER_AGENT};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Reverse geocoder with a hard timeout and a fallback name
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
    fallback: String,
}

#[derive(Debug, Deserialize)]
struct OpenCageResponse {
    #[serde(default)]
    results: Vec<OpenCageResult>,
}

#[derive(Debug, Deserialize)]
struct OpenCageResult {
    #[serde(default)]
    components: Components,
}

#[derive(Debug, Default, Deserialize)]
struct Components {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl Components {
    /// Most specific populated name
    fn best_name(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.country)
            .filter(|n| !n.trim().is_empty())
    }
}

impl ReverseGeocoder {
    /// Create a reverse geocoder
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        fallback: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout,
            fallback: fallback.into(),
        }
    }

    /// Create a reverse geocoder from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.endpoints.reverse_geocode.clone(),
            config.api_keys.reverse_geocode.clone(),
            config.reverse_geocode_timeout(),
            config.defaults.fallback_location.clone(),
        )
    }

    /// The name returned when lookup fails
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Place name for a coordinate, or the fallback location
    pub async fn reverse_geocode(&self, lat: f64, lon: f64) -> String {
        self.reverse_geocode_or(lat, lon, &self.fallback).await
    }

    /// Place name for a coordinate, or a caller-supplied default
    pub async fn reverse_geocode_or(&self, lat: f64, lon: f64, default: &str) -> String {
        match tokio::time::timeout(self.timeout, self.lookup(lat, lon)).await {
            Ok(Ok(Some(name))) => name,
            Ok(Ok(None)) => {
                debug!(lat, lon, "Reverse geocode found no named component");
                default.to_string()
            }
            Ok(Err(e)) => {
                warn!(error = %e, lat, lon, "Reverse geocode failed, using fallback");
                default.to_string()
            }
            Err(_) => {
                warn!(lat, lon, timeout = ?self.timeout, "Reverse geocode timed out, using fallback");
                default.to_string()
            }
        }
    }

    /// Raw lookup without timeout or fallback
    pub async fn lookup(&self, lat: f64, lon: f64) -> Result<Option<String>> {
        if self.api_key.is_empty() {
            return Err(Error::Config("Reverse geocoding API key is not configured".to_string()));
        }

        let response = self.client
            .get(&self.base_url)
            .query(&[
                ("q", format!("{},{}", lat, lon)),
                ("key", self.api_key.clone()),
                ("no_annotations", "1".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Reverse geocoding returned status: {}",
                response.status()
            )));
        }

        let body: OpenCageResponse = response.json().await?;
        Ok(body
            .results
            .into_iter()
            .next()
            .and_then(|r| r.components.best_name()))
    }
}

impl Default for ReverseGeocoder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
