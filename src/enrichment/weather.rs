//! Current weather (OpenWeather)
//!
//! Metric units. The raw condition group is mapped to a friendlier word;
//! groups outside the vocabulary pass through unchanged.

use crate::config::Config;
use crate::constants::api::{OPENWEATHER_ICON_URL, USER_AGENT};
use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Weather shown next to a selected place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Degrees Celsius, rounded to the nearest degree
    pub temperature: f64,
    pub description: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// When the reading was taken
    pub fetched_at: DateTime<Local>,
}

impl WeatherReport {
    /// Image URL for the condition icon
    pub fn icon_url(&self) -> String {
        OPENWEATHER_ICON_URL.replace("{icon}", &self.icon)
    }

    /// Reading time on a 12-hour clock, e.g. `02:05 PM`
    pub fn local_time(&self) -> String {
        self.fetched_at.format("%I:%M %p").to_string()
    }
}

/// Human-readable word for an upstream condition group
pub fn describe_condition(raw: &str) -> String {
    let mapped = match raw {
        "Clear" => "Sunny",
        "Clouds" => "Cloudy",
        "Rain" => "Rainy",
        "Drizzle" => "Drizzle",
        "Thunderstorm" => "Stormy",
        "Snow" => "Snowy",
        "Mist" => "Misty",
        "Smoke" => "Smoky",
        "Haze" => "Hazy",
        "Dust" => "Dusty",
        "Fog" => "Foggy",
        "Sand" => "Sandy",
        "Ash" => "Ashy",
        "Squall" => "Windy",
        "Tornado" => "Tornado",
        other => other,
    };
    mapped.to_string()
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    main: MainBlock,
    #[serde(default)]
    weather: Vec<Condition>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    #[serde(default)]
    icon: String,
}

impl WeatherReport {
    fn from_response(body: OpenWeatherResponse, fetched_at: DateTime<Local>) -> Self {
        let (description, icon) = body
            .weather
            .into_iter()
            .next()
            .map(|c| (describe_condition(&c.main), c.icon))
            .unwrap_or_default();

        WeatherReport {
            temperature: body.main.temp.round(),
            description,
            icon,
            city: body.name.filter(|n| !n.is_empty()),
            fetched_at,
        }
    }
}

/// OpenWeather client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl WeatherClient {
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

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoints.weather.clone(), config.api_keys.weather.clone())
    }

    /// Current weather, or None on any failure
    pub async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherReport> {
        match self.current(lat, lon).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, lat, lon, "Weather lookup failed");
                None
            }
        }
    }

    /// Current weather with errors
    pub async fn current(&self, lat: f64, lon: f64) -> Result<WeatherReport> {
        if self.api_key.is_empty() {
            return Err(Error::Config("Weather API key is not configured".to_string()));
        }

        let response = self.client
            .get(&self.url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Config("Invalid weather API key".to_string()));
        }
        if !status.is_success() {
            return Err(Error::Lookup(format!("Weather API returned status: {}", status)));
        }

        let body: OpenWeatherResponse = response.json().await?;
        Ok(WeatherReport::from_response(body, Local::now()))
    }
}
