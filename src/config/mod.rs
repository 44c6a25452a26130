//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/place-explorer/config.toml
//!
//! API keys may also come from the environment (or a `.env` file), which
//! takes precedence over the file.

pub mod defaults;

use crate::constants::api;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default values for lookups and output
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream service base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Default values for lookups and output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Location name used when reverse geocoding fails
    #[serde(default = "default_fallback_location")]
    pub fallback_location: String,

    /// Reverse geocoding timeout in seconds
    #[serde(default = "default_reverse_timeout")]
    pub reverse_geocode_timeout_secs: u64,

    /// Number of search results to request
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Radius for nearby lookups in meters
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_m: u32,

    /// Maximum nearby results per category
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream service base URLs
///
/// Overridable so the clients can be pointed at a mirror or a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_nominatim")]
    pub nominatim: String,

    #[serde(default = "default_reverse_geocode")]
    pub reverse_geocode: String,

    #[serde(default = "default_directions")]
    pub directions: String,

    #[serde(default = "default_weather")]
    pub weather: String,

    #[serde(default = "default_wiki_rest")]
    pub wiki_rest: String,

    #[serde(default = "default_wiki_api")]
    pub wiki_api: String,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,

    /// Directions link template
    #[serde(default = "default_directions_url")]
    pub directions: String,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// OpenRouteService key
    #[serde(default)]
    pub directions: String,

    /// OpenWeather key
    #[serde(default)]
    pub weather: String,

    /// OpenCage key
    #[serde(default)]
    pub reverse_geocode: String,
}

// Default value functions for serde
fn default_fallback_location() -> String {
    DEFAULT_FALLBACK_LOCATION.to_string()
}
fn default_reverse_timeout() -> u64 {
    DEFAULT_REVERSE_TIMEOUT_SECS
}
fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}
fn default_nearby_radius() -> u32 {
    DEFAULT_NEARBY_RADIUS_M
}
fn default_nearby_limit() -> usize {
    DEFAULT_NEARBY_LIMIT
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_nominatim() -> String {
    api::NOMINATIM_URL.to_string()
}
fn default_reverse_geocode() -> String {
    api::OPENCAGE_URL.to_string()
}
fn default_directions() -> String {
    api::ORS_DIRECTIONS_URL.to_string()
}
fn default_weather() -> String {
    api::OPENWEATHER_URL.to_string()
}
fn default_wiki_rest() -> String {
    api::WIKI_REST_URL.to_string()
}
fn default_wiki_api() -> String {
    api::WIKI_API_URL.to_string()
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_directions_url() -> String {
    DEFAULT_DIRECTIONS_URL.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},15z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=15/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            fallback_location: default_fallback_location(),
            reverse_geocode_timeout_secs: default_reverse_timeout(),
            search_limit: default_search_limit(),
            nearby_radius_m: default_nearby_radius(),
            nearby_limit: default_nearby_limit(),
            format: default_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            nominatim: default_nominatim(),
            reverse_geocode: default_reverse_geocode(),
            directions: default_directions(),
            weather: default_weather(),
            wiki_rest: default_wiki_rest(),
            wiki_api: default_wiki_api(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
            directions: default_directions_url(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path and apply environment keys
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from the default path without touching the environment
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Fill API keys from environment variables
    ///
    /// Non-empty variables win over the values from the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |name: &str, current: &mut String| {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                *current = value;
            }
        };
        pick(ENV_DIRECTIONS_KEY, &mut self.api_keys.directions);
        pick(ENV_WEATHER_KEY, &mut self.api_keys.weather);
        pick(ENV_REVERSE_GEOCODE_KEY, &mut self.api_keys.reverse_geocode);
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "fallback_location"] => Some(self.defaults.fallback_location.clone()),
            ["defaults", "reverse_geocode_timeout_secs"] => {
                Some(self.defaults.reverse_geocode_timeout_secs.to_string())
            }
            ["defaults", "search_limit"] => Some(self.defaults.search_limit.to_string()),
            ["defaults", "nearby_radius_m"] => Some(self.defaults.nearby_radius_m.to_string()),
            ["defaults", "nearby_limit"] => Some(self.defaults.nearby_limit.to_string()),
            ["defaults", "format"] => Some(self.defaults.format.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["endpoints", "nominatim"] => Some(self.endpoints.nominatim.clone()),
            ["endpoints", "reverse_geocode"] => Some(self.endpoints.reverse_geocode.clone()),
            ["endpoints", "directions"] => Some(self.endpoints.directions.clone()),
            ["endpoints", "weather"] => Some(self.endpoints.weather.clone()),
            ["endpoints", "wiki_rest"] => Some(self.endpoints.wiki_rest.clone()),
            ["endpoints", "wiki_api"] => Some(self.endpoints.wiki_api.clone()),

            ["url", "default"] => Some(self.url.default.clone()),
            ["url", "directions"] => Some(self.url.directions.clone()),

            ["api_keys", "directions"] => Some(self.api_keys.directions.clone()),
            ["api_keys", "weather"] => Some(self.api_keys.weather.clone()),
            ["api_keys", "reverse_geocode"] => Some(self.api_keys.reverse_geocode.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "fallback_location"] => {
                self.defaults.fallback_location = value.to_string();
            }
            ["defaults", "reverse_geocode_timeout_secs"] => {
                self.defaults.reverse_geocode_timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }
            ["defaults", "search_limit"] => {
                self.defaults.search_limit = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid search limit: {}", value))
                })?;
            }
            ["defaults", "nearby_radius_m"] => {
                self.defaults.nearby_radius_m = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid radius value: {}", value))
                })?;
            }
            ["defaults", "nearby_limit"] => {
                self.defaults.nearby_limit = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid nearby limit: {}", value))
                })?;
            }
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["endpoints", "nominatim"] => self.endpoints.nominatim = value.to_string(),
            ["endpoints", "reverse_geocode"] => self.endpoints.reverse_geocode = value.to_string(),
            ["endpoints", "directions"] => self.endpoints.directions = value.to_string(),
            ["endpoints", "weather"] => self.endpoints.weather = value.to_string(),
            ["endpoints", "wiki_rest"] => self.endpoints.wiki_rest = value.to_string(),
            ["endpoints", "wiki_api"] => self.endpoints.wiki_api = value.to_string(),

            ["url", "default"] => {
                self.url.default = value.to_string();
            }
            ["url", "directions"] => {
                self.url.directions = value.to_string();
            }

            ["api_keys", "directions"] => self.api_keys.directions = value.to_string(),
            ["api_keys", "weather"] => self.api_keys.weather = value.to_string(),
            ["api_keys", "reverse_geocode"] => self.api_keys.reverse_geocode = value.to_string(),

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.fallback_location",
            "defaults.reverse_geocode_timeout_secs",
            "defaults.search_limit",
            "defaults.nearby_radius_m",
            "defaults.nearby_limit",
            "defaults.format",
            "server.host",
            "server.port",
            "endpoints.nominatim",
            "endpoints.reverse_geocode",
            "endpoints.directions",
            "endpoints.weather",
            "endpoints.wiki_rest",
            "endpoints.wiki_api",
            "url.default",
            "url.directions",
            "api_keys.directions",
            "api_keys.weather",
            "api_keys.reverse_geocode",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Format a directions share link between two (lat, lng) points
    pub fn format_directions_url(&self, from: (f64, f64), to: (f64, f64)) -> String {
        self.url
            .directions
            .replace("{from_lat}", &from.0.to_string())
            .replace("{from_lng}", &from.1.to_string())
            .replace("{to_lat}", &to.0.to_string())
            .replace("{to_lng}", &to.1.to_string())
    }

    /// Reverse geocoding timeout
    pub fn reverse_geocode_timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.reverse_geocode_timeout_secs)
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    fn with_temp_config<F: FnOnce()>(f: F) {
        let temp_dir = TempDir::new().unwrap();
        env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        f();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.defaults.fallback_location, "Dubai");
        assert_eq!(config.defaults.search_limit, 5);
        assert_eq!(config.server.port, 5000);
        assert!(config.api_keys.directions.is_empty());
        assert_eq!(config.endpoints.nominatim, api::NOMINATIM_URL);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("defaults.format"), Some("text".to_string()));

        config.set("defaults.format", "json").unwrap();
        assert_eq!(config.get("defaults.format"), Some("json".to_string()));

        config.set("defaults.nearby_radius_m", "2500").unwrap();
        assert_eq!(config.defaults.nearby_radius_m, 2500);

        config.set("endpoints.weather", "http://localhost:9000").unwrap();
        assert_eq!(config.get("endpoints.weather"), Some("http://localhost:9000".to_string()));
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("server.port", "not_a_port").is_err());
        assert!(config.set("defaults.search_limit", "-1").is_err());
    }

    #[test]
    fn test_every_available_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} not readable", key);
        }
    }

    #[test]
    fn test_apply_env_overrides_keys() {
        let mut config = Config::default();
        config.api_keys.weather = "from-file".to_string();

        config.apply_env(|name| match name {
            "ORS_API_KEY" => Some("ors-secret".to_string()),
            "OPENWEATHER_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.api_keys.directions, "ors-secret");
        assert_eq!(config.api_keys.weather, "from-file");
        assert!(config.api_keys.reverse_geocode.is_empty());
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config.format_url(Some("google"), 48.8566, 2.3522).unwrap();
        assert_eq!(url, "https://www.google.com/maps/@48.8566,2.3522,15z");

        let url = config.format_url(None, 48.8566, 2.3522).unwrap();
        assert!(url.contains("openstreetmap.org"));

        assert!(config.format_url(Some("unknown"), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_format_directions_url() {
        let config = Config::default();
        let url = config.format_directions_url((48.85, 2.35), (51.5, -0.12));
        assert_eq!(
            url,
            "https://www.openstreetmap.org/directions?route=48.85,2.35;51.5,-0.12"
        );
    }

    #[test]
    fn test_save_and_load() {
        with_temp_config(|| {
            let mut config = Config::default();
            config.defaults.fallback_location = "Lisbon".to_string();
            config.server.port = 8080;
            config.save().unwrap();

            let loaded = Config::load_file().unwrap();
            assert_eq!(loaded.defaults.fallback_location, "Lisbon");
            assert_eq!(loaded.server.port, 8080);
        });
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[defaults]"));
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[endpoints]"));
        assert!(toml.contains("[url.providers]"));

        let loaded: Config = toml::from_str(&toml).unwrap();
        assert_eq!(loaded.server.port, 5000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(loaded.server.port, 9000);
        assert_eq!(loaded.server.host, "127.0.0.1");
        assert_eq!(loaded.defaults.nearby_limit, 10);
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:5000");
    }
}
