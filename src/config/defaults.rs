//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Place used when reverse geocoding gives no answer
pub const DEFAULT_FALLBACK_LOCATION: &str = "Dubai";

/// Reverse geocoding gives up after this many seconds
pub const DEFAULT_REVERSE_TIMEOUT_SECS: u64 = 5;

/// Number of search results requested from the place search
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Radius in meters for nearby hospitals and notable places
pub const DEFAULT_NEARBY_RADIUS_M: u32 = 10_000;

/// Maximum nearby places per category
pub const DEFAULT_NEARBY_LIMIT: usize = 10;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Default template for directions share links
pub const DEFAULT_DIRECTIONS_URL: &str =
    "https://www.openstreetmap.org/directions?route={from_lat},{from_lng};{to_lat},{to_lng}";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "place-explorer";

/// Environment variable holding the directions API key
pub const ENV_DIRECTIONS_KEY: &str = "ORS_API_KEY";

/// Environment variable holding the weather API key
pub const ENV_WEATHER_KEY: &str = "OPENWEATHER_API_KEY";

/// Environment variable holding the reverse geocoding API key
pub const ENV_REVERSE_GEOCODE_KEY: &str = "OPENCAGE_API_KEY";
