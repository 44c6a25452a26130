//! Centralized constants for the place-explorer crate
//!
//! Values shared by the lookup clients, the session and the map composer.

/// Geographic constants
pub mod geo {
    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim (search, boundary polygons, nearby POIs)
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// OpenCage reverse geocoding
    pub const OPENCAGE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

    /// OpenRouteService driving directions
    pub const ORS_DIRECTIONS_URL: &str = "https://api.openrouteservice.org/v2/directions/driving-car";

    /// OpenWeather current conditions
    pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

    /// Weather icon images, `{icon}` is replaced by the icon code
    pub const OPENWEATHER_ICON_URL: &str = "https://openweathermap.org/img/wn/{icon}@2x.png";

    /// Wikipedia REST API (page summaries)
    pub const WIKI_REST_URL: &str = "https://en.wikipedia.org/api/rest_v1";

    /// MediaWiki action API (geosearch)
    pub const WIKI_API_URL: &str = "https://en.wikipedia.org/w/api.php";

    /// Nominatim usage policy requires an identifying User-Agent
    pub const USER_AGENT: &str = concat!("place-explorer/", env!("CARGO_PKG_VERSION"));
}

/// Map view settings
pub mod map {
    /// Zoom for places whose description reads like a city
    pub const CITY_ZOOM: u8 = 10;

    /// Zoom for everything else
    pub const DEFAULT_ZOOM: u8 = 12;

    /// Padding in pixels when fitting the viewport to a route
    pub const ROUTE_FIT_PADDING_PX: u32 = 50;

    /// Description fragments that mark a place as city-like for zooming
    pub const CITY_ZOOM_KEYWORDS: &[&str] = &["city"];

    /// Description fragments that make a boundary polygon worth fetching
    pub const BOUNDARY_KEYWORDS: &[&str] = &[
        "city",
        "capital",
        "town",
        "village",
        "region",
        "province",
        "state",
        "district",
        "municipality",
        "borough",
        "county",
        "emirate",
        "country",
        "territory",
        "island",
    ];
}

/// Session limits
pub mod session {
    /// Maximum number of places kept in the selection history
    pub const MAX_HISTORY_ENTRIES: usize = 100;

    /// Capacity of the session event channel
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
}

/// User-facing messages
pub mod messages {
    /// Directions could not resolve one of the endpoints
    pub const LOCATIONS_NOT_FOUND: &str = "Could not find one or both locations. Please check the names and try again.";

    /// Upstream routing refused because the route is too long
    pub const ROUTE_TOO_LONG: &str = "The route distance is too long. Please choose locations closer together.";

    /// Fallback when the routing service gives no usable message
    pub const DIRECTIONS_GENERIC: &str = "Unable to fetch directions. Please try again.";

    /// Fragment in the upstream error that signals the distance limit
    pub const DISTANCE_LIMIT_MARKER: &str = "exceed the server configuration limits";

    /// Shown when the encyclopedia has no extract for a place
    pub const NO_OVERVIEW: &str = "No overview available.";
}
