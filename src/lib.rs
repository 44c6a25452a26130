//! place-explorer: Place Search and Map Composition
//!
//! A library and CLI tool for finding places, enriching them with weather,
//! Wikipedia summaries and nearby points of interest, and turning the
//! result into a render plan for a map widget.
//!
//! ## Features
//!
//! - Free-text place search and geocoding (Nominatim)
//! - Concurrent enrichment with stale-result protection
//! - Boundary overlays and viewport selection
//! - Turn-by-turn directions (OpenRouteService)
//! - Saved places with visit history
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use place_explorer::compose::Viewport;
//! use place_explorer::{LonLat, Place, Session};
//!
//! let mut session = Session::new();
//! session.apply_search(
//!     "Paris",
//!     vec![Place::new("Paris, France", "city, Paris, France", LonLat::new(2.3522, 48.8566))],
//! );
//! assert!(matches!(session.render_plan().viewport, Viewport::Placeholder { .. }));
//!
//! let place = session.search_results()[0].clone();
//! session.select(place);
//! let plan = session.render_plan();
//! assert!(matches!(plan.viewport, Viewport::Center { zoom: 10, .. }));
//! assert_eq!(plan.markers.len(), 1);
//! ```

pub mod cli;
pub mod compose;
pub mod config;
pub mod constants;
pub mod directions;
pub mod enrichment;
pub mod error;
pub mod format;
pub mod geo;
pub mod place;
pub mod server;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use compose::RenderPlan;
pub use config::Config;
pub use directions::RouteResult;
pub use error::{Error, Result};
pub use place::{LonLat, Place};
pub use session::Session;
