//! Error types for place-explorer

use crate::directions::DirectionsError;
use thiserror::Error;

/// Main error type for place-explorer operations
#[derive(Error, Debug)]
pub enum Error {
    /// Search response was not a well-formed feature collection
    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error(transparent)]
    Directions(#[from] DirectionsError),

    #[error("Invalid place: {0}")]
    InvalidPlace(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for place-explorer operations
pub type Result<T> = std::result::Result<T, Error>;
