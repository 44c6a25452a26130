//! Saved places
//!
//! File-backed store of named places, each with its own visit history and
//! favorite locations. Stored as pretty JSON in the XDG data directory
//! (~/.local/share/place-explorer/places.json).

use crate::config::defaults::APP_DIR_NAME;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const STORE_FILE_NAME: &str = "places.json";

/// A recorded visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationVisit {
    pub longitude: f64,
    pub latitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// A favorite location attached to a stored place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub name: String,
}

/// A saved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlace {
    pub id: String,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub location_history: Vec<LocationVisit>,
    #[serde(default)]
    pub favorite_locations: Vec<FavoriteLocation>,
}

/// Body for creating a place
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    #[serde(default)]
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Body for recording a visit; timestamp defaults to now
#[derive(Debug, Clone, Deserialize)]
pub struct NewVisit {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Body for adding a favorite location
#[derive(Debug, Clone, Deserialize)]
pub struct NewFavorite {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub name: String,
}

fn check_coordinates(longitude: f64, latitude: f64) -> Result<()> {
    if !(longitude.is_finite() && (-180.0..=180.0).contains(&longitude)) {
        return Err(Error::InvalidPlace(format!("Invalid longitude: {}", longitude)));
    }
    if !(latitude.is_finite() && (-90.0..=90.0).contains(&latitude)) {
        return Err(Error::InvalidPlace(format!("Invalid latitude: {}", latitude)));
    }
    Ok(())
}

/// Place store manager
#[derive(Debug)]
pub struct PlaceStore {
    places: Vec<StoredPlace>,
    path: PathBuf,
}

impl PlaceStore {
    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine data directory".to_string()))
    }

    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join(STORE_FILE_NAME))
    }

    /// Load the store from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(Self::store_path()?)
    }

    /// Load the store from a specific file; a missing file is an empty store
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let places = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Store(format!("Failed to read place store: {}", e)))?;

            serde_json::from_str(&content)
                .map_err(|e| Error::Store(format!("Failed to parse place store: {}", e)))?
        } else {
            Vec::new()
        };

        Ok(Self { places, path })
    }

    /// Write the store to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Store(format!("Failed to create data directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(&self.places)
            .map_err(|e| Error::Store(format!("Failed to serialize place store: {}", e)))?;

        fs::write(&self.path, content)
            .map_err(|e| Error::Store(format!("Failed to write place store: {}", e)))?;

        Ok(())
    }

    /// Apply a change and persist it
    ///
    /// If the change or the write fails, the in-memory places are restored.
    pub fn commit<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let before = self.places.clone();
        let result = change(self).and_then(|value| self.save().map(|()| value));
        if result.is_err() {
            self.places = before;
        }
        result
    }

    pub fn list(&self) -> &[StoredPlace] {
        &self.places
    }

    pub fn get(&self, id: &str) -> Option<&StoredPlace> {
        self.places.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut StoredPlace> {
        self.places
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Place not found: {}", id)))
    }

    /// Create a place; the name is required
    pub fn create(&mut self, new: NewPlace) -> Result<&StoredPlace> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidPlace("Place name is required".to_string()));
        }
        check_coordinates(new.longitude, new.latitude)?;

        self.places.push(StoredPlace {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            longitude: new.longitude,
            latitude: new.latitude,
            location_history: Vec::new(),
            favorite_locations: Vec::new(),
        });
        Ok(&self.places[self.places.len() - 1])
    }

    /// Append a visit to a place's history
    pub fn add_visit(&mut self, id: &str, visit: NewVisit) -> Result<&StoredPlace> {
        check_coordinates(visit.longitude, visit.latitude)?;
        let place = self.get_mut(id)?;
        place.location_history.push(LocationVisit {
            longitude: visit.longitude,
            latitude: visit.latitude,
            timestamp: visit.timestamp.unwrap_or_else(Utc::now),
        });
        Ok(place)
    }

    /// Attach a favorite location to a place
    pub fn add_favorite(&mut self, id: &str, favorite: NewFavorite) -> Result<&StoredPlace> {
        check_coordinates(favorite.longitude, favorite.latitude)?;
        let place = self.get_mut(id)?;
        place.favorite_locations.push(FavoriteLocation {
            id: Uuid::new_v4().to_string(),
            longitude: favorite.longitude,
            latitude: favorite.latitude,
            name: favorite.name,
        });
        Ok(place)
    }

    /// Drop a favorite location; unknown favorite ids are ignored
    pub fn remove_favorite(&mut self, id: &str, favorite_id: &str) -> Result<&StoredPlace> {
        let place = self.get_mut(id)?;
        place.favorite_locations.retain(|f| f.id != favorite_id);
        Ok(place)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}
