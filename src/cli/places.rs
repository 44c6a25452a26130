//! Places command handler
//!
//! Manage the local store of saved places, their visits and favorites.

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::Report;
use crate::store::{NewFavorite, NewPlace, NewVisit, PlaceStore, StoredPlace};
use clap::{Args, Subcommand};

/// Places command arguments
#[derive(Args)]
pub struct PlacesArgs {
    #[command(subcommand)]
    pub command: PlacesCommand,
}

#[derive(Subcommand)]
pub enum PlacesCommand {
    /// List saved places
    List {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show one saved place
    Show {
        /// Place ID
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Save a new place
    Add {
        /// Place name
        name: String,

        #[command(flatten)]
        at: CoordArgs,
    },

    /// Record a visit to a saved place
    Visit {
        /// Place ID
        id: String,

        #[command(flatten)]
        at: CoordArgs,
    },

    /// Attach a favorite location to a saved place
    Favorite {
        /// Place ID
        id: String,

        /// Favorite name
        #[arg(long, default_value = "")]
        name: String,

        #[command(flatten)]
        at: CoordArgs,
    },

    /// Remove a favorite location
    Unfavorite {
        /// Place ID
        id: String,

        /// Favorite ID
        favorite_id: String,
    },
}

#[derive(Args)]
pub struct CoordArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,
}

/// Run the places command
pub fn run(args: PlacesArgs) -> Result<()> {
    let mut store = PlaceStore::load()?;

    match args.command {
        PlacesCommand::List { output } => {
            if store.is_empty() {
                println!("No saved places");
                return Ok(());
            }
            let config = Config::load()?;
            output.emit(&Report::Saved { places: store.list().to_vec() }, &config)
        }

        PlacesCommand::Show { id, output } => {
            let place = store
                .get(&id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("Place not found: {}", id)))?;
            let config = Config::load()?;
            output.emit(&Report::Saved { places: vec![place] }, &config)
        }

        PlacesCommand::Add { name, at } => {
            let id = store.commit(|s| {
                Ok(s.create(NewPlace {
                    name,
                    longitude: at.lon,
                    latitude: at.lat,
                })?
                .id
                .clone())
            })?;
            println!("Saved place {}", id);
            Ok(())
        }

        PlacesCommand::Visit { id, at } => {
            let place = store.commit(|s| {
                s.add_visit(
                    &id,
                    NewVisit {
                        longitude: at.lon,
                        latitude: at.lat,
                        timestamp: None,
                    },
                )
                .cloned()
            })?;
            println!("{}", summary(&place));
            Ok(())
        }

        PlacesCommand::Favorite { id, name, at } => {
            let place = store.commit(|s| {
                s.add_favorite(
                    &id,
                    NewFavorite {
                        longitude: at.lon,
                        latitude: at.lat,
                        name,
                    },
                )
                .cloned()
            })?;
            if let Some(favorite) = place.favorite_locations.last() {
                println!("Added favorite {}", favorite.id);
            }
            Ok(())
        }

        PlacesCommand::Unfavorite { id, favorite_id } => {
            let place = store.commit(|s| s.remove_favorite(&id, &favorite_id).cloned())?;
            println!("{}", summary(&place));
            Ok(())
        }
    }
}

fn summary(place: &StoredPlace) -> String {
    format!(
        "{} ({}): {} visits, {} favorites",
        place.name,
        place.id,
        place.location_history.len(),
        place.favorite_locations.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let place = StoredPlace {
            id: "abc".to_string(),
            name: "Home".to_string(),
            longitude: 0.0,
            latitude: 0.0,
            location_history: vec![],
            favorite_locations: vec![],
        };
        assert_eq!(summary(&place), "Home (abc): 0 visits, 0 favorites");
    }
}
