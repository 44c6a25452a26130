//! Reverse geocoding command handler

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::error::Result;
use crate::format::Report;
use crate::geo::get_reverse_geocoder;
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the reverse command
pub async fn run(args: ReverseArgs) -> Result<()> {
    if args.output.handled_listing() {
        return Ok(());
    }

    let config = Config::load()?;
    let geocoder = get_reverse_geocoder(&config);

    let name = geocoder.reverse_geocode(args.lat, args.lon).await;
    let report = Report::Location {
        name,
        lat: args.lat,
        lon: args.lon,
    };
    args.output.emit(&report, &config)
}
