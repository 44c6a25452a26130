//! Directions command handler

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::directions::ors::OrsBackend;
use crate::directions::{DirectionsError, DirectionsWorkflow};
use crate::error::Result;
use crate::format::Report;
use crate::geo::get_geocoder;
use crate::session::{DirectionsPhase, Session};
use chrono::Local;
use clap::Args;

/// Directions command arguments
#[derive(Args)]
pub struct DirectionsArgs {
    /// Starting place name
    pub origin: String,

    /// Destination place name
    pub destination: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the directions command
pub async fn run(args: DirectionsArgs) -> Result<()> {
    if args.output.handled_listing() {
        return Ok(());
    }

    let config = Config::load()?;
    let workflow = DirectionsWorkflow::new(get_geocoder(&config), OrsBackend::from_config(&config));

    let mut session = Session::new();
    let departure = Local::now();

    match workflow.submit(&mut session, &args.origin, &args.destination).await {
        DirectionsPhase::Displaying { route } => {
            let report = Report::Route {
                origin: args.origin,
                destination: args.destination,
                route,
                departure,
            };
            args.output.emit(&report, &config)
        }
        DirectionsPhase::Failed { error } => Err(error.into()),
        _ => Err(DirectionsError::generic().into()),
    }
}
