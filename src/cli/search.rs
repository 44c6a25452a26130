//! Search command handler

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::error::Result;
use crate::format::Report;
use crate::geo::get_geocoder;
use crate::session::Session;
use clap::Args;

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text place name
    pub term: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the search command
pub async fn run(args: SearchArgs) -> Result<()> {
    if args.output.handled_listing() {
        return Ok(());
    }

    let config = Config::load()?;
    let geocoder = get_geocoder(&config);

    let mut session = Session::new();
    let places = session.search(&geocoder, &args.term).await?.to_vec();

    let report = Report::Places {
        term: args.term,
        places,
    };
    args.output.emit(&report, &config)
}
