//! Explore command handler
//!
//! Searches, selects one result, waits for every enrichment lookup and
//! prints the place with its map plan.

use crate::cli::OutputArgs;
use crate::config::Config;
use crate::enrichment::Enricher;
use crate::error::{Error, Result};
use crate::format::Report;
use crate::geo::get_geocoder;
use crate::session::Session;
use clap::Args;
use tracing::debug;

/// Explore command arguments
#[derive(Args)]
pub struct ExploreArgs {
    /// Free-text place name
    pub term: String,

    /// Which search result to select (1-based)
    #[arg(long, short = 'i', default_value = "1")]
    pub index: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the explore command
pub async fn run(args: ExploreArgs) -> Result<()> {
    if args.output.handled_listing() {
        return Ok(());
    }

    let config = Config::load()?;
    let geocoder = get_geocoder(&config);
    let enricher = Enricher::from_config(&config);

    let mut session = Session::new();
    let results = session.search(&geocoder, &args.term).await?;

    let place = args
        .index
        .checked_sub(1)
        .and_then(|i| results.get(i))
        .cloned()
        .ok_or_else(|| {
            Error::NotFound(format!(
                "No result #{} for \"{}\" ({} found)",
                args.index,
                args.term,
                results.len()
            ))
        })?;

    let selection = session.select(place.clone());
    let mut updates = enricher.dispatch(&place, selection.generation);
    while let Some(update) = updates.recv().await {
        debug!(kind = update.payload.kind(), "Enrichment arrived");
        session.apply_enrichment(update);
    }

    let report = Report::Exploration {
        place,
        enrichment: session.enrichment().clone(),
        plan: session.render_plan(),
    };
    args.output.emit(&report, &config)
}
