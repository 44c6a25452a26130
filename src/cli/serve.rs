//! Serve command handler
//!
//! Runs the session API in the foreground.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::{info, warn};

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,
}

/// Services that stay silent without a key
fn missing_keys(config: &Config) -> Vec<&'static str> {
    [
        ("directions", &config.api_keys.directions),
        ("weather", &config.api_keys.weather),
        ("reverse_geocode", &config.api_keys.reverse_geocode),
    ]
    .into_iter()
    .filter(|(_, key)| key.is_empty())
    .map(|(name, _)| name)
    .collect()
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    config.server.host = args.host.unwrap_or(config.server.host);
    config.server.port = args.port.unwrap_or(config.server.port);

    for name in missing_keys(&config) {
        warn!(service = name, "No API key configured; lookups will degrade");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        nominatim = %config.endpoints.nominatim,
        "place-explorer listening on {}",
        config.server_addr()
    );

    server::run(config).await
}
