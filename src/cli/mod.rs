//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod directions;
pub mod explore;
pub mod places;
pub mod reverse;
pub mod search;
pub mod serve;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, url::UrlFormatter, Report};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Place search, map composition and directions
#[derive(Parser)]
#[command(name = "place-explorer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for places by name
    Search(search::SearchArgs),

    /// Search, select a result and show everything known about it
    Explore(explore::ExploreArgs),

    /// Turn-by-turn directions between two places
    Directions(directions::DirectionsArgs),

    /// Name the place at a coordinate
    Reverse(reverse::ReverseArgs),

    /// Manage saved places
    Places(places::PlacesArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Output options shared by every command that prints a report
#[derive(Args)]
pub struct OutputArgs {
    /// Output format (json, text, gpx, url)
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Map provider for url output
    #[arg(long)]
    pub provider: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

impl OutputArgs {
    /// Format a report and write it to stdout or the output file
    pub fn emit(&self, report: &Report, config: &Config) -> Result<()> {
        let format = self.format.clone().unwrap_or_else(|| config.defaults.format.clone());

        let output = if format.eq_ignore_ascii_case("url") && self.provider.is_some() {
            UrlFormatter.format_with_provider(report, config, self.provider.as_deref())?
        } else {
            let formatter = get_formatter(&format)
                .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;
            formatter.format(report, config)?
        };

        if let Some(path) = &self.output {
            std::fs::write(path, &output)?;
            eprintln!("Output written to {}", path);
        } else {
            println!("{}", output.trim_end());
        }

        Ok(())
    }

    /// Print formats and return true if `--list-formats` was given
    pub fn handled_listing(&self) -> bool {
        if self.list_formats {
            println!("Available output formats:");
            for format in available_formats() {
                println!("  {:6} - {}", format.name, format.description);
            }
        }
        self.list_formats
    }
}

/// Install the tracing subscriber; logs go to stderr
fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    });

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Explore(args) => explore::run(args).await,
        Commands::Directions(args) => directions::run(args).await,
        Commands::Reverse(args) => reverse::run(args).await,
        Commands::Places(args) => places::run(args),
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["place-explorer", "reverse", "--lat", "-33.86", "--lon", "151.2"]).unwrap();
        match cli.command {
            Commands::Reverse(args) => assert_eq!(args.lat, -33.86),
            _ => panic!("expected reverse"),
        }
    }

    #[test]
    fn test_explore_default_index() {
        let cli = Cli::try_parse_from(["place-explorer", "explore", "Paris"]).unwrap();
        match cli.command {
            Commands::Explore(args) => assert_eq!(args.index, 1),
            _ => panic!("expected explore"),
        }
    }
}
