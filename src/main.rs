//! place-explorer CLI entry point
//!
//! Place search, map composition and directions - CLI + web app

use place_explorer::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
