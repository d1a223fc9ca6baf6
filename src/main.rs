//! inkdex CLI entry point
//!
//! Tattoo shop directory geocoding and proximity search - CLI + JSON API

use inkdex::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
