//! Status command handler
//!
//! Shows how much of the directory has coordinates, and optionally whether
//! the server is up.

use crate::config::Config;
use crate::error::Result;
use crate::store;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Check if server is running (tries to connect)
    #[arg(long)]
    pub server: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs, database: Option<String>) -> Result<()> {
    let config = super::load_config(database)?;

    if args.server {
        check_server_status(&config).await;
    }

    println!("inkdex v{}", env!("CARGO_PKG_VERSION"));
    println!("Database: {}", config.database.url);
    println!();

    let pool = store::connect(&config.database.url).await?;
    let coverage = store::coverage(&pool).await?;

    println!(
        "Cities:   {} ({} with coordinates, {})",
        coverage.cities,
        coverage.cities_geocoded,
        percent(coverage.cities_geocoded, coverage.cities)
    );
    println!(
        "Listings: {} ({} with coordinates, {})",
        coverage.listings,
        coverage.listings_geocoded,
        percent(coverage.listings_geocoded, coverage.listings)
    );

    Ok(())
}

fn percent(part: i64, whole: i64) -> String {
    if whole == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / whole as f64)
    }
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}
