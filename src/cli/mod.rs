//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod geocode;
pub mod nearby;
pub mod serve;
pub mod status;

use crate::config::Config;
use crate::error::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Tattoo shop directory: geocoding jobs and proximity search
#[derive(Parser)]
#[command(name = "inkdex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database URL (overrides database.url from the config file)
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in missing coordinates for cities or listings
    Geocode(geocode::GeocodeArgs),

    /// Search for shops near a point or zip code
    Nearby(nearby::NearbyArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show database and geocoding coverage
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Geocode(args) => geocode::run(args, cli.database).await,
        Commands::Nearby(args) => nearby::run(args, cli.database).await,
        Commands::Serve(args) => serve::run(args, cli.database).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args, cli.database).await,
    }
}

/// Initialize logging to stderr, filtered by RUST_LOG (default "info")
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the config file and apply the --database override
pub(crate) fn load_config(database: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(url) = database {
        config.database.url = url;
    }
    Ok(config)
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
    fn test_parse_geocode() {
        let cli = Cli::try_parse_from(["inkdex", "geocode", "addresses", "--limit", "10"]).unwrap();
        match cli.command {
            Commands::Geocode(args) => {
                assert_eq!(args.target, geocode::GeocodeTarget::Addresses);
                assert_eq!(args.limit, Some(10));
            }
            _ => panic!("expected geocode"),
        }
    }

    #[test]
    fn test_parse_global_database() {
        let cli = Cli::try_parse_from([
            "inkdex",
            "nearby",
            "--zip",
            "78701",
            "--database",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(cli.database.as_deref(), Some("sqlite::memory:"));
    }

    #[test]
    fn test_nearby_location_conflicts() {
        assert!(Cli::try_parse_from(["inkdex", "nearby", "--zip", "78701", "--lat", "30.0"]).is_err());
    }
}
