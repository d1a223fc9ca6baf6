//! Geocode command handler
//!
//! Runs one of the batch geocoding jobs against the configured database.

use crate::error::{Error, Result};
use crate::format::get_formatter;
use crate::geo::{get_address_geocoder, get_zip_geocoder};
use crate::jobs::{geocode_cities, geocode_listings, JobOptions};
use crate::store;
use clap::{Args, ValueEnum};

/// Which records to geocode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GeocodeTarget {
    /// Cities without coordinates, via a listing's zip code
    Zips,
    /// Listings without coordinates, via their street address (1 request/second)
    Addresses,
}

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    /// Records to geocode
    #[arg(value_enum)]
    pub target: GeocodeTarget,

    /// Process at most N records
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output format for the final report
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs, database: Option<String>) -> Result<()> {
    let config = super::load_config(database)?;
    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let pool = store::connect(&config.database.url).await?;

    let report = match args.target {
        GeocodeTarget::Zips => {
            let geocoder = get_zip_geocoder(&config.geocoding)?;
            let options = JobOptions::zip(&config.geocoding).with_limit(args.limit);
            geocode_cities(&pool, &geocoder, options).await?
        }
        GeocodeTarget::Addresses => {
            let geocoder = get_address_geocoder(&config.geocoding)?;
            let options = JobOptions::address(&config.geocoding).with_limit(args.limit);
            geocode_listings(&pool, &geocoder, options).await?
        }
    };

    println!("{}", formatter.format_report(&report)?.trim_end());
    Ok(())
}
