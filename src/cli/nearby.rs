//! Nearby command handler
//!
//! Runs the proximity search from the command line.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::geo::geocode_zip;
use crate::search::{search_nearby, NearbyQuery};
use crate::store::{self, ListingFilters};
use clap::Args;

/// Nearby command arguments
#[derive(Args)]
pub struct NearbyArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Zip code (geocoded to its centroid)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub zip: Option<String>,

    /// Search radius in miles
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,

    /// Style category slug
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Price range, e.g. "$$"
    #[arg(long)]
    pub price: Option<String>,

    /// Only shops that take walk-ins (true) or don't (false)
    #[arg(long)]
    pub walk_ins: Option<bool>,

    /// Page number (1-based)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Results per page
    #[arg(long)]
    pub per_page: Option<usize>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the nearby command
pub async fn run(args: NearbyArgs, database: Option<String>) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = super::load_config(database)?;
    let formatter = get_formatter(&args.format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", args.format)))?;

    let center = if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        Coordinates::new(lat, lng)
    } else if let Some(zip) = &args.zip {
        let location = geocode_zip(&config.geocoding, zip)
            .await
            .ok_or_else(|| Error::Geocoding(format!("Could not locate zip code {}", zip)))?;
        if let Some(place) = &location.place_name {
            eprintln!(
                "Searching near {}{}",
                place,
                location
                    .region_abbr
                    .as_ref()
                    .map(|r| format!(", {}", r))
                    .unwrap_or_default()
            );
        }
        location.coordinates()
    } else {
        return Err(Error::InvalidCoordinates(
            "No location specified. Use --lat/--lng or --zip".to_string(),
        ));
    };

    let query = NearbyQuery::new(center.lat, center.lng)
        .with_radius(args.radius.unwrap_or(config.search.radius_miles))
        .with_filters(ListingFilters {
            category: args.category,
            price: args.price,
            walk_ins: args.walk_ins,
        })
        .with_page(args.page, args.per_page.unwrap_or(config.search.per_page));

    let pool = store::connect(&config.database.url).await?;
    let results = search_nearby(&pool, &query).await?;

    println!("{}", formatter.format_results(&results)?.trim_end());
    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
