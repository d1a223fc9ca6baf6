//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, pacing, search};

/// Default database URL (SQLite file in the working directory)
pub const DEFAULT_DATABASE_URL: &str = "sqlite:inkdex.db?mode=rwc";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7979;

/// Default search radius in miles
pub const DEFAULT_RADIUS_MILES: f64 = search::DEFAULT_RADIUS_MILES;

/// Default results per page
pub const DEFAULT_PER_PAGE: usize = search::DEFAULT_PER_PAGE;

/// User-Agent sent to the geocoding providers
pub const DEFAULT_USER_AGENT: &str = concat!(
    "inkdex/",
    env!("CARGO_PKG_VERSION"),
    " (tattoo shop directory geocoder)"
);

/// Zip lookup base URL
pub const DEFAULT_ZIP_URL: &str = api::ZIPPOPOTAM_URL;

/// Address search base URL
pub const DEFAULT_NOMINATIM_URL: &str = api::NOMINATIM_URL;

/// Zip lookup timeout in seconds
pub const DEFAULT_ZIP_TIMEOUT_SECS: u64 = 5;

/// Address search timeout in seconds
pub const DEFAULT_ADDRESS_TIMEOUT_SECS: u64 = 10;

/// Delay between zip lookups in milliseconds
pub const DEFAULT_ZIP_DELAY_MS: u64 = pacing::ZIP_DELAY.as_millis() as u64;

/// Delay between address lookups in milliseconds
pub const DEFAULT_ADDRESS_DELAY_MS: u64 = pacing::MIN_ADDRESS_DELAY.as_millis() as u64;

/// Progress report interval for the address job
pub const DEFAULT_PROGRESS_EVERY: usize = pacing::PROGRESS_EVERY;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "inkdex";
