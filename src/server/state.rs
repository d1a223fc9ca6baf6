//! Server shared state
//!
//! Holds configuration, the database pool and the zip geocoder used to
//! resolve `?zip=` searches.

use crate::config::Config;
use crate::error::Result;
use crate::geo::{get_zip_geocoder, zippopotam::ZippopotamGeocoder};
use sqlx::{Pool, Sqlite};

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// Database pool
    pub pool: Pool<Sqlite>,

    /// Zip lookups for searches given by postal code
    pub zip_geocoder: ZippopotamGeocoder,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, pool: Pool<Sqlite>) -> Result<Self> {
        let zip_geocoder = get_zip_geocoder(&config.geocoding)?;
        Ok(Self {
            config,
            pool,
            zip_geocoder,
        })
    }
}
