//! Geocoding module
//!
//! Turns zip codes and free-text addresses into coordinates.
//!
//! Both clients swallow every failure (timeout, bad status, malformed or
//! non-numeric payload) and return `None`; callers decide what to log.

pub mod nominatim;
pub mod zippopotam;

use crate::config::GeocodingConfig;
use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A geocoded location result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Place name reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    /// Region (state) abbreviation reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_abbr: Option<String>,
}

impl GeoLocation {
    /// Create a result with coordinates only
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            place_name: None,
            region_abbr: None,
        }
    }

    /// The coordinate part of the result
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Trait for geocoding backends
///
/// Implementations must be thread-safe (Send + Sync) to work with the async server.
pub trait Geocoder: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &'static str;

    /// Geocode a query to coordinates
    ///
    /// Returns the best match, or None on any failure or no match
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Option<GeoLocation>> + Send;
}

/// Parse a pair of numeric strings into validated coordinates
pub(crate) fn parse_coords(lat: &str, lng: &str) -> Result<Coordinates> {
    let lat: f64 = lat.trim().parse().map_err(|_| {
        crate::error::Error::Geocoding(format!("Invalid latitude: {}", lat))
    })?;
    let lng: f64 = lng.trim().parse().map_err(|_| {
        crate::error::Error::Geocoding(format!("Invalid longitude: {}", lng))
    })?;
    let coords = Coordinates::new(lat, lng);
    coords.validate()?;
    Ok(coords)
}

/// Get the zip-code geocoder described by the config
pub fn get_zip_geocoder(config: &GeocodingConfig) -> Result<zippopotam::ZippopotamGeocoder> {
    zippopotam::ZippopotamGeocoder::from_config(config)
}

/// Get the address geocoder described by the config
pub fn get_address_geocoder(config: &GeocodingConfig) -> Result<nominatim::NominatimGeocoder> {
    nominatim::NominatimGeocoder::from_config(config)
}

/// Look up a zip code with the configured provider
///
/// None on any failure, including a client that cannot be built.
pub async fn geocode_zip(config: &GeocodingConfig, zip: &str) -> Option<GeoLocation> {
    match get_zip_geocoder(config) {
        Ok(geocoder) => geocoder.geocode(zip).await,
        Err(e) => {
            debug!(error = %e, "zip geocoder unavailable");
            None
        }
    }
}

/// Search for a street address with the configured provider
///
/// One request, no pacing. Batch callers should use the address job instead.
pub async fn geocode_address(config: &GeocodingConfig, address: &str) -> Option<GeoLocation> {
    match get_address_geocoder(config) {
        Ok(geocoder) => geocoder.geocode(address).await,
        Err(e) => {
            debug!(error = %e, "address geocoder unavailable");
            None
        }
    }
}
