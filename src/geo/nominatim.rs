//! Nominatim geocoding backend (OpenStreetMap)
//!
//! Street-level address search restricted to the US.
//! Rate limit: 1 request per second, and a descriptive User-Agent is required.
//! The backend does not throttle itself; the address job paces its calls.

use crate::config::GeocodingConfig;
use crate::constants::api::COUNTRY_CODE;
use crate::error::{Error, Result};
use crate::geo::{parse_coords, GeoLocation, Geocoder};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Nominatim geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim search response item
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    /// Create a backend against `base_url` with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
        if user_agent.trim().is_empty() {
            return Err(Error::Config(
                "Nominatim requires a descriptive User-Agent".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a backend from the geocoding config section
    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        Self::new(
            &config.nominatim_url,
            Duration::from_secs(config.address_timeout_secs),
            &config.user_agent,
        )
    }

    /// Search for an address, surfacing the reason for a failure
    pub async fn search(&self, address: &str) -> Result<Option<GeoLocation>> {
        if address.trim().is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/search?q={}&format=json&limit=1&countrycodes={}",
            self.base_url,
            urlencoding::encode(address),
            COUNTRY_CODE
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Nominatim returned status: {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Nominatim response: {}", e)))?;

        if let Some(result) = results.into_iter().next() {
            let coords = parse_coords(&result.lat, &result.lon)?;
            Ok(Some(GeoLocation {
                lat: coords.lat,
                lng: coords.lng,
                place_name: result.display_name,
                region_abbr: None,
            }))
        } else {
            Ok(None)
        }
    }
}

impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, address: &str) -> Option<GeoLocation> {
        match self.search(address).await {
            Ok(result) => result,
            Err(e) => {
                debug!(address, error = %e, "address lookup failed");
                None
            }
        }
    }
}
