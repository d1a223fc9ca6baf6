//! Zippopotam.us zip-code geocoding backend
//!
//! Resolves a US zip code to the centroid of its place. City-level precision,
//! no key, no documented rate limit.

use crate::config::GeocodingConfig;
use crate::error::{Error, Result};
use crate::geo::{parse_coords, GeoLocation, Geocoder};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Zip-code geocoding backend
#[derive(Debug, Clone)]
pub struct ZippopotamGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Zippopotam lookup response
#[derive(Debug, Deserialize)]
struct ZipResponse {
    #[serde(default)]
    places: Vec<ZipPlace>,
}

#[derive(Debug, Deserialize)]
struct ZipPlace {
    latitude: String,
    longitude: String,
    #[serde(rename = "place name", default)]
    place_name: Option<String>,
    #[serde(rename = "state abbreviation", default)]
    state_abbreviation: Option<String>,
}

impl ZippopotamGeocoder {
    /// Create a backend against `base_url` with a request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self> {
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
            &config.zip_url,
            Duration::from_secs(config.zip_timeout_secs),
            &config.user_agent,
        )
    }

    /// Look up a zip code, surfacing the reason for a failure
    pub async fn lookup(&self, zip: &str) -> Result<Option<GeoLocation>> {
        let zip = zip.trim();
        if zip.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/us/{}", self.base_url, urlencoding::encode(zip));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Geocoding(format!("Zippopotam request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geocoding(format!(
                "Zippopotam returned status: {}",
                response.status()
            )));
        }

        let body: ZipResponse = response
            .json()
            .await
            .map_err(|e| Error::Geocoding(format!("Failed to parse Zippopotam response: {}", e)))?;

        let Some(place) = body.places.into_iter().next() else {
            return Ok(None);
        };

        let coords = parse_coords(&place.latitude, &place.longitude)?;
        Ok(Some(GeoLocation {
            lat: coords.lat,
            lng: coords.lng,
            place_name: place.place_name,
            region_abbr: place.state_abbreviation,
        }))
    }
}

impl Geocoder for ZippopotamGeocoder {
    fn name(&self) -> &'static str {
        "zippopotam"
    }

    async fn geocode(&self, zip: &str) -> Option<GeoLocation> {
        match self.lookup(zip).await {
            Ok(result) => result,
            Err(e) => {
                debug!(zip, error = %e, "zip lookup failed");
                None
            }
        }
    }
}
