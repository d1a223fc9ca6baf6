//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/inkdex/config.toml

pub mod defaults;

use crate::constants::pacing::MIN_ADDRESS_DELAY;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Proximity search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Geocoding providers and job pacing
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Proximity search defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Radius in miles when the request gives none
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,

    /// Listings per page
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

/// Geocoding providers and job pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// User-Agent sent with every provider request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Zip lookup base URL
    #[serde(default = "default_zip_url")]
    pub zip_url: String,

    /// Address search base URL
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Zip lookup timeout in seconds
    #[serde(default = "default_zip_timeout_secs")]
    pub zip_timeout_secs: u64,

    /// Address search timeout in seconds
    #[serde(default = "default_address_timeout_secs")]
    pub address_timeout_secs: u64,

    /// Delay between zip lookups in milliseconds
    #[serde(default = "default_zip_delay_ms")]
    pub zip_delay_ms: u64,

    /// Delay between address lookups in milliseconds (never below 1100)
    #[serde(default = "default_address_delay_ms")]
    pub address_delay_ms: u64,

    /// Log progress every N records
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

// Default value functions for serde
fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_radius_miles() -> f64 {
    DEFAULT_RADIUS_MILES
}
fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_zip_url() -> String {
    DEFAULT_ZIP_URL.to_string()
}
fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}
fn default_zip_timeout_secs() -> u64 {
    DEFAULT_ZIP_TIMEOUT_SECS
}
fn default_address_timeout_secs() -> u64 {
    DEFAULT_ADDRESS_TIMEOUT_SECS
}
fn default_zip_delay_ms() -> u64 {
    DEFAULT_ZIP_DELAY_MS
}
fn default_address_delay_ms() -> u64 {
    DEFAULT_ADDRESS_DELAY_MS
}
fn default_progress_every() -> usize {
    DEFAULT_PROGRESS_EVERY
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_miles: default_radius_miles(),
            per_page: default_per_page(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            zip_url: default_zip_url(),
            nominatim_url: default_nominatim_url(),
            zip_timeout_secs: default_zip_timeout_secs(),
            address_timeout_secs: default_address_timeout_secs(),
            zip_delay_ms: default_zip_delay_ms(),
            address_delay_ms: default_address_delay_ms(),
            progress_every: default_progress_every(),
        }
    }
}

impl GeocodingConfig {
    /// Delay between zip lookups
    pub fn zip_delay(&self) -> Duration {
        Duration::from_millis(self.zip_delay_ms)
    }

    /// Delay between address lookups, raised to the provider's floor
    pub fn address_delay(&self) -> Duration {
        let configured = Duration::from_millis(self.address_delay_ms);
        if configured < MIN_ADDRESS_DELAY {
            warn!(
                "geocoding.address_delay_ms = {} is below the provider limit, using {}",
                self.address_delay_ms,
                MIN_ADDRESS_DELAY.as_millis()
            );
            MIN_ADDRESS_DELAY
        } else {
            configured
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path
    ///
    /// Creates default config there if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["database", "url"] => Some(self.database.url.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["search", "radius_miles"] => Some(self.search.radius_miles.to_string()),
            ["search", "per_page"] => Some(self.search.per_page.to_string()),

            ["geocoding", "user_agent"] => Some(self.geocoding.user_agent.clone()),
            ["geocoding", "zip_url"] => Some(self.geocoding.zip_url.clone()),
            ["geocoding", "nominatim_url"] => Some(self.geocoding.nominatim_url.clone()),
            ["geocoding", "zip_timeout_secs"] => Some(self.geocoding.zip_timeout_secs.to_string()),
            ["geocoding", "address_timeout_secs"] => {
                Some(self.geocoding.address_timeout_secs.to_string())
            }
            ["geocoding", "zip_delay_ms"] => Some(self.geocoding.zip_delay_ms.to_string()),
            ["geocoding", "address_delay_ms"] => Some(self.geocoding.address_delay_ms.to_string()),
            ["geocoding", "progress_every"] => Some(self.geocoding.progress_every.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
        }

        match parts.as_slice() {
            ["database", "url"] => {
                self.database.url = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse(key, value)?;
            }

            ["search", "radius_miles"] => {
                let radius: f64 = parse(key, value)?;
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(Error::Config(format!("Radius must be positive: {}", value)));
                }
                self.search.radius_miles = radius;
            }
            ["search", "per_page"] => {
                let per_page: usize = parse(key, value)?;
                if per_page == 0 {
                    return Err(Error::Config("per_page must be at least 1".to_string()));
                }
                self.search.per_page = per_page;
            }

            ["geocoding", "user_agent"] => {
                self.geocoding.user_agent = value.to_string();
            }
            ["geocoding", "zip_url"] => {
                self.geocoding.zip_url = value.to_string();
            }
            ["geocoding", "nominatim_url"] => {
                self.geocoding.nominatim_url = value.to_string();
            }
            ["geocoding", "zip_timeout_secs"] => {
                self.geocoding.zip_timeout_secs = parse(key, value)?;
            }
            ["geocoding", "address_timeout_secs"] => {
                self.geocoding.address_timeout_secs = parse(key, value)?;
            }
            ["geocoding", "zip_delay_ms"] => {
                self.geocoding.zip_delay_ms = parse(key, value)?;
            }
            ["geocoding", "address_delay_ms"] => {
                self.geocoding.address_delay_ms = parse(key, value)?;
            }
            ["geocoding", "progress_every"] => {
                self.geocoding.progress_every = parse(key, value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "database.url",
            "server.host",
            "server.port",
            "search.radius_miles",
            "search.per_page",
            "geocoding.user_agent",
            "geocoding.zip_url",
            "geocoding.nominatim_url",
            "geocoding.zip_timeout_secs",
            "geocoding.address_timeout_secs",
            "geocoding.zip_delay_ms",
            "geocoding.address_delay_ms",
            "geocoding.progress_every",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
