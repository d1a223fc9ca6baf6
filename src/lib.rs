//! inkdex: geospatial search and geocoding for a tattoo-shop directory
//!
//! A library and CLI tool that fills in missing coordinates for cities and
//! listings, then answers "which shops are near here?" queries.
//!
//! ## Features
//!
//! - Haversine distance and a bounding-box pre-filter
//! - Zip-code (Zippopotam) and address (Nominatim) geocoding clients
//! - Rate-limited batch geocoding jobs
//! - Proximity search with category, price and walk-in filters
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use inkdex::coord::{bounding_box, distance_miles};
//!
//! // Austin to Round Rock
//! let miles = distance_miles(30.2672, -97.7431, 30.5083, -97.6789);
//! assert!(miles > 15.0 && miles < 18.0);
//!
//! // Pre-filter box for a 50 mile search around Austin
//! let bbox = bounding_box(30.2672, -97.7431, 50.0);
//! assert!(bbox.contains(30.5083, -97.6789));
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod format;
pub mod geo;
pub mod jobs;
pub mod search;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use geo::{GeoLocation, Geocoder};
pub use jobs::JobReport;
pub use search::{search_nearby, NearbyQuery, NearbyResults};
