//! Centralized constants for the inkdex crate
//!
//! Values shared by the geometry, geocoding and search modules.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in miles, as used by the haversine distance
    pub const EARTH_RADIUS_MILES: f64 = 3958.8;
}

/// External API endpoints
pub mod api {
    /// Zippopotam.us zip-code lookup (free, no key required)
    pub const ZIPPOPOTAM_URL: &str = "https://api.zippopotam.us";

    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Country the address search is restricted to
    pub const COUNTRY_CODE: &str = "us";
}

/// Geocoding job pacing
pub mod pacing {
    use std::time::Duration;

    /// Courtesy delay between zip lookups
    pub const ZIP_DELAY: Duration = Duration::from_millis(200);

    /// Nominatim allows one request per second; this keeps a margin
    pub const MIN_ADDRESS_DELAY: Duration = Duration::from_millis(1100);

    /// How often the address job reports progress
    pub const PROGRESS_EVERY: usize = 100;
}

/// Search defaults
pub mod search {
    /// Radius used when the caller gives none
    pub const DEFAULT_RADIUS_MILES: f64 = 50.0;

    /// Listings per results page
    pub const DEFAULT_PER_PAGE: usize = 12;

    /// How many nearby cities are returned as a hint
    pub const NEAREST_CITIES: usize = 5;
}
