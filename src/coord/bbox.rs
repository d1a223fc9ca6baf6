//! Bounding-box pre-filter
//!
//! A lat/lng rectangle that encloses every point within a radius of a center.
//! The database can narrow candidates with plain range comparisons, then the
//! exact haversine distance removes the corner false positives.
//!
//! The box is computed from the spherical cap itself rather than a flat
//! miles-per-degree approximation, so it never excludes a point that is truly
//! inside the radius:
//! - latitude half-span is the angular radius `δ`
//! - longitude half-span is `asin(sin δ / cos φ)`, which widens toward the poles

use crate::constants::geo::EARTH_RADIUS_MILES;
use serde::{Deserialize, Serialize};

/// A latitude/longitude rectangle, inclusive on all edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Whether the box spans every longitude
    pub fn is_full_longitude(&self) -> bool {
        self.min_lng <= -180.0 && self.max_lng >= 180.0
    }

    /// Longitude span in degrees
    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Latitude span in degrees
    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Check if a point falls inside the box
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Calculate a bounding box around a center point
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lng` - Center longitude in degrees
/// * `radius_miles` - Radius in miles
///
/// # Returns
/// A box that contains the whole radius disk. When the disk reaches a pole or
/// crosses the antimeridian the box covers every longitude.
pub fn bounding_box(lat: f64, lng: f64, radius_miles: f64) -> BoundingBox {
    let angular = (radius_miles.max(0.0) / EARTH_RADIUS_MILES).min(std::f64::consts::PI);
    let lat_delta = angular.to_degrees();

    let min_lat = lat - lat_delta;
    let max_lat = lat + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            min_lng: -180.0,
            max_lng: 180.0,
        };
    }

    // The pole is outside the cap here, so sin(δ) < cos(φ)
    let ratio = angular.sin() / lat.to_radians().cos();
    let lng_delta = ratio.min(1.0).asin().to_degrees();

    let min_lng = lng - lng_delta;
    let max_lng = lng + lng_delta;

    if min_lng < -180.0 || max_lng > 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lng: -180.0,
            max_lng: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lng,
        max_lng,
    }
}
