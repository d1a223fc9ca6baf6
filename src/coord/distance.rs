//! Great-circle distance
//!
//! Haversine formula on a spherical Earth. Good to well under a mile at the
//! distances a shop search deals with.

use crate::constants::geo::EARTH_RADIUS_MILES;

/// Calculate the distance between two points in miles (Haversine formula)
///
/// # Arguments
/// * `lat1`, `lng1` - First point in degrees
/// * `lat2`, `lng2` - Second point in degrees
///
/// # Returns
/// Distance in miles. Symmetric, and zero for identical points.
pub fn distance_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}
