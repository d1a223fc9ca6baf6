//! Coordinates and great-circle geometry
//!
//! This module handles:
//! - WGS-84 coordinate validation
//! - Great-circle distance in miles
//! - Bounding boxes used to pre-filter candidates in the database

pub mod bbox;
pub mod distance;

pub use bbox::{bounding_box, BoundingBox};
pub use distance::distance_miles;

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build coordinates from a pair of nullable columns
    ///
    /// A location only exists when both halves are present.
    pub fn from_columns(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self::new(lat, lng)),
            _ => None,
        }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.lat.is_finite() || self.lat < -90.0 || self.lat > 90.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || self.lng < -180.0 || self.lng > 180.0 {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Distance to another point in miles
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_miles(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Round a distance to one decimal mile for display
pub fn round_miles(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
        assert!(Coordinates::new(30.2672, -97.7431).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -180.5).validate().is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_from_columns_requires_both() {
        assert_eq!(
            Coordinates::from_columns(Some(1.0), Some(2.0)),
            Some(Coordinates::new(1.0, 2.0))
        );
        assert_eq!(Coordinates::from_columns(Some(1.0), None), None);
        assert_eq!(Coordinates::from_columns(None, Some(2.0)), None);
    }

    #[test]
    fn test_round_miles() {
        assert_eq!(round_miles(2.345), 2.3);
        assert_eq!(round_miles(2.36), 2.4);
        assert_eq!(round_miles(0.0), 0.0);
    }
}
