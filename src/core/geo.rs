//! Great-circle distance between WGS84 coordinates

use crate::core::error::PerrosError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Builds a coordinate pair, rejecting values outside the WGS84 ranges.
    pub fn new(lat: f64, lng: f64) -> Result<Self, PerrosError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(PerrosError::Validation(format!(
                "latitude {lat} is outside [-90, 90]"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(PerrosError::Validation(format!(
                "longitude {lng} is outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }

    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        haversine_km(self, other)
    }
}

/// Haversine distance in kilometers.
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `h` just past 1 for near-antipodal pairs.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}
