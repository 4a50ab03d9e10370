//! Geo Module
//!
//! Coordinate helpers shared by the cache: Haversine distance and the
//! quantized cell keys used to coalesce nearby lookups.

use serde::{Deserialize, Serialize};

// == Constants ==
/// Mean Earth radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Highest supported key precision. Beyond 8 decimals the grid is finer
/// than f64 coordinates from consumer GPS can resolve.
pub const MAX_KEY_PRECISION: u32 = 8;

// == Geo Point ==
/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true when both components are finite numbers.
    ///
    /// Range is deliberately not checked; only NaN and infinities make a
    /// key unstable.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }
}

// == Haversine ==
/// Computes the great-circle distance between two points in meters.
///
/// Uses a spherical Earth of radius [`EARTH_RADIUS_M`]; ellipsoidal effects
/// are ignored, which is well within tolerance for sub-kilometer checks.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

// == Cell Key ==
/// Rounds a coordinate to `precision` decimal places.
///
/// Negative zero is folded into positive zero so that `-0.00001` and
/// `0.00001` land in the same cell.
pub fn quantize(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(MAX_KEY_PRECISION) as i32);
    (value * scale).round() / scale + 0.0
}

/// Builds the cache key for a location.
///
/// Both coordinates are quantized independently and rendered with exactly
/// `precision` decimals, e.g. `"40.7128,-74.0060"` at precision 4.
pub fn cell_key(latitude: f64, longitude: f64, precision: u32) -> String {
    let p = precision.min(MAX_KEY_PRECISION) as usize;
    format!(
        "{:.p$},{:.p$}",
        quantize(latitude, precision),
        quantize(longitude, precision),
        p = p
    )
}

/// Approximate edge length in meters of one key cell at the equator.
pub fn cell_size_m(precision: u32) -> f64 {
    let degrees = 10f64.powi(-(precision.min(MAX_KEY_PRECISION) as i32));
    EARTH_RADIUS_M * degrees.to_radians()
}
