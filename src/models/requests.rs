//! Request DTOs for the HTTP API
//!
//! Defines the query strings accepted by the endpoints.

use serde::Deserialize;

use crate::geo::GeoPoint;

/// Query for GET /requests/nearby
#[derive(Debug, Clone, Deserialize)]
pub struct LocationQuery {
    pub latitude: f64,
    pub longitude: f64,
}

/// Query for DELETE /cache
///
/// Both coordinates target a single cell; neither flushes the whole cache.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateQuery {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl InvalidateQuery {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match (self.latitude, self.longitude) {
            (Some(_), None) | (None, Some(_)) => {
                Some("latitude and longitude must be given together".to_string())
            }
            (Some(lat), Some(lng)) if !(lat.is_finite() && lng.is_finite()) => {
                Some("Coordinates must be finite numbers".to_string())
            }
            _ => None,
        }
    }

    /// The targeted cell, or None for a full flush.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}
