//! Nearby Requests Service
//!
//! Fetch-through lookup of pending requests around a location.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Clock, SharedCache, SystemClock};
use crate::error::{Result, ServiceError};
use crate::geo::GeoPoint;
use crate::service::RequestSource;

// == Lookup Source ==
/// Where a lookup's records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupSource {
    Cache,
    Upstream,
}

// == Nearby Lookup ==
/// Records returned for a location.
#[derive(Debug, Clone)]
pub struct NearbyLookup {
    pub records: Vec<Value>,
    pub source: LookupSource,
}

// == Nearby Requests ==
/// Answers "which pending requests are near me" from the cache when it can
/// and from the upstream source when it must.
///
/// Only successful upstream fetches are cached. A failed or timed out fetch
/// leaves the cache untouched.
pub struct NearbyRequests<S, C = SystemClock> {
    cache: SharedCache<Value, C>,
    source: Arc<S>,
    upstream_timeout: Duration,
}

impl<S, C> Clone for NearbyRequests<S, C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            source: Arc::clone(&self.source),
            upstream_timeout: self.upstream_timeout,
        }
    }
}

impl<S: RequestSource, C: Clock> NearbyRequests<S, C> {
    // == Constructor ==
    /// Creates the service around a shared cache.
    ///
    /// # Arguments
    /// * `cache` - Cache shared with the sweep task
    /// * `source` - Upstream used on cache misses
    /// * `upstream_timeout_ms` - Deadline for each upstream fetch
    pub fn new(cache: SharedCache<Value, C>, source: S, upstream_timeout_ms: u64) -> Self {
        Self {
            cache,
            source: Arc::new(source),
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
        }
    }

    /// The cache backing this service.
    pub fn cache(&self) -> &SharedCache<Value, C> {
        &self.cache
    }

    // == Nearby ==
    /// Returns the pending requests around a location.
    ///
    /// Coordinates must be finite and within [-90, 90] / [-180, 180].
    pub async fn nearby(&self, latitude: f64, longitude: f64) -> Result<NearbyLookup> {
        let point = validate_point(latitude, longitude)?;

        let cached = {
            let mut cache = self.cache.write().await;
            cache.get(latitude, longitude).map(<[Value]>::to_vec)
        };

        if let Some(records) = cached {
            debug!(latitude, longitude, records = records.len(), "Serving nearby requests from cache");
            return Ok(NearbyLookup {
                records,
                source: LookupSource::Cache,
            });
        }

        let records = match timeout(self.upstream_timeout, self.source.fetch_pending(point)).await {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                warn!(latitude, longitude, error = %err, "Upstream fetch failed");
                return Err(err);
            }
            Err(_) => {
                let ms = self.upstream_timeout.as_millis() as u64;
                warn!(latitude, longitude, timeout_ms = ms, "Upstream fetch timed out");
                return Err(ServiceError::Timeout(ms));
            }
        };

        self.cache.write().await.set(latitude, longitude, &records);

        Ok(NearbyLookup {
            records,
            source: LookupSource::Upstream,
        })
    }

    // == Invalidate ==
    /// Drops the cached view for one location, or everything when `None`.
    pub async fn invalidate(&self, location: Option<GeoPoint>) -> usize {
        let removed = self.cache.write().await.invalidate(location);
        match location {
            Some(point) => info!(
                latitude = point.latitude,
                longitude = point.longitude,
                removed,
                "Invalidated cached cell"
            ),
            None => info!(removed, "Flushed location cache"),
        }
        removed
    }

    // == Cleanup ==
    /// Runs an expiry sweep immediately.
    pub async fn cleanup(&self) -> usize {
        self.cache.write().await.cleanup()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }
}

/// Checks that a query point is a real coordinate.
pub(crate) fn validate_point(latitude: f64, longitude: f64) -> Result<GeoPoint> {
    let point = GeoPoint::new(latitude, longitude);
    if !point.is_finite() {
        return Err(ServiceError::InvalidRequest(
            "Coordinates must be finite numbers".to_string(),
        ));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ServiceError::InvalidRequest(format!(
            "Latitude {} is outside [-90, 90]",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ServiceError::InvalidRequest(format!(
            "Longitude {} is outside [-180, 180]",
            longitude
        )));
    }
    Ok(point)
}
