//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::config::CacheConfig;
use crate::geo::cell_size_m;
use crate::service::{LookupSource, NearbyLookup};

/// Response body for GET /requests/nearby
#[derive(Debug, Clone, Serialize)]
pub struct NearbyResponse {
    /// Whether the records were served from the cache or fetched upstream
    pub source: LookupSource,
    /// Number of records
    pub count: usize,
    /// The pending requests, as returned by upstream
    pub requests: Vec<Value>,
}

impl From<NearbyLookup> for NearbyResponse {
    fn from(lookup: NearbyLookup) -> Self {
        Self {
            source: lookup.source,
            count: lookup.records.len(),
            requests: lookup.records,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of entries removed
    pub removed: usize,
    /// "cell" for a single-location invalidation, "all" for a flush
    pub scope: &'static str,
}

impl InvalidateResponse {
    pub fn new(removed: usize, single_cell: bool) -> Self {
        Self {
            removed,
            scope: if single_cell { "cell" } else { "all" },
        }
    }
}

/// Response body for POST /cache/cleanup
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    /// Number of expired entries removed
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Configured entry lifetime
    pub ttl_ms: u64,
    /// Configured drift threshold
    pub invalidation_distance_m: f64,
    /// Configured key precision and the resulting cell edge at the equator
    pub key_precision: u32,
    pub cell_size_m: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a cache snapshot
    pub fn new(stats: CacheStats, config: &CacheConfig) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            ttl_ms: config.ttl_ms,
            invalidation_distance_m: config.invalidation_distance_m,
            key_precision: config.key_precision,
            cell_size_m: cell_size_m(config.key_precision),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
