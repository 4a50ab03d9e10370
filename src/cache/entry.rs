//! Cache Entry Module
//!
//! Defines a cached result set together with the location and time it was
//! captured at.

use crate::geo::GeoPoint;

// == Cache Entry ==
/// A memoized result set for one location cell.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached records, owned by the cache
    pub data: Vec<T>,
    /// Capture timestamp (Unix milliseconds)
    pub captured_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Location the query was issued from
    pub origin: GeoPoint,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry captured at `now_ms` that lives for `ttl_ms`.
    pub fn new(data: Vec<T>, origin: GeoPoint, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            data,
            captured_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
            origin,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry read at exactly `expires_at` is still live; it expires once
    /// the current time is strictly past it.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    // == Age ==
    /// Milliseconds since the entry was captured.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.captured_at)
    }

    // == Time To Live ==
    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at.saturating_sub(now_ms)
    }

    // == Drift ==
    /// Distance in meters between the entry's origin and `point`.
    pub fn drift_m(&self, point: &GeoPoint) -> f64 {
        self.origin.distance_to(point)
    }
}
