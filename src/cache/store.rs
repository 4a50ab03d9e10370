//! Cache Store Module
//!
//! Location-aware cache engine: HashMap storage keyed by quantized cell,
//! with TTL expiry and distance-based invalidation.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, LookupCounters, SystemClock};
use crate::config::CacheConfig;
use crate::geo::{cell_key, GeoPoint};

// == Location Cache ==
/// Memoizes the latest result set per location cell.
///
/// A stored entry is only served back while it is unexpired and the query
/// point is within `invalidation_distance_m` of where the entry was
/// captured. Anything else is a miss, and the offending entry is dropped.
///
/// Not internally synchronized. Share it across tasks behind
/// `Arc<RwLock<_>>` (see [`SharedCache`](crate::cache::SharedCache)); `get`
/// needs the write lock because a miss may delete.
#[derive(Debug)]
pub struct LocationCache<T, C = SystemClock> {
    /// Cell key -> entry
    entries: HashMap<String, CacheEntry<T>>,
    /// Running lookup counters
    counters: LookupCounters,
    /// Tuning knobs
    config: CacheConfig,
    /// Time source
    clock: C,
}

impl<T: Clone> LocationCache<T, SystemClock> {
    // == Constructor ==
    /// Creates an empty cache reading the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<T: Clone, C: Clock> LocationCache<T, C> {
    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            counters: LookupCounters::default(),
            config,
            clock,
        }
    }

    fn key_for(&self, latitude: f64, longitude: f64) -> String {
        cell_key(latitude, longitude, self.config.key_precision)
    }

    // == Get ==
    /// Looks up the cached result set for a location.
    ///
    /// Returns `None` when there is no entry for the cell, when the entry
    /// has expired, or when the query point has drifted further than the
    /// invalidation distance from the entry's origin. The latter two also
    /// remove the entry. Non-finite coordinates are a miss with no other
    /// side effect.
    pub fn get(&mut self, latitude: f64, longitude: f64) -> Option<&[T]> {
        let point = GeoPoint::new(latitude, longitude);
        if !point.is_finite() {
            debug!(latitude, longitude, "Rejecting lookup with non-finite coordinates");
            self.counters.record_miss();
            return None;
        }

        let key = self.key_for(latitude, longitude);
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get(&key) else {
            self.counters.record_miss();
            return None;
        };

        if entry.is_expired(now) {
            debug!(key = %key, "Cache entry expired");
            self.entries.remove(&key);
            self.counters.record_expired(1);
            self.counters.record_miss();
            return None;
        }

        let drift = entry.drift_m(&point);
        if drift > self.config.invalidation_distance_m {
            debug!(key = %key, drift_m = drift, "Cache entry invalidated by location drift");
            self.entries.remove(&key);
            self.counters.record_drift();
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        self.entries.get(&key).map(|entry| entry.data.as_slice())
    }

    // == Set ==
    /// Stores a copy of `data` as the result set for a location.
    ///
    /// Any entry already in the cell is replaced wholesale and its TTL
    /// restarts. Returns `false` (and stores nothing) for non-finite
    /// coordinates.
    pub fn set(&mut self, latitude: f64, longitude: f64, data: &[T]) -> bool {
        let origin = GeoPoint::new(latitude, longitude);
        if !origin.is_finite() {
            warn!(latitude, longitude, "Refusing to cache result for non-finite coordinates");
            return false;
        }

        let key = self.key_for(latitude, longitude);
        let entry = CacheEntry::new(data.to_vec(), origin, self.clock.now_ms(), self.config.ttl_ms);
        debug!(key = %key, records = data.len(), "Caching result set");
        self.entries.insert(key, entry);
        true
    }

    // == Invalidate ==
    /// Removes the entry for one location, or every entry when `location`
    /// is `None`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, location: Option<GeoPoint>) -> usize {
        match location {
            Some(point) if point.is_finite() => {
                let key = self.key_for(point.latitude, point.longitude);
                usize::from(self.entries.remove(&key).is_some())
            }
            Some(point) => {
                warn!(
                    latitude = point.latitude,
                    longitude = point.longitude,
                    "Ignoring invalidation for non-finite coordinates"
                );
                0
            }
            None => {
                let removed = self.entries.len();
                self.entries.clear();
                removed
            }
        }
    }

    // == Cleanup ==
    /// Removes every expired entry.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        self.counters.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns a diagnostic snapshot of the cache.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now_ms();
        let (valid, total_age) = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .fold((0usize, 0u64), |(count, age), entry| {
                (count + 1, age.saturating_add(entry.age_ms(now)))
            });

        CacheStats {
            size: self.entries.len(),
            total_valid_entries: valid,
            average_age_ms: if valid == 0 { 0 } else { total_age / valid as u64 },
            counters: self.counters,
        }
    }

    // == Length ==
    /// Returns the current number of entries, including expired ones not yet
    /// swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the configuration the cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
