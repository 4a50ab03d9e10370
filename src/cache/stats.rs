//! Cache Statistics Module
//!
//! Diagnostic snapshot of cache contents plus running lookup counters.

use serde::Serialize;

// == Lookup Counters ==
/// Running totals of lookup outcomes since the cache was created.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LookupCounters {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries dropped because their TTL elapsed (on read or sweep)
    pub expired: u64,
    /// Entries dropped because the caller moved beyond the distance threshold
    pub drifted: u64,
}

impl LookupCounters {
    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expired ==
    pub fn record_expired(&mut self, count: usize) {
        self.expired += count as u64;
    }

    // == Record Drift ==
    pub fn record_drift(&mut self) {
        self.drifted += 1;
    }
}

// == Cache Stats ==
/// Point-in-time view of the cache.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of stored entries, expired or not
    pub size: usize,
    /// Number of stored entries that have not yet expired
    pub total_valid_entries: usize,
    /// Mean age of the valid entries in milliseconds (0 if none)
    pub average_age_ms: u64,
    /// Running lookup counters
    #[serde(flatten)]
    pub counters: LookupCounters,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.counters.hits + self.counters.misses;
        if total == 0 {
            0.0
        } else {
            self.counters.hits as f64 / total as f64
        }
    }
}
