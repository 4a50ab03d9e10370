//! Cache Module
//!
//! Provides the location-aware result cache with TTL expiration and
//! distance-based invalidation.

mod clock;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use stats::{CacheStats, LookupCounters};
pub use store::LocationCache;

/// A cache shared between request handlers and the sweep task.
pub type SharedCache<T, C = SystemClock> = Arc<RwLock<LocationCache<T, C>>>;
