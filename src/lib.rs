//! Pending Cache - A location-aware cache for nearby pending ride requests
//!
//! Memoizes the latest result set per geographic cell, serves it back to
//! nearby repeat queries within a TTL, and drops it once the caller has
//! moved too far away or the entry has aged out.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use cache::{LocationCache, SharedCache};
pub use config::{CacheConfig, Config};
pub use geo::GeoPoint;
pub use tasks::{spawn_sweep_task, SweepHandle};
