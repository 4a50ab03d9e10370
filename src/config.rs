//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;

use crate::geo::MAX_KEY_PRECISION;

// == Cache Config ==
/// Tuning knobs for a [`LocationCache`](crate::cache::LocationCache).
///
/// The 30s TTL and 100m threshold are product defaults, not derived
/// constants; adjust them to the client's polling interval and typical
/// driver speed.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Lifetime of an entry in milliseconds
    pub ttl_ms: u64,
    /// Maximum distance in meters between a query and an entry's origin
    pub invalidation_distance_m: f64,
    /// Interval of the internal sweep task in milliseconds, None = disabled
    pub sweep_interval_ms: Option<u64>,
    /// Decimal places kept when quantizing coordinates into keys
    pub key_precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 30_000,
            invalidation_distance_m: 100.0,
            sweep_interval_ms: Some(10_000),
            key_precision: 4,
        }
    }
}

impl CacheConfig {
    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_invalidation_distance_m(mut self, meters: f64) -> Self {
        self.invalidation_distance_m = meters;
        self
    }

    pub fn with_sweep_interval_ms(mut self, interval_ms: Option<u64>) -> Self {
        self.sweep_interval_ms = interval_ms.filter(|ms| *ms > 0);
        self
    }

    pub fn with_key_precision(mut self, precision: u32) -> Self {
        self.key_precision = precision.min(MAX_KEY_PRECISION);
        self
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache tuning
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream pending-requests API
    pub upstream_url: String,
    /// Timeout applied to each upstream fetch in milliseconds
    pub upstream_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - Entry lifetime in milliseconds (default: 30000)
    /// - `INVALIDATION_DISTANCE_M` - Drift threshold in meters (default: 100)
    /// - `SWEEP_INTERVAL_MS` - Sweep frequency, 0 disables (default: 10000)
    /// - `KEY_PRECISION` - Key decimal places, max 8 (default: 4)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream API base URL (default: http://localhost:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream fetch timeout (default: 5000)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let cache = CacheConfig::default()
            .with_ttl_ms(parsed(&lookup, "CACHE_TTL_MS").unwrap_or(defaults.cache.ttl_ms))
            .with_invalidation_distance_m(
                parsed::<f64, _>(&lookup, "INVALIDATION_DISTANCE_M")
                    .filter(|m| m.is_finite() && *m >= 0.0)
                    .unwrap_or(defaults.cache.invalidation_distance_m),
            )
            .with_sweep_interval_ms(
                parsed::<u64, _>(&lookup, "SWEEP_INTERVAL_MS")
                    .map_or(defaults.cache.sweep_interval_ms, Some),
            )
            .with_key_precision(
                parsed(&lookup, "KEY_PRECISION").unwrap_or(defaults.cache.key_precision),
            );

        Self {
            cache,
            server_port: parsed(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: lookup("UPSTREAM_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout_ms: parsed(&lookup, "UPSTREAM_TIMEOUT_MS")
                .unwrap_or(defaults.upstream_timeout_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            upstream_url: "http://localhost:8080".to_string(),
            upstream_timeout_ms: 5_000,
        }
    }
}

fn parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_ms, 30_000);
        assert_eq!(config.invalidation_distance_m, 100.0);
        assert_eq!(config.sweep_interval_ms, Some(10_000));
        assert_eq!(config.key_precision, 4);
    }

    #[test]
    fn test_config_from_lookup_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.cache, CacheConfig::default());
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upstream_url, "http://localhost:8080");
        assert_eq!(config.upstream_timeout_ms, 5_000);
    }

    #[test]
    fn test_config_from_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_TTL_MS", "60000"),
            ("INVALIDATION_DISTANCE_M", "250.5"),
            ("SWEEP_INTERVAL_MS", "2000"),
            ("KEY_PRECISION", "3"),
            ("SERVER_PORT", "8081"),
            ("UPSTREAM_URL", "https://api.example.com/"),
            ("UPSTREAM_TIMEOUT_MS", " 1500 "),
        ]));

        assert_eq!(config.cache.ttl_ms, 60_000);
        assert_eq!(config.cache.invalidation_distance_m, 250.5);
        assert_eq!(config.cache.sweep_interval_ms, Some(2_000));
        assert_eq!(config.cache.key_precision, 3);
        assert_eq!(config.server_port, 8081);
        assert_eq!(config.upstream_url, "https://api.example.com");
        assert_eq!(config.upstream_timeout_ms, 1_500);
    }

    #[test]
    fn test_sweep_interval_zero_disables() {
        let config = Config::from_lookup(lookup_from(&[("SWEEP_INTERVAL_MS", "0")]));
        assert_eq!(config.cache.sweep_interval_ms, None);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_TTL_MS", "soon"),
            ("INVALIDATION_DISTANCE_M", "-5"),
            ("KEY_PRECISION", "99"),
            ("UPSTREAM_URL", "  "),
        ]));

        assert_eq!(config.cache.ttl_ms, 30_000);
        assert_eq!(config.cache.invalidation_distance_m, 100.0);
        assert_eq!(config.cache.key_precision, MAX_KEY_PRECISION);
        assert_eq!(config.upstream_url, "http://localhost:8080");
    }
}
