//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's lookup, expiry and invalidation rules
//! over arbitrary locations and payloads.

use proptest::prelude::*;

use crate::cache::{LocationCache, ManualClock};
use crate::config::CacheConfig;
use crate::geo::{cell_key, haversine_distance, quantize, GeoPoint};

// == Test Configuration ==
const TEST_TTL_MS: u64 = 30_000;
const TEST_DISTANCE_M: f64 = 100.0;

fn test_cache() -> (LocationCache<u32, ManualClock>, ManualClock) {
    let clock = ManualClock::new(1_000_000);
    let config = CacheConfig::default()
        .with_ttl_ms(TEST_TTL_MS)
        .with_invalidation_distance_m(TEST_DISTANCE_M);
    (LocationCache::with_clock(config, clock.clone()), clock)
}

// == Strategies ==
/// Generates valid coordinates, kept away from the poles where a cell is
/// narrower than its latitude step suggests
fn point_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-80.0f64..80.0, -179.0f64..179.0)
}

/// Generates payloads, including empty ones
fn payload_strategy() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(any::<u32>(), 0..16)
}

/// Two locations whose cells cannot coincide (at least ~0.01 degree apart)
fn distinct_points_strategy() -> impl Strategy<Value = ((f64, f64), (f64, f64))> {
    (point_strategy(), point_strategy()).prop_filter("points share a neighborhood", |(a, b)| {
        (a.0 - b.0).abs() > 0.01 || (a.1 - b.1).abs() > 0.01
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Miss before set, hit with the exact payload after
    #[test]
    fn prop_miss_then_hit((lat, lng) in point_strategy(), data in payload_strategy()) {
        let (mut cache, _) = test_cache();

        prop_assert!(cache.get(lat, lng).is_none());
        prop_assert!(cache.set(lat, lng, &data));
        prop_assert_eq!(cache.get(lat, lng), Some(data.as_slice()));
    }

    // Past the TTL the entry is gone and the size drops
    #[test]
    fn prop_ttl_expiry(
        (lat, lng) in point_strategy(),
        data in payload_strategy(),
        overshoot in 1u64..1_000_000
    ) {
        let (mut cache, clock) = test_cache();
        cache.set(lat, lng, &data);
        prop_assert_eq!(cache.stats().size, 1);

        clock.advance(TEST_TTL_MS + overshoot);
        prop_assert!(cache.get(lat, lng).is_none());
        prop_assert_eq!(cache.stats().size, 0);
    }

    // Before the TTL the entry is served unchanged
    #[test]
    fn prop_live_within_ttl(
        (lat, lng) in point_strategy(),
        data in payload_strategy(),
        elapsed in 0u64..=TEST_TTL_MS
    ) {
        let (mut cache, clock) = test_cache();
        cache.set(lat, lng, &data);

        clock.advance(elapsed);
        prop_assert_eq!(cache.get(lat, lng), Some(data.as_slice()));
    }

    // A query in the same cell is served iff it is within the threshold
    #[test]
    fn prop_drift_decides_same_cell_hits(
        (lat, lng) in point_strategy(),
        (d_lat, d_lng) in (-0.00004f64..0.00004, -0.00004f64..0.00004)
    ) {
        // Coarse cells so the offset query always lands on the stored key,
        // with a threshold small enough for the offset to cross it
        let clock = ManualClock::new(0);
        let config = CacheConfig::default()
            .with_key_precision(1)
            .with_invalidation_distance_m(3.0);
        let mut cache: LocationCache<u32, _> = LocationCache::with_clock(config, clock);

        let (q_lat, q_lng) = (quantize(lat, 1), quantize(lng, 1));
        cache.set(q_lat, q_lng, &[1]);

        let probe = (q_lat + d_lat, q_lng + d_lng);
        let drift = haversine_distance(&GeoPoint::new(q_lat, q_lng), &GeoPoint::new(probe.0, probe.1));
        let hit = cache.get(probe.0, probe.1).is_some();

        prop_assert_eq!(hit, drift <= 3.0, "drift {} m", drift);
        prop_assert_eq!(cache.len(), usize::from(hit));
    }

    // The latest set wins outright
    #[test]
    fn prop_overwrite(
        (lat, lng) in point_strategy(),
        first in payload_strategy(),
        second in payload_strategy()
    ) {
        let (mut cache, _) = test_cache();
        cache.set(lat, lng, &first);
        cache.set(lat, lng, &second);

        prop_assert_eq!(cache.len(), 1);
        prop_assert_eq!(cache.get(lat, lng), Some(second.as_slice()));
    }

    // Invalidating one location leaves other cells alone
    #[test]
    fn prop_invalidate_specific(
        ((lat1, lng1), (lat2, lng2)) in distinct_points_strategy(),
        d1 in payload_strategy(),
        d2 in payload_strategy()
    ) {
        let (mut cache, _) = test_cache();
        cache.set(lat1, lng1, &d1);
        cache.set(lat2, lng2, &d2);

        prop_assert_eq!(cache.invalidate(Some(GeoPoint::new(lat1, lng1))), 1);
        prop_assert!(cache.get(lat1, lng1).is_none());
        prop_assert_eq!(cache.get(lat2, lng2), Some(d2.as_slice()));
    }

    // A full invalidation always empties the cache
    #[test]
    fn prop_invalidate_all(points in prop::collection::vec(point_strategy(), 0..20)) {
        let (mut cache, _) = test_cache();
        for (i, (lat, lng)) in points.iter().enumerate() {
            cache.set(*lat, *lng, &[i as u32]);
        }
        let size = cache.len();

        prop_assert_eq!(cache.invalidate(None), size);
        prop_assert_eq!(cache.stats().size, 0);
    }

    // Mutating the caller's buffer after set never leaks into the cache
    #[test]
    fn prop_defensive_copy(
        (lat, lng) in point_strategy(),
        data in payload_strategy(),
        extra in any::<u32>()
    ) {
        let (mut cache, _) = test_cache();
        let mut buffer = data.clone();
        cache.set(lat, lng, &buffer);

        buffer.push(extra);
        for value in buffer.iter_mut() {
            *value = value.wrapping_add(1);
        }

        prop_assert_eq!(cache.get(lat, lng), Some(data.as_slice()));
    }

    // Cleanup removes exactly the expired entries without any reads
    #[test]
    fn prop_cleanup_sweep(
        ages in prop::collection::vec(0u64..60_000, 1..20)
    ) {
        let (mut cache, clock) = test_cache();
        let start = 1_000_000u64;
        let end = start + 60_000;

        // Distinct cells one degree apart, captured at staggered times
        let mut captures: Vec<u64> = ages.iter().map(|age| end - age).collect();
        captures.sort_unstable();
        for (i, captured) in captures.iter().enumerate() {
            clock.set(*captured);
            cache.set(i as f64, 0.0, &[i as u32]);
        }

        clock.set(end);
        let expected = captures.iter().filter(|c| end > *c + TEST_TTL_MS).count();
        prop_assert_eq!(cache.cleanup(), expected);
        prop_assert_eq!(cache.len(), captures.len() - expected);
        prop_assert_eq!(cache.stats().total_valid_entries, cache.len());
    }

    // Keys are stable under re-quantization
    #[test]
    fn prop_cell_key_idempotent((lat, lng) in point_strategy(), precision in 0u32..=6) {
        let key = cell_key(lat, lng, precision);
        let requantized = cell_key(quantize(lat, precision), quantize(lng, precision), precision);
        prop_assert_eq!(key, requantized);
    }
}
