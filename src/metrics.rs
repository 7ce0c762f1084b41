//! Lookup metrics and observability.
//!
//! Tracks bundle-cache activity and translation-key lookups so missing
//! translations (which render as literal key paths) are visible in
//! telemetry, not only in the UI.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global lookup metrics singleton.
pub struct LookupMetrics {
    /// Times a requested bundle was already in the cache
    bundle_hits: AtomicUsize,

    /// Times a requested bundle had to be constructed
    bundle_misses: AtomicUsize,

    /// Bundle constructions attempted
    bundle_loads: AtomicUsize,

    /// Bundle constructions that failed (fell back to the default bundle)
    bundle_load_failures: AtomicUsize,

    /// Key lookups that found a translated string
    key_hits: AtomicUsize,

    /// Key lookups that fell back to the literal key path
    key_misses: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<LookupMetrics> = OnceLock::new();

impl LookupMetrics {
    fn new() -> Self {
        Self {
            bundle_hits: AtomicUsize::new(0),
            bundle_misses: AtomicUsize::new(0),
            bundle_loads: AtomicUsize::new(0),
            bundle_load_failures: AtomicUsize::new(0),
            key_hits: AtomicUsize::new(0),
            key_misses: AtomicUsize::new(0),
        }
    }

    /// Get the global lookup metrics instance.
    pub fn global() -> &'static LookupMetrics {
        METRICS.get_or_init(LookupMetrics::new)
    }

    /// Record a bundle found in the cache.
    pub fn record_bundle_hit(&self) {
        self.bundle_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bundle that was not cached yet.
    pub fn record_bundle_miss(&self) {
        self.bundle_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bundle construction attempt.
    pub fn record_bundle_load(&self) {
        self.bundle_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a bundle construction failure.
    pub fn record_bundle_load_failure(&self) {
        self.bundle_load_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a key lookup that resolved to a translation.
    pub fn record_key_hit(&self) {
        self.key_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a key lookup that fell back to the literal key.
    pub fn record_key_miss(&self) {
        self.key_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bundle_hits(&self) -> usize {
        self.bundle_hits.load(Ordering::Relaxed)
    }

    pub fn bundle_misses(&self) -> usize {
        self.bundle_misses.load(Ordering::Relaxed)
    }

    pub fn bundle_loads(&self) -> usize {
        self.bundle_loads.load(Ordering::Relaxed)
    }

    pub fn bundle_load_failures(&self) -> usize {
        self.bundle_load_failures.load(Ordering::Relaxed)
    }

    pub fn key_hits(&self) -> usize {
        self.key_hits.load(Ordering::Relaxed)
    }

    pub fn key_misses(&self) -> usize {
        self.key_misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let bundle_hits = self.bundle_hits();
        let bundle_misses = self.bundle_misses();
        let cache_queries = bundle_hits + bundle_misses;
        let bundle_hit_rate = if cache_queries > 0 {
            (bundle_hits as f64 / cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let key_hits = self.key_hits();
        let key_misses = self.key_misses();
        let key_lookups = key_hits + key_misses;
        let key_hit_rate = if key_lookups > 0 {
            (key_hits as f64 / key_lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            bundle_hits,
            bundle_misses,
            bundle_hit_rate,
            bundle_loads: self.bundle_loads(),
            bundle_load_failures: self.bundle_load_failures(),
            key_hits,
            key_misses,
            key_hit_rate,
        }
    }

    /// Reset all counters to zero (useful for testing).
    pub fn reset(&self) {
        self.bundle_hits.store(0, Ordering::Relaxed);
        self.bundle_misses.store(0, Ordering::Relaxed);
        self.bundle_loads.store(0, Ordering::Relaxed);
        self.bundle_load_failures.store(0, Ordering::Relaxed);
        self.key_hits.store(0, Ordering::Relaxed);
        self.key_misses.store(0, Ordering::Relaxed);
    }
}

/// Metrics report containing current lookup statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Bundle cache hits
    pub bundle_hits: usize,

    /// Bundle cache misses
    pub bundle_misses: usize,

    /// Bundle cache hit rate as a percentage (0-100)
    pub bundle_hit_rate: f64,

    /// Bundle constructions attempted
    pub bundle_loads: usize,

    /// Bundle constructions that fell back to the default bundle
    pub bundle_load_failures: usize,

    /// Key lookups that found a translation
    pub key_hits: usize,

    /// Key lookups that rendered the literal key path
    pub key_misses: usize,

    /// Key lookup hit rate as a percentage (0-100)
    pub key_hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests use a local instance; other test modules record into the
    // global concurrently, so its counts are not deterministic here.

    // ==================== Counter Tests ====================

    #[test]
    fn test_record_bundle_hit() {
        let metrics = LookupMetrics::new();

        assert_eq!(metrics.bundle_hits(), 0);
        metrics.record_bundle_hit();
        metrics.record_bundle_hit();
        assert_eq!(metrics.bundle_hits(), 2);
    }

    #[test]
    fn test_record_key_miss() {
        let metrics = LookupMetrics::new();

        metrics.record_key_miss();
        assert_eq!(metrics.key_misses(), 1);
    }

    #[test]
    fn test_record_load_failure() {
        let metrics = LookupMetrics::new();

        metrics.record_bundle_load();
        metrics.record_bundle_load_failure();
        assert_eq!(metrics.bundle_loads(), 1);
        assert_eq!(metrics.bundle_load_failures(), 1);
    }

    #[test]
    fn test_reset_zeroes_counters() {
        let metrics = LookupMetrics::new();
        metrics.record_bundle_hit();
        metrics.record_key_hit();

        metrics.reset();
        assert_eq!(metrics.bundle_hits(), 0);
        assert_eq!(metrics.key_hits(), 0);
    }

    // ==================== Report Tests ====================

    #[test]
    fn test_report_empty() {
        let report = LookupMetrics::new().report();

        assert_eq!(report.bundle_hits, 0);
        assert_eq!(report.bundle_hit_rate, 0.0);
        assert_eq!(report.key_hit_rate, 0.0);
    }

    #[test]
    fn test_report_bundle_hit_rate() {
        let metrics = LookupMetrics::new();

        // 3 hits, 1 miss = 75% hit rate
        metrics.record_bundle_hit();
        metrics.record_bundle_hit();
        metrics.record_bundle_hit();
        metrics.record_bundle_miss();

        let report = metrics.report();
        assert_eq!(report.bundle_hit_rate, 75.0);
    }

    #[test]
    fn test_report_key_hit_rate() {
        let metrics = LookupMetrics::new();

        metrics.record_key_hit();
        metrics.record_key_miss();

        let report = metrics.report();
        assert_eq!(report.key_hits, 1);
        assert_eq!(report.key_misses, 1);
        assert_eq!(report.key_hit_rate, 50.0);
    }

    #[test]
    fn test_report_serializes() {
        let report = LookupMetrics::new().report();
        let json = serde_json::to_string(&report).expect("serialize");
        assert!(json.contains("bundle_hit_rate"));
    }

    // ==================== Singleton Tests ====================

    #[test]
    fn test_global_returns_same_instance() {
        let metrics1 = LookupMetrics::global();
        let metrics2 = LookupMetrics::global();
        assert!(std::ptr::eq(metrics1, metrics2));
    }
}
