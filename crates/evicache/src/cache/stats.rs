//! Cache statistics and metrics tracking
//!
//! Counters are plain atomics updated outside the gate. They are advisory:
//! a snapshot is only eventually consistent with the most recently completed
//! operation and nothing in the cache reads them to make decisions.

use std::sync::atomic::{AtomicU64, Ordering};

use super::config::EvictionPolicy;

/// Point-in-time view of cache performance
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Entries stored when the snapshot was taken
    pub size: usize,

    /// Configured capacity
    pub capacity: usize,

    /// Eviction policy in force
    pub policy: EvictionPolicy,

    /// Lookups that found a live entry
    pub hits: u64,

    /// Lookups that found nothing, or found an expired entry
    pub misses: u64,

    /// Brand-new keys stored
    pub inserts: u64,

    /// Live entries removed to make room
    pub evictions: u64,

    /// Expired entries purged (never counted as evictions)
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate (misses / total accesses)
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Calculate fill percentage (size / capacity)
    pub fn fill_percentage(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size as f64 / self.capacity as f64
        }
    }

    /// Total number of access operations (hits + misses)
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an eviction, returning the running total
    pub(crate) fn record_eviction(&self) -> u64 {
        self.evictions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub(crate) fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub(crate) fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub(crate) fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, size: usize, capacity: usize, policy: EvictionPolicy) -> CacheStats {
        CacheStats {
            size,
            capacity,
            policy,
            hits: self.hits(),
            misses: self.misses(),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions(),
            expirations: self.expirations(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::stats.
    use std::sync::Arc;

    use super::*;

    fn stats(hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            size: 0,
            capacity: 10,
            policy: EvictionPolicy::Lru,
            hits,
            misses,
            inserts: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    /// Validates the hit rate calculation scenario.
    ///
    /// Assertions:
    /// - Ensures `(stats.hit_rate() - 0.8).abs() < 1e-10` evaluates to true.
    /// - Ensures `(stats.miss_rate() - 0.2).abs() < 1e-10` evaluates to true.
    /// - Confirms `stats.total_accesses()` equals `100`.
    #[test]
    fn test_hit_rate_calculation() {
        let stats = stats(80, 20);

        assert!((stats.hit_rate() - 0.8).abs() < 1e-10);
        assert!((stats.miss_rate() - 0.2).abs() < 1e-10);
        assert_eq!(stats.total_accesses(), 100);
    }

    /// Validates the hit rate no accesses scenario.
    ///
    /// Assertions:
    /// - Confirms `stats.hit_rate()` equals `0.0`.
    /// - Confirms `stats.miss_rate()` equals `1.0`.
    #[test]
    fn test_hit_rate_no_accesses() {
        let stats = stats(0, 0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 1.0);
        assert_eq!(stats.total_accesses(), 0);
    }

    /// Validates the fill percentage scenario.
    ///
    /// Assertions:
    /// - Confirms `stats.fill_percentage()` equals `0.5`.
    #[test]
    fn test_fill_percentage() {
        let stats = CacheStats { size: 5, ..stats(0, 0) };
        assert_eq!(stats.fill_percentage(), 0.5);
    }

    /// Validates the metrics collector record operations scenario.
    ///
    /// Assertions:
    /// - Confirms every counter lands in the snapshot.
    /// - Confirms `record_eviction` returns the running total.
    #[test]
    fn test_metrics_collector_record_operations() {
        let collector = MetricsCollector::new();

        collector.record_hit();
        collector.record_miss();
        collector.record_insert();
        assert_eq!(collector.record_eviction(), 1);
        assert_eq!(collector.record_eviction(), 2);
        collector.record_expiration();

        let stats = collector.snapshot(5, 10, EvictionPolicy::Fifo);

        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 5);
        assert_eq!(stats.capacity, 10);
        assert_eq!(stats.policy, EvictionPolicy::Fifo);
    }

    /// Validates the metrics collector thread safety scenario.
    ///
    /// Assertions:
    /// - Confirms `collector.hits()` equals `1000`.
    #[test]
    fn test_metrics_collector_thread_safety() {
        use std::thread;

        let collector = Arc::new(MetricsCollector::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let collector_clone = Arc::clone(&collector);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    collector_clone.record_hit();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(collector.hits(), 1000);
    }
}
