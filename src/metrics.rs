//! Fetch accounting for a sparse cache
//!
//! Counts how often the cache had to go to its provider and how many bytes
//! it moved, so callers can see how much of a remote object a read pattern
//! actually pulled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters kept by one cache instance
#[derive(Debug, Default)]
pub struct FetchMetrics {
    // Read statistics
    total_reads: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,

    // Provider statistics
    fetch_calls: AtomicU64,
    failed_fetches: AtomicU64,
    invalid_getter_results: AtomicU64,

    // Byte statistics
    bytes_fetched: AtomicU64,
    bytes_served: AtomicU64,

    // Stored as microseconds
    total_fetch_duration_us: AtomicU64,
}

/// Snapshot of fetch metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_reads: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,

    pub fetch_calls: u64,
    pub failed_fetches: u64,
    pub invalid_getter_results: u64,

    pub bytes_fetched: u64,
    pub bytes_served: u64,

    pub total_fetch_duration_us: u64,
}

impl FetchMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read that needed `fetches` provider calls
    ///
    /// A read needing none was served entirely from cache.
    pub fn record_read(&self, fetches: usize) {
        self.total_reads.fetch_add(1, Ordering::Relaxed);
        if fetches == 0 {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.cache_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one provider call and its outcome
    pub fn record_fetch(&self, bytes: u64, duration: Duration, success: bool) {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.total_fetch_duration_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        if success {
            self.bytes_fetched.fetch_add(bytes, Ordering::Relaxed);
        } else {
            self.failed_fetches.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a getter result of the wrong length
    pub fn record_invalid_getter(&self) {
        self.invalid_getter_results.fetch_add(1, Ordering::Relaxed);
    }

    /// Record bytes handed back to a caller
    pub fn record_bytes_served(&self, bytes: u64) {
        self.bytes_served.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn get_stats(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_reads: self.total_reads.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetch_calls: self.fetch_calls.load(Ordering::Relaxed),
            failed_fetches: self.failed_fetches.load(Ordering::Relaxed),
            invalid_getter_results: self.invalid_getter_results.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
            bytes_served: self.bytes_served.load(Ordering::Relaxed),
            total_fetch_duration_us: self.total_fetch_duration_us.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.total_reads.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.fetch_calls.store(0, Ordering::Relaxed);
        self.failed_fetches.store(0, Ordering::Relaxed);
        self.invalid_getter_results.store(0, Ordering::Relaxed);
        self.bytes_fetched.store(0, Ordering::Relaxed);
        self.bytes_served.store(0, Ordering::Relaxed);
        self.total_fetch_duration_us.store(0, Ordering::Relaxed);
    }
}

impl MetricsSnapshot {
    /// Percentage of reads served without touching the provider (0.0 to 100.0)
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            (self.cache_hits as f64 / total as f64) * 100.0
        }
    }

    /// Average provider call duration in milliseconds
    pub fn avg_fetch_duration_ms(&self) -> f64 {
        if self.fetch_calls == 0 {
            0.0
        } else {
            (self.total_fetch_duration_us as f64 / self.fetch_calls as f64) / 1000.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_read() {
        let metrics = FetchMetrics::new();

        metrics.record_read(0);
        metrics.record_read(2);
        metrics.record_read(0);

        let stats = metrics.get_stats();
        assert_eq!(stats.total_reads, 3);
        assert_eq!(stats.cache_hits, 2);
        assert_eq!(stats.cache_misses, 1);
    }

    #[test]
    fn test_record_fetch() {
        let metrics = FetchMetrics::new();

        metrics.record_fetch(100, Duration::from_millis(2), true);
        metrics.record_fetch(50, Duration::from_millis(4), false);

        let stats = metrics.get_stats();
        assert_eq!(stats.fetch_calls, 2);
        assert_eq!(stats.failed_fetches, 1);
        assert_eq!(stats.bytes_fetched, 100);
        assert_eq!(stats.avg_fetch_duration_ms(), 3.0);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = FetchMetrics::new();
        assert_eq!(metrics.get_stats().cache_hit_rate(), 0.0);

        for _ in 0..3 {
            metrics.record_read(0);
        }
        metrics.record_read(1);

        assert_eq!(metrics.get_stats().cache_hit_rate(), 75.0);
    }

    #[test]
    fn test_reset() {
        let metrics = FetchMetrics::new();
        metrics.record_read(1);
        metrics.record_fetch(10, Duration::from_micros(5), true);
        metrics.record_invalid_getter();
        metrics.record_bytes_served(10);

        metrics.reset();

        let stats = metrics.get_stats();
        assert_eq!(stats.total_reads, 0);
        assert_eq!(stats.fetch_calls, 0);
        assert_eq!(stats.invalid_getter_results, 0);
        assert_eq!(stats.bytes_served, 0);
    }
}
