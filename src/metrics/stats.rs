use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters updated on every cache operation.
pub struct StatsCounter {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    fills: AtomicU64,
    races_lost: AtomicU64,
}

impl StatsCounter {
    pub fn new() -> Self {
        StatsCounter {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            fills: AtomicU64::new(0),
            races_lost: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_eviction(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fill(&self) {
        self.fills.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_race_lost(&self) {
        self.races_lost.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of the statistics.
    pub fn snapshot(&self) -> Metrics {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0_f64
        } else {
            hits as f64 / total as f64
        };
        Metrics {
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            fills: self.fills.load(Ordering::Relaxed),
            races_lost: self.races_lost.load(Ordering::Relaxed),
            hit_rate,
        }
    }
}

impl Default for StatsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Lookups that found the key (`get` and the `get_ensure` fast path).
    pub hits: u64,
    /// Lookups that did not.
    pub misses: u64,
    /// Entries evicted due to capacity pressure.
    pub evictions: u64,
    /// Values computed by `get_ensure` on a miss, whether kept or discarded.
    pub fills: u64,
    /// Computed values discarded because another caller filled the key first.
    pub races_lost: u64,
    /// `hits / (hits + misses)`, or `0.0` if no requests have been made.
    pub hit_rate: f64,
}

impl Metrics {
    pub fn request_count(&self) -> u64 {
        self.hits + self.misses
    }
}
