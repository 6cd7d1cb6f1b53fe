use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the best-effort side of the coordinator.
///
/// These are the only observable trace of a cache or publisher failure; the
/// caller-visible outcome never changes.
#[derive(Debug, Default)]
pub struct SideEffectStats {
    cache_failures: AtomicU64,
    publish_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

/// Point-in-time copy of [`SideEffectStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideEffectStatsSnapshot {
    pub cache_failures: u64,
    pub publish_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl SideEffectStats {
    pub fn record_cache_failure(&self) {
        self.cache_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SideEffectStatsSnapshot {
        SideEffectStatsSnapshot {
            cache_failures: self.cache_failures.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}
