use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing registry activity.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    users_created: AtomicU64,
    users_updated: AtomicU64,
    users_deleted: AtomicU64,
    update_misses: AtomicU64,
}

impl StoreMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly appended user.
    pub fn record_created(&self) {
        self.users_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful in-place update.
    pub fn record_updated(&self) {
        self.users_updated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an update that targeted an unknown id.
    pub fn record_update_miss(&self) {
        self.update_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the number of users removed by a delete call (zero is allowed).
    pub fn record_deleted(&self, removed: u64) {
        self.users_deleted.fetch_add(removed, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            users_created: self.users_created.load(Ordering::Relaxed),
            users_updated: self.users_updated.load(Ordering::Relaxed),
            users_deleted: self.users_deleted.load(Ordering::Relaxed),
            update_misses: self.update_misses.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of registry counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Users created since startup.
    pub users_created: u64,
    /// Successful updates since startup.
    pub users_updated: u64,
    /// Users actually removed since startup.
    pub users_deleted: u64,
    /// Updates answered with "not found".
    pub update_misses: u64,
}
