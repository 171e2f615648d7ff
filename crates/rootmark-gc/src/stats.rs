//! Collector statistics

use std::time::Duration;

/// Snapshot of heap usage and collection activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcStats {
    /// Bytes currently allocated
    pub bytes_used: usize,
    /// Heap budget minus bytes used, clamped at zero
    pub bytes_free: usize,
    /// Bytes used beyond the heap budget (zero when within budget)
    pub over_budget: usize,
    /// Configured heap budget
    pub heap_budget: usize,
    /// Number of live allocations
    pub object_count: usize,
    /// Number of root entries (duplicates counted)
    pub root_count: usize,
    /// Number of edge records
    pub edge_count: usize,
    /// Full collections performed (explicit and threshold-triggered)
    pub collections: u64,
    /// Objects marked in last collection
    pub last_marked: usize,
    /// Bytes reclaimed in last collection
    pub last_reclaimed: usize,
    /// Bytes reclaimed by every collection and explicit free
    pub total_reclaimed: u64,
    /// Pause time of the last collection
    pub last_pause: Duration,
    /// Total pause time accumulated across all collections
    pub total_pause: Duration,
}

/// Running counters the collector updates after each cycle
#[derive(Debug, Default, Clone)]
pub(crate) struct CollectionCounters {
    pub collections: u64,
    pub last_marked: usize,
    pub last_reclaimed: usize,
    pub total_reclaimed: u64,
    pub last_pause: Duration,
    pub total_pause: Duration,
}

impl CollectionCounters {
    /// Record a completed mark/sweep cycle
    pub fn record_cycle(&mut self, marked: usize, reclaimed: usize, pause: Duration) {
        self.collections += 1;
        self.last_marked = marked;
        self.last_reclaimed = reclaimed;
        self.total_reclaimed += reclaimed as u64;
        self.last_pause = pause;
        self.total_pause += pause;
    }

    /// Record bytes released outside a full cycle
    pub fn record_free(&mut self, reclaimed: usize) {
        self.total_reclaimed += reclaimed as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_cycle() {
        let mut counters = CollectionCounters::default();
        counters.record_cycle(3, 64, Duration::from_micros(5));
        counters.record_cycle(3, 0, Duration::from_micros(7));
        counters.record_free(16);

        assert_eq!(counters.collections, 2);
        assert_eq!(counters.last_reclaimed, 0);
        assert_eq!(counters.total_reclaimed, 80);
        assert_eq!(counters.last_pause, Duration::from_micros(7));
        assert_eq!(counters.total_pause, Duration::from_micros(12));
    }
}
