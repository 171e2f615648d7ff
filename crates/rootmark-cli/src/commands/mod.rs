//! CLI command implementations.

pub mod demo;
pub mod info;
pub mod stress;

use rootmark_gc::GcStats;
use serde::Serialize;

/// Serializable view of collector statistics
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub bytes_used: usize,
    pub bytes_free: usize,
    pub over_budget: usize,
    pub heap_budget: usize,
    pub object_count: usize,
    pub root_count: usize,
    pub edge_count: usize,
    pub collections: u64,
    pub last_reclaimed: usize,
    pub total_reclaimed: u64,
    pub total_pause_us: u64,
}

impl From<GcStats> for StatsReport {
    fn from(stats: GcStats) -> Self {
        Self {
            bytes_used: stats.bytes_used,
            bytes_free: stats.bytes_free,
            over_budget: stats.over_budget,
            heap_budget: stats.heap_budget,
            object_count: stats.object_count,
            root_count: stats.root_count,
            edge_count: stats.edge_count,
            collections: stats.collections,
            last_reclaimed: stats.last_reclaimed,
            total_reclaimed: stats.total_reclaimed,
            total_pause_us: stats.total_pause.as_micros() as u64,
        }
    }
}

impl StatsReport {
    pub fn print_human_readable(&self, title: &str) {
        println!("{title}:");
        println!("  Total allocated:  {} bytes", self.bytes_used);
        println!("  Total free:       {} bytes", self.bytes_free);
        if self.over_budget > 0 {
            println!("  Over budget:      {} bytes", self.over_budget);
        }
        println!("  Objects:          {}", self.object_count);
        println!("  Roots:            {}", self.root_count);
        println!("  Edges:            {}", self.edge_count);
        println!("  Collections:      {}", self.collections);
    }
}
