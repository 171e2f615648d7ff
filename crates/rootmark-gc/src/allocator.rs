//! Payload allocation and heap accounting

use crate::config::GcConfig;
use crate::error::{GcError, Result};

/// Tracks bytes in use against the heap budget and hands out payload buffers.
///
/// The budget is a collection policy, not a hard cap: `should_collect`
/// tells the collector to run a cycle first, but allocation proceeds
/// whatever the cycle reclaims.
#[derive(Debug)]
pub struct Allocator {
    heap_budget: usize,
    trigger_ratio: f64,
    bytes_used: usize,
}

impl Allocator {
    /// Create allocator for a config
    pub fn new(config: &GcConfig) -> Self {
        Self {
            heap_budget: config.heap_budget,
            trigger_ratio: config.trigger_ratio,
            bytes_used: 0,
        }
    }

    /// Check if occupancy is above the trigger ratio
    pub fn should_collect(&self) -> bool {
        let used = self.bytes_used as f64;
        let threshold = self.heap_budget as f64 * self.trigger_ratio;
        used > threshold
    }

    /// Allocate a zero-filled payload buffer.
    ///
    /// Exhaustion is reported as `OutOfMemory` instead of aborting.
    pub fn buffer(&self, size: usize) -> Result<Box<[u8]>> {
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| GcError::OutOfMemory { requested: size })?;
        buffer.resize(size, 0u8);
        Ok(buffer.into_boxed_slice())
    }

    /// Account for a new allocation
    pub fn charge(&mut self, size: usize) {
        self.bytes_used = self.bytes_used.saturating_add(size);
    }

    /// Account for freed bytes
    pub fn release(&mut self, size: usize) {
        debug_assert!(size <= self.bytes_used);
        self.bytes_used = self.bytes_used.saturating_sub(size);
    }

    /// Bytes currently in use
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Heap budget in bytes
    pub fn heap_budget(&self) -> usize {
        self.heap_budget
    }

    /// Budget left, clamped at zero when usage is over budget
    pub fn bytes_free(&self) -> usize {
        self.heap_budget.saturating_sub(self.bytes_used)
    }

    /// Bytes in use beyond the budget
    pub fn over_budget(&self) -> usize {
        self.bytes_used.saturating_sub(self.heap_budget)
    }
}
