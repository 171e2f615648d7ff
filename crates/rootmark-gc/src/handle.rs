//! Opaque allocation handles
//!
//! The host never sees a payload address. Every allocation is named by a
//! [`Handle`]: the id of the owning collector, the slot the allocation lives
//! in, and the generation of that slot. Freeing an allocation advances the
//! slot generation, so old copies of the handle stop resolving even after
//! the slot is reused.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_COLLECTOR_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a process-unique collector id, or `None` once ids run out
pub(crate) fn next_collector_id() -> Option<u32> {
    claim_id(&NEXT_COLLECTOR_ID)
}

/// Ids never wrap, so a retired id is never handed out twice
fn claim_id(counter: &AtomicU32) -> Option<u32> {
    counter
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
        .ok()
}

/// Stable name for a managed allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    collector: u32,
    index: u32,
    generation: u32,
}

impl Handle {
    pub(crate) const fn new(collector: u32, index: u32, generation: u32) -> Self {
        Self {
            collector,
            index,
            generation,
        }
    }

    /// Id of the collector that issued this handle
    pub(crate) fn collector(self) -> u32 {
        self.collector
    }

    /// Slot index in the object table
    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    /// Slot generation at the time the handle was issued
    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}v{}", self.collector, self.index, self.generation)
    }
}
