//! Mark-sweep garbage collector

use std::ffi::CStr;
use std::time::Instant;

use crate::allocator::Allocator;
use crate::config::GcConfig;
use crate::edges::EdgeSet;
use crate::error::{GcError, Result};
use crate::handle::{Handle, next_collector_id};
use crate::marker::Marker;
use crate::object::{ManagedObject, ObjectTable};
use crate::roots::RootSet;
use crate::stats::{CollectionCounters, GcStats};
use crate::sweeper::{self, SweepOutcome};

/// Garbage collector
///
/// Owns every payload buffer it hands out. The host names allocations by
/// [`Handle`] and declares roots and edges explicitly; nothing in a payload
/// is ever scanned for references.
pub struct Collector {
    id: u32,
    config: GcConfig,
    allocator: Allocator,
    objects: ObjectTable,
    roots: RootSet,
    edges: EdgeSet,
    marker: Marker,
    counters: CollectionCounters,
}

impl Collector {
    /// Create a collector with the given heap budget (zero means 1MB)
    ///
    /// # Panics
    ///
    /// Panics if the process has already created `u32::MAX` collectors.
    /// Use [`Collector::with_config`] to get an error instead.
    pub fn new(heap_budget: usize) -> Self {
        Self::build(GcConfig::with_heap_budget(heap_budget)).expect("collector ids exhausted")
    }

    /// Create a collector with a custom config
    pub fn with_config(config: GcConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        Self::build(config)
    }

    fn build(config: GcConfig) -> Result<Self> {
        let id = next_collector_id().ok_or(GcError::CapacityExceeded {
            table: "collector",
            limit: u32::MAX as usize,
        })?;
        tracing::debug!(
            target: "rootmark::gc",
            collector = id,
            heap_budget = config.heap_budget,
            trigger_ratio = config.trigger_ratio,
            "Collector initialized"
        );
        Ok(Self {
            id,
            allocator: Allocator::new(&config),
            objects: ObjectTable::new(id),
            roots: RootSet::new(config.max_roots),
            edges: EdgeSet::new(config.max_edges),
            marker: Marker::new(),
            counters: CollectionCounters::default(),
            config,
        })
    }

    /// Get config
    pub fn config(&self) -> &GcConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Allocation
    // ---------------------------------------------------------------

    /// Allocate a zero-filled buffer of `size` bytes.
    ///
    /// Runs a full collection first when occupancy is above the trigger
    /// ratio. The budget is not a hard limit, so the allocation is granted
    /// even if the collection frees too little.
    pub fn allocate(&mut self, size: usize) -> Result<Handle> {
        if size == 0 {
            return Err(GcError::InvalidArgument("allocation size must be non-zero"));
        }
        self.collect_if_needed();
        let payload = self.allocator.buffer(size)?;
        self.adopt(payload)
    }

    /// Allocate a zero-filled array of `count` elements
    pub fn allocate_array(&mut self, count: usize, element_size: usize) -> Result<Handle> {
        if count == 0 || element_size == 0 {
            return Err(GcError::InvalidArgument(
                "array count and element size must be non-zero",
            ));
        }
        let size = count
            .checked_mul(element_size)
            .ok_or(GcError::Overflow {
                count,
                element_size,
            })?;
        self.allocate(size)
    }

    /// Copy `text` into a new NUL-terminated allocation
    pub fn duplicate_string(&mut self, text: &str) -> Result<Handle> {
        let bytes = text.as_bytes();
        let handle = self.allocate(bytes.len() + 1)?;
        let payload = self.objects.find_mut(handle)?.payload_mut();
        payload[..bytes.len()].copy_from_slice(bytes);
        payload[bytes.len()] = 0;
        Ok(handle)
    }

    /// Resize an allocation.
    ///
    /// - `None` allocates `new_size` bytes.
    /// - `new_size == 0` frees the allocation and returns `None`. Only the
    ///   target is freed; other unreachable allocations wait for `collect`.
    /// - Otherwise the contents move to a fresh buffer (truncated or
    ///   zero-extended) and the same handle is returned. Roots and edges
    ///   naming the handle stay valid.
    pub fn reallocate(&mut self, handle: Option<Handle>, new_size: usize) -> Result<Option<Handle>> {
        let Some(handle) = handle else {
            return self.allocate(new_size).map(Some);
        };
        if new_size == 0 {
            self.free(handle)?;
            return Ok(None);
        }

        // Collect before resolving so an unreachable handle fails cleanly
        self.collect_if_needed();
        let old_size = self.objects.find(handle)?.size();
        let mut payload = self.allocator.buffer(new_size)?;

        let object = self.objects.find_mut(handle)?;
        let keep = old_size.min(new_size);
        payload[..keep].copy_from_slice(&object.payload()[..keep]);
        drop(object.replace_payload(payload));

        self.allocator.release(old_size);
        self.allocator.charge(new_size);

        tracing::trace!(
            target: "rootmark::gc",
            handle = %handle,
            old_size,
            new_size,
            "Reallocated"
        );
        Ok(Some(handle))
    }

    /// Free one allocation now. Returns the bytes reclaimed.
    ///
    /// The allocation is unmarked and a sweep runs immediately. Every other
    /// live allocation is marked outside a collection cycle, so only this
    /// one is taken. Edges naming it are dropped; roots naming it linger as
    /// inert entries.
    pub fn free(&mut self, handle: Handle) -> Result<usize> {
        self.objects.find_mut(handle)?.set_marked(false);
        let outcome = self.sweep();
        self.counters.record_free(outcome.bytes_reclaimed);
        Ok(outcome.bytes_reclaimed)
    }

    fn adopt(&mut self, payload: Box<[u8]>) -> Result<Handle> {
        let size = payload.len();
        let handle = self.objects.insert(ManagedObject::new(payload))?;
        self.allocator.charge(size);

        tracing::trace!(
            target: "rootmark::gc",
            handle = %handle,
            size,
            bytes_used = self.allocator.bytes_used(),
            "Allocated"
        );
        Ok(handle)
    }

    fn collect_if_needed(&mut self) {
        if !self.allocator.should_collect() {
            return;
        }
        self.collect();

        if self.allocator.over_budget() > 0 {
            tracing::warn!(
                target: "rootmark::gc",
                bytes_used = self.allocator.bytes_used(),
                heap_budget = self.allocator.heap_budget(),
                "Live data exceeds heap budget after collection"
            );
        }
    }

    // ---------------------------------------------------------------
    // Roots and edges
    // ---------------------------------------------------------------

    /// Register a root. Registering the same handle twice adds two entries.
    pub fn register_root(&mut self, handle: Handle) -> Result<()> {
        self.roots.register(handle)
    }

    /// Remove the first root entry for `handle`
    pub fn remove_root(&mut self, handle: Handle) -> Result<()> {
        self.roots.remove(handle)
    }

    /// Check whether `handle` is registered as a root
    pub fn is_root(&self, handle: Handle) -> bool {
        self.roots.contains(handle)
    }

    /// Declare that `from` references `to`. Neither end is validated.
    pub fn register_edge(&mut self, from: Handle, to: Handle) -> Result<()> {
        self.edges.register(from, to)
    }

    /// Remove one `from -> to` edge
    pub fn remove_edge(&mut self, from: Handle, to: Handle) -> Result<()> {
        self.edges.remove(from, to)
    }

    // ---------------------------------------------------------------
    // Collection
    // ---------------------------------------------------------------

    /// Run a full mark/sweep cycle. Returns the bytes reclaimed.
    pub fn collect(&mut self) -> usize {
        let start = Instant::now();
        let initial_bytes = self.allocator.bytes_used();
        let initial_count = self.objects.len();

        tracing::debug!(
            target: "rootmark::gc",
            roots = self.roots.len(),
            edges = self.edges.len(),
            heap_bytes = initial_bytes,
            objects = initial_count,
            "GC cycle starting"
        );

        // Phase 1: Reset marks and trace from roots
        let marked = self
            .marker
            .mark_reachable(&mut self.objects, self.roots.as_slice(), &self.edges);

        // Phase 2: Sweep unmarked objects
        let outcome = self.sweep();

        let elapsed = start.elapsed();
        self.counters
            .record_cycle(marked, outcome.bytes_reclaimed, elapsed);

        tracing::info!(
            target: "rootmark::gc",
            collection = self.counters.collections,
            reclaimed_bytes = outcome.bytes_reclaimed,
            pause_us = elapsed.as_micros() as u64,
            live_bytes = self.allocator.bytes_used(),
            live_objects = self.objects.len(),
            freed_objects = outcome.objects_freed,
            edges_removed = outcome.edges_removed,
            "GC cycle complete"
        );

        outcome.bytes_reclaimed
    }

    fn sweep(&mut self) -> SweepOutcome {
        let outcome = sweeper::sweep(&mut self.objects, &mut self.edges);
        self.allocator.release(outcome.bytes_reclaimed);
        outcome
    }

    // ---------------------------------------------------------------
    // Payload access
    // ---------------------------------------------------------------

    /// Check whether `handle` names a live allocation
    pub fn contains(&self, handle: Handle) -> bool {
        self.objects.contains(handle)
    }

    /// Payload length in bytes
    pub fn size_of(&self, handle: Handle) -> Result<usize> {
        Ok(self.objects.find(handle)?.size())
    }

    /// Payload bytes
    pub fn payload(&self, handle: Handle) -> Result<&[u8]> {
        Ok(self.objects.find(handle)?.payload())
    }

    /// Mutable payload bytes
    pub fn payload_mut(&mut self, handle: Handle) -> Result<&mut [u8]> {
        Ok(self.objects.find_mut(handle)?.payload_mut())
    }

    /// Read a payload as a NUL-terminated string
    pub fn c_str(&self, handle: Handle) -> Result<&CStr> {
        CStr::from_bytes_until_nul(self.payload(handle)?)
            .map_err(|_| GcError::InvalidArgument("payload has no NUL terminator"))
    }

    // ---------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------

    /// Get statistics
    pub fn stats(&self) -> GcStats {
        GcStats {
            bytes_used: self.allocator.bytes_used(),
            bytes_free: self.allocator.bytes_free(),
            over_budget: self.allocator.over_budget(),
            heap_budget: self.allocator.heap_budget(),
            object_count: self.objects.len(),
            root_count: self.roots.len(),
            edge_count: self.edges.len(),
            collections: self.counters.collections,
            last_marked: self.counters.last_marked,
            last_reclaimed: self.counters.last_reclaimed,
            total_reclaimed: self.counters.total_reclaimed,
            last_pause: self.counters.last_pause,
            total_pause: self.counters.total_pause,
        }
    }

    /// `(bytes_used, bytes_free, object_count)`
    pub fn statistics(&self) -> (usize, usize, usize) {
        (
            self.allocator.bytes_used(),
            self.allocator.bytes_free(),
            self.objects.len(),
        )
    }

    /// Number of collections performed
    pub fn collections(&self) -> u64 {
        self.counters.collections
    }

    /// Number of live allocations
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Bytes currently allocated
    pub fn bytes_used(&self) -> usize {
        self.allocator.bytes_used()
    }

    // ---------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------

    /// Free every allocation and the collector itself.
    ///
    /// Returns the bytes released.
    pub fn finalize(mut self) -> usize {
        self.release_all()
    }

    fn release_all(&mut self) -> usize {
        let (objects, bytes) = self.objects.clear();
        self.roots.clear();
        self.edges.clear();
        self.allocator.release(bytes);

        if objects > 0 {
            tracing::debug!(
                target: "rootmark::gc",
                collector = self.id,
                objects,
                bytes,
                "Released all allocations"
            );
        }
        bytes
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.release_all();
    }
}
