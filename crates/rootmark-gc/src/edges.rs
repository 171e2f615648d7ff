//! Edge set: host-declared references between allocations

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{GcError, Result};
use crate::handle::Handle;

/// "The allocation at `from` holds a reference to the allocation at `to`"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Referencing allocation
    pub from: Handle,
    /// Referenced allocation
    pub to: Handle,
}

/// Unordered collection of edges. Duplicates are allowed.
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: Vec<Edge>,
    limit: Option<usize>,
}

impl EdgeSet {
    /// Create an edge set with an optional record limit
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            edges: Vec::new(),
            limit,
        }
    }

    /// Append an edge. Neither end is checked against the object table.
    pub fn register(&mut self, from: Handle, to: Handle) -> Result<()> {
        match self.limit {
            Some(limit) if self.edges.len() >= limit => {
                return Err(GcError::CapacityExceeded {
                    table: "edge",
                    limit,
                });
            }
            _ => {}
        }
        self.edges
            .try_reserve(1)
            .map_err(|_| GcError::OutOfMemory {
                requested: std::mem::size_of::<Edge>(),
            })?;
        self.edges.push(Edge { from, to });
        Ok(())
    }

    /// Remove the first edge equal to (from, to)
    pub fn remove(&mut self, from: Handle, to: Handle) -> Result<()> {
        let position = self
            .edges
            .iter()
            .position(|edge| edge.from == from && edge.to == to)
            .ok_or(GcError::NotFound(from))?;
        self.edges.swap_remove(position);
        Ok(())
    }

    /// Remove every edge with `handle` at either end. Returns the count removed.
    ///
    /// Single-handle form of [`EdgeSet::remove_edges_touching`], used when a
    /// sweep frees exactly one allocation.
    pub fn remove_edges_for(&mut self, handle: Handle) -> usize {
        self.remove_where(|h| h == handle)
    }

    /// Remove every edge with an end in `dead`. Returns the count removed.
    pub fn remove_edges_touching(&mut self, dead: &FxHashSet<Handle>) -> usize {
        if dead.is_empty() {
            return 0;
        }
        self.remove_where(|h| dead.contains(&h))
    }

    /// Swap-with-last compaction; order of the survivors is not kept
    fn remove_where(&mut self, mut doomed: impl FnMut(Handle) -> bool) -> usize {
        let before = self.edges.len();
        let mut i = 0;
        while i < self.edges.len() {
            let edge = self.edges[i];
            if doomed(edge.from) || doomed(edge.to) {
                self.edges.swap_remove(i);
            } else {
                i += 1;
            }
        }
        before - self.edges.len()
    }

    /// Build a `from -> [to]` lookup for one mark phase.
    ///
    /// Built once per cycle so each edge is visited once instead of
    /// rescanning the whole list for every marked object.
    pub fn adjacency(&self) -> FxHashMap<Handle, Vec<Handle>> {
        let mut map: FxHashMap<Handle, Vec<Handle>> = FxHashMap::default();
        for edge in &self.edges {
            map.entry(edge.from).or_default().push(edge.to);
        }
        map
    }

    /// Iterate the edges in storage order
    pub fn iter(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges.iter()
    }

    /// Number of edge records
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if there are no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Drop every edge
    pub fn clear(&mut self) {
        self.edges.clear();
    }
}
