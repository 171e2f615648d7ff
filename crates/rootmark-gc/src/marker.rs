//! Mark phase

use rustc_hash::FxHashMap;

use crate::edges::EdgeSet;
use crate::handle::Handle;
use crate::object::ObjectTable;

/// Computes the set of allocations reachable from the roots.
///
/// Traversal is iterative over an explicit work stack, so graph depth is
/// bounded by heap memory rather than the call stack. The mark bit doubles
/// as the visited set, which is what stops cycles.
#[derive(Debug, Default)]
pub struct Marker {
    /// Pending handles, reused across cycles
    worklist: Vec<Handle>,
}

impl Marker {
    /// Create a new marker
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every mark, then mark from each root.
    ///
    /// Returns the number of objects marked.
    pub fn mark_reachable(
        &mut self,
        objects: &mut ObjectTable,
        roots: &[Handle],
        edges: &EdgeSet,
    ) -> usize {
        objects.reset_marks();

        // Build trace lookup (once per cycle)
        let adjacency = edges.adjacency();

        roots
            .iter()
            .map(|&root| self.mark_with(objects, &adjacency, root))
            .sum()
    }

    /// Mark `handle` and everything reachable from it without resetting
    /// existing marks. Returns the number of newly marked objects.
    pub fn mark(&mut self, objects: &mut ObjectTable, edges: &EdgeSet, handle: Handle) -> usize {
        let adjacency = edges.adjacency();
        self.mark_with(objects, &adjacency, handle)
    }

    fn mark_with(
        &mut self,
        objects: &mut ObjectTable,
        adjacency: &FxHashMap<Handle, Vec<Handle>>,
        start: Handle,
    ) -> usize {
        let mut marked = 0;
        self.worklist.clear();
        self.worklist.push(start);

        while let Some(handle) = self.worklist.pop() {
            // Stale or unknown handles are inert
            let Some(object) = objects.get_mut(handle) else {
                continue;
            };
            if object.is_marked() {
                continue;
            }
            object.set_marked(true);
            marked += 1;

            if let Some(children) = adjacency.get(&handle) {
                self.worklist.extend(
                    children
                        .iter()
                        .copied()
                        .filter(|&child| objects.get(child).is_some_and(|o| !o.is_marked())),
                );
            }
        }

        marked
    }
}
