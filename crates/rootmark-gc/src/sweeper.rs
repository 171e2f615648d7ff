//! Sweep phase

use rustc_hash::FxHashSet;

use crate::edges::EdgeSet;
use crate::handle::Handle;
use crate::object::ObjectTable;

/// What one sweep released
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Payload bytes freed
    pub bytes_reclaimed: usize,
    /// Allocations freed
    pub objects_freed: usize,
    /// Edge records dropped because an end was freed
    pub edges_removed: usize,
}

/// Free every unmarked allocation and the edges naming it.
///
/// Marked allocations are left in place; their marks are cleared by the
/// next mark phase.
pub fn sweep(objects: &mut ObjectTable, edges: &mut EdgeSet) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();
    let mut dead: Vec<Handle> = Vec::new();

    for handle in objects.unmarked() {
        if let Some(object) = objects.remove(handle) {
            outcome.bytes_reclaimed += object.size();
            outcome.objects_freed += 1;
            dead.push(handle);

            tracing::trace!(
                target: "rootmark::gc",
                handle = %handle,
                size = object.size(),
                "Freed allocation"
            );
        }
    }

    // One pass over the edge list whatever the batch size
    outcome.edges_removed = match dead.as_slice() {
        [] => 0,
        [only] => edges.remove_edges_for(*only),
        _ => edges.remove_edges_touching(&dead.iter().copied().collect::<FxHashSet<_>>()),
    };
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::Edge;
    use crate::object::ManagedObject;

    fn insert(table: &mut ObjectTable, size: usize) -> Handle {
        table
            .insert(ManagedObject::new(vec![0u8; size].into_boxed_slice()))
            .unwrap()
    }

    #[test]
    fn test_sweep_frees_only_unmarked() {
        let mut table = ObjectTable::new(4);
        let mut edges = EdgeSet::new(None);
        let keep = insert(&mut table, 10);
        let drop1 = insert(&mut table, 20);
        let drop2 = insert(&mut table, 30);
        edges.register(keep, drop1).unwrap();
        edges.register(drop2, keep).unwrap();
        edges.register(keep, keep).unwrap();

        table.reset_marks();
        table.find_mut(keep).unwrap().set_marked(true);

        let outcome = sweep(&mut table, &mut edges);
        assert_eq!(outcome.bytes_reclaimed, 50);
        assert_eq!(outcome.objects_freed, 2);
        assert_eq!(outcome.edges_removed, 2);
        assert!(table.contains(keep));
        assert!(!table.contains(drop1));
        assert!(!table.contains(drop2));
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_sweep_twice_is_idempotent() {
        let mut table = ObjectTable::new(4);
        let mut edges = EdgeSet::new(None);
        insert(&mut table, 10);
        table.reset_marks();

        assert_eq!(sweep(&mut table, &mut edges).bytes_reclaimed, 10);
        assert_eq!(sweep(&mut table, &mut edges), SweepOutcome::default());
    }

    #[test]
    fn test_sweep_single_dead_object_drops_its_edges() {
        let mut table = ObjectTable::new(4);
        let mut edges = EdgeSet::new(None);
        let keep = insert(&mut table, 8);
        let doomed = insert(&mut table, 16);
        edges.register(keep, doomed).unwrap();
        edges.register(doomed, doomed).unwrap();
        edges.register(keep, keep).unwrap();

        table.find_mut(doomed).unwrap().set_marked(false);

        let outcome = sweep(&mut table, &mut edges);
        assert_eq!(outcome.objects_freed, 1);
        assert_eq!(outcome.edges_removed, 2);
        assert_eq!(edges.iter().collect::<Vec<_>>(), vec![&Edge { from: keep, to: keep }]);
    }
}
