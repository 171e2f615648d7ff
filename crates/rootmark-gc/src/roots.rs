//! Root set

use crate::error::{GcError, Result};
use crate::handle::Handle;

/// Handles the host asserts are always reachable.
///
/// This is a multiset: registering a handle twice needs two removals.
/// Entries naming freed allocations are left in place and skipped by the
/// marker.
#[derive(Debug, Default)]
pub struct RootSet {
    roots: Vec<Handle>,
    limit: Option<usize>,
}

impl RootSet {
    /// Create a root set with an optional entry limit
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            roots: Vec::new(),
            limit,
        }
    }

    /// Append a root
    pub fn register(&mut self, handle: Handle) -> Result<()> {
        match self.limit {
            Some(limit) if self.roots.len() >= limit => {
                return Err(GcError::CapacityExceeded {
                    table: "root",
                    limit,
                });
            }
            _ => {}
        }
        self.roots
            .try_reserve(1)
            .map_err(|_| GcError::OutOfMemory {
                requested: std::mem::size_of::<Handle>(),
            })?;
        self.roots.push(handle);
        Ok(())
    }

    /// Remove the first entry equal to `handle`, keeping the order of the rest
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        let position = self
            .roots
            .iter()
            .position(|&root| root == handle)
            .ok_or(GcError::NotFound(handle))?;
        self.roots.remove(position);
        Ok(())
    }

    /// Check whether `handle` has at least one entry
    pub fn contains(&self, handle: Handle) -> bool {
        self.roots.contains(&handle)
    }

    /// Registered entries, in registration order
    pub fn as_slice(&self) -> &[Handle] {
        &self.roots
    }

    /// Number of entries (duplicates counted)
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if no roots are registered
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.roots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(index: u32) -> Handle {
        Handle::new(1, index, 0)
    }

    #[test]
    fn test_duplicates_need_separate_removal() {
        let mut roots = RootSet::new(None);
        roots.register(h(1)).unwrap();
        roots.register(h(1)).unwrap();
        assert_eq!(roots.len(), 2);

        roots.remove(h(1)).unwrap();
        assert!(roots.contains(h(1)));
        roots.remove(h(1)).unwrap();
        assert!(!roots.contains(h(1)));
        assert_eq!(roots.remove(h(1)), Err(GcError::NotFound(h(1))));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut roots = RootSet::new(None);
        for i in 0..4 {
            roots.register(h(i)).unwrap();
        }
        roots.remove(h(1)).unwrap();
        assert_eq!(roots.as_slice(), &[h(0), h(2), h(3)]);
    }

    #[test]
    fn test_limit() {
        let mut roots = RootSet::new(Some(2));
        roots.register(h(0)).unwrap();
        roots.register(h(1)).unwrap();
        assert_eq!(
            roots.register(h(2)),
            Err(GcError::CapacityExceeded {
                table: "root",
                limit: 2
            })
        );

        // Removing frees a place
        roots.remove(h(0)).unwrap();
        assert!(roots.register(h(2)).is_ok());
    }
}
