//! Managed allocations and the object table

use crate::error::{GcError, Result};
use crate::handle::Handle;

/// One host-visible buffer owned by the collector
#[derive(Debug)]
pub struct ManagedObject {
    /// Reached during the current mark phase
    marked: bool,
    payload: Box<[u8]>,
}

impl ManagedObject {
    /// Wrap a payload buffer.
    ///
    /// New objects start marked: they stay live until the next mark phase
    /// decides about them, so an out-of-band sweep never takes them.
    pub fn new(payload: Box<[u8]>) -> Self {
        Self {
            marked: true,
            payload,
        }
    }

    /// Payload length in bytes
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Get mark bit
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    /// Set mark bit
    pub fn set_marked(&mut self, marked: bool) {
        self.marked = marked;
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Mutable payload bytes
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }

    /// Swap in a new payload, returning the old one
    pub fn replace_payload(&mut self, payload: Box<[u8]>) -> Box<[u8]> {
        std::mem::replace(&mut self.payload, payload)
    }
}

struct Slot {
    generation: u32,
    object: Option<ManagedObject>,
}

/// Slot table of live allocations.
///
/// Lookups go through the handle's slot index and are checked against the
/// slot generation, so they are O(1) and never hit a recycled slot.
pub struct ObjectTable {
    collector: u32,
    slots: Vec<Slot>,
    /// Vacant slot indices ready for reuse
    free: Vec<u32>,
    live: usize,
}

impl ObjectTable {
    /// Create an empty table for the given collector id
    pub fn new(collector: u32) -> Self {
        Self {
            collector,
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Add an object, returning its handle
    pub fn insert(&mut self, object: ManagedObject) -> Result<Handle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.object.is_none());
            slot.object = Some(object);
            self.live += 1;
            return Ok(Handle::new(self.collector, index, slot.generation));
        }

        let index = u32::try_from(self.slots.len()).map_err(|_| GcError::CapacityExceeded {
            table: "object",
            limit: u32::MAX as usize,
        })?;
        self.slots
            .try_reserve(1)
            .map_err(|_| GcError::OutOfMemory {
                requested: std::mem::size_of::<Slot>(),
            })?;
        self.slots.push(Slot {
            generation: 0,
            object: Some(object),
        });
        self.live += 1;
        Ok(Handle::new(self.collector, index, 0))
    }

    /// Resolve a handle to its slot, if the handle is current
    fn slot_of(&self, handle: Handle) -> Option<&Slot> {
        if handle.collector() != self.collector {
            return None;
        }
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
    }

    /// Get the live object for a handle
    pub fn get(&self, handle: Handle) -> Option<&ManagedObject> {
        self.slot_of(handle).and_then(|slot| slot.object.as_ref())
    }

    /// Get the live object for a handle, mutably
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut ManagedObject> {
        if handle.collector() != self.collector {
            return None;
        }
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.object.as_mut())
    }

    /// Like [`get`](Self::get) but a miss is an error
    pub fn find(&self, handle: Handle) -> Result<&ManagedObject> {
        self.get(handle).ok_or(GcError::NotFound(handle))
    }

    /// Like [`get_mut`](Self::get_mut) but a miss is an error
    pub fn find_mut(&mut self, handle: Handle) -> Result<&mut ManagedObject> {
        self.get_mut(handle).ok_or(GcError::NotFound(handle))
    }

    /// Check whether a handle names a live object
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Remove an object and retire its handle
    pub fn remove(&mut self, handle: Handle) -> Option<ManagedObject> {
        if handle.collector() != self.collector {
            return None;
        }
        let index = handle.index();
        let slot = self
            .slots
            .get_mut(index)
            .filter(|slot| slot.generation == handle.generation())?;
        let object = slot.object.take()?;
        self.live -= 1;

        // An exhausted slot is never reused so no generation comes round again
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free.push(index as u32);
        }
        Some(object)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the table has no live objects
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate live objects with their handles
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &ManagedObject)> + '_ {
        let collector = self.collector;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.object
                .as_ref()
                .map(|object| (Handle::new(collector, index as u32, slot.generation), object))
        })
    }

    /// Clear every mark bit
    pub fn reset_marks(&mut self) {
        for object in self.slots.iter_mut().filter_map(|slot| slot.object.as_mut()) {
            object.set_marked(false);
        }
    }

    /// Handles of every object left unmarked
    pub fn unmarked(&self) -> Vec<Handle> {
        self.iter()
            .filter(|(_, object)| !object.is_marked())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Remove every object. Returns (objects, bytes) released.
    pub fn clear(&mut self) -> (usize, usize) {
        let live: Vec<Handle> = self.iter().map(|(handle, _)| handle).collect();
        let mut bytes = 0;
        for handle in &live {
            if let Some(object) = self.remove(*handle) {
                bytes += object.size();
            }
        }
        (live.len(), bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(size: usize) -> ManagedObject {
        ManagedObject::new(vec![0u8; size].into_boxed_slice())
    }

    #[test]
    fn test_new_object_is_marked() {
        let obj = object(8);
        assert!(obj.is_marked());
        assert_eq!(obj.size(), 8);
    }

    #[test]
    fn test_insert_and_find() {
        let mut table = ObjectTable::new(1);
        let a = table.insert(object(16)).unwrap();
        let b = table.insert(object(32)).unwrap();

        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
        assert_eq!(table.find(a).unwrap().size(), 16);
        assert_eq!(table.find(b).unwrap().size(), 32);
    }

    #[test]
    fn test_removed_handle_is_stale_after_reuse() {
        let mut table = ObjectTable::new(1);
        let a = table.insert(object(16)).unwrap();
        assert!(table.remove(a).is_some());

        let b = table.insert(object(24)).unwrap();
        // Same slot, new generation
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert!(table.get(a).is_none());
        assert_eq!(table.find(a).unwrap_err(), GcError::NotFound(a));
        assert_eq!(table.find(b).unwrap().size(), 24);
        assert!(table.remove(a).is_none());
    }

    #[test]
    fn test_foreign_handle_not_found() {
        let mut table = ObjectTable::new(1);
        let mut other = ObjectTable::new(2);
        let a = table.insert(object(8)).unwrap();
        other.insert(object(8)).unwrap();

        assert!(other.get(a).is_none());
        assert!(other.remove(a).is_none());
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_reset_marks_and_unmarked() {
        let mut table = ObjectTable::new(1);
        let a = table.insert(object(8)).unwrap();
        let b = table.insert(object(8)).unwrap();
        assert!(table.unmarked().is_empty());

        table.reset_marks();
        table.find_mut(a).unwrap().set_marked(true);
        assert_eq!(table.unmarked(), vec![b]);
    }

    #[test]
    fn test_clear() {
        let mut table = ObjectTable::new(1);
        table.insert(object(10)).unwrap();
        table.insert(object(20)).unwrap();

        assert_eq!(table.clear(), (2, 30));
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
