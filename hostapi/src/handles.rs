//! Guest handle tables.
//!
//! The guest names host objects by small integers. Handle `0` (and every
//! negative value) means "no object"; handle `n > 0` names slot `n - 1`.
//! Tables only grow: deleting the host object leaves its slot in place, so a
//! handle resolves to the same object for the life of the table.

use std::fmt;

/// Append-only table mapping 1-origin guest handles to host objects.
#[derive(Clone)]
pub struct HandleTable<T> {
    kind: &'static str,
    slots: Vec<T>,
}

impl<T: Copy + PartialEq> HandleTable<T> {
    /// Create an empty table. `kind` names the resource in diagnostics.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            slots: Vec::new(),
        }
    }

    /// Append `object` and return its handle (the new table length).
    pub fn insert(&mut self, object: T) -> i32 {
        self.slots.push(object);
        self.slots.len() as i32
    }

    /// Resolve a guest handle.
    ///
    /// Returns `None` for `handle <= 0` without touching the table, and for
    /// handles past the end (a guest protocol violation).
    pub fn resolve(&self, handle: i32) -> Option<T> {
        if handle <= 0 {
            return None;
        }
        let object = self.slots.get(handle as usize - 1).copied();
        if object.is_none() {
            log::debug!(
                "{} handle {} was never created ({} allocated)",
                self.kind,
                handle,
                self.slots.len()
            );
        }
        object
    }

    /// Reverse lookup: the guest handle for `object`, or `0` if the object
    /// was never handed to the guest.
    pub fn handle_of(&self, object: &T) -> i32 {
        self.slots
            .iter()
            .position(|slot| slot == object)
            .map_or(0, |index| index as i32 + 1)
    }

    /// Number of handles ever allocated.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no handle has been allocated.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resource kind this table holds.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl<T> fmt::Debug for HandleTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleTable")
            .field("kind", &self.kind)
            .field("len", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_one_origin() {
        let mut table = HandleTable::new("buffer");
        assert_eq!(table.insert('a'), 1);
        assert_eq!(table.insert('b'), 2);
        assert_eq!(table.insert('c'), 3);
        assert_eq!(table.resolve(2), Some('b'));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_non_positive_handles_resolve_to_none() {
        let mut table = HandleTable::new("texture");
        table.insert(7u32);
        for handle in [0, -1, i32::MIN] {
            assert_eq!(table.resolve(handle), None);
        }
    }

    #[test]
    fn test_unknown_handle_resolves_to_none() {
        let mut table = HandleTable::new("shader");
        table.insert(1u32);
        assert_eq!(table.resolve(2), None);
        assert_eq!(table.resolve(i32::MAX), None);
    }

    #[test]
    fn test_reverse_lookup() {
        let mut table = HandleTable::new("program");
        table.insert(10u32);
        table.insert(20u32);
        assert_eq!(table.handle_of(&20), 2);
        assert_eq!(table.handle_of(&10), 1);
        assert_eq!(table.handle_of(&30), 0);
    }

    #[test]
    fn test_duplicate_objects_get_distinct_handles() {
        let mut table = HandleTable::new("uniform location");
        assert_eq!(table.insert(5u32), 1);
        assert_eq!(table.insert(5u32), 2);
        // Reverse lookup finds the first slot.
        assert_eq!(table.handle_of(&5), 1);
    }

    #[test]
    fn test_empty_and_debug() {
        let table: HandleTable<u32> = HandleTable::new("vertex array");
        assert!(table.is_empty());
        assert_eq!(table.kind(), "vertex array");
        assert!(format!("{:?}", table).contains("vertex array"));
    }
}
