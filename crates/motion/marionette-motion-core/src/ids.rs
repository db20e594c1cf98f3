//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Handle to one live playback inside a [`MotionManager`](crate::MotionManager).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u32);

/// Monotonic allocator for EntryId.
/// Ids are never reused within one allocator, so a stale handle cannot alias
/// a newer playback.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_entry: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_entry(&mut self) -> EntryId {
        let id = EntryId(self.next_entry);
        self.next_entry = self.next_entry.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
