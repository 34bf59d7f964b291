//! Identifiers and a simple allocator for queued units.

use serde::{Deserialize, Serialize};

/// Identifies one queued playback of a clip. The same clip appended twice
/// yields two distinct ids.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Monotonic allocator for UnitId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_unit: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_unit(&mut self) -> UnitId {
        let id = UnitId(self.next_unit);
        self.next_unit = self.next_unit.wrapping_add(1);
        id
    }
}
