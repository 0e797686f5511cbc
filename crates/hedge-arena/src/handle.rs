//! Edge handles and the per-slot state tag.
//!
//! An [`EdgeHandle`] names one *occupancy* of a slot: the slot index plus
//! the generation the slot was at when `allocate()` issued it. The
//! generation makes staleness checks O(1) without a lookup table.

use std::fmt;

use hedge_core::EdgeIndex;

/// Handle to an allocated half-edge record.
///
/// Handles are non-owning: dropping one does not free the slot, and a
/// handle kept past `deallocate()` is detected as stale by every checked
/// arena operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct EdgeHandle {
    pub(crate) index: EdgeIndex,
    pub(crate) generation: u32,
}

impl EdgeHandle {
    pub(crate) fn new(index: EdgeIndex, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot this handle points at.
    pub fn index(&self) -> EdgeIndex {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EdgeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.index, self.generation)
    }
}

/// Packed slot state: `generation << 1 | allocated`.
///
/// Kept in a single `AtomicU64` so that the state flip in `deallocate()`
/// and the generation check in `protect()` observe one value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SlotTag(u64);

impl SlotTag {
    /// Tag of a never-used slot.
    pub(crate) const FRESH: SlotTag = SlotTag(0);

    pub(crate) fn allocated(generation: u32) -> Self {
        Self(((generation as u64) << 1) | 1)
    }

    pub(crate) fn free(generation: u32) -> Self {
        Self((generation as u64) << 1)
    }

    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub(crate) fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn is_allocated(self) -> bool {
        self.0 & 1 == 1
    }

    pub(crate) fn generation(self) -> u32 {
        (self.0 >> 1) as u32
    }

    /// Tag for the next occupancy of a free slot.
    pub(crate) fn next_allocation(self) -> Self {
        debug_assert!(!self.is_allocated());
        Self::allocated(self.generation().wrapping_add(1))
    }
}
