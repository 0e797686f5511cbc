//! The half-edge record stored in every arena slot.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use hedge_core::{EdgeIndex, VertexHandle, INVALID_INDEX};

/// One half-edge: links to its twin, successor and predecessor on the face
/// loop, the vertex it starts at, and the slot it occupies.
///
/// Every field is an independent atomic so records can be wired through
/// shared references while other threads allocate from the same arena.
/// Links are slot indices, never addresses; an unset link reads as `None`.
///
/// The arena resets all link fields when the record is deallocated, so a
/// freshly allocated record always starts unset.
pub struct HalfEdgeRecord {
    twin: AtomicU32,
    next: AtomicU32,
    prev: AtomicU32,
    vertex: AtomicU32,
    slot: AtomicU32,
}

impl HalfEdgeRecord {
    pub(crate) fn new() -> Self {
        Self {
            twin: AtomicU32::new(INVALID_INDEX),
            next: AtomicU32::new(INVALID_INDEX),
            prev: AtomicU32::new(INVALID_INDEX),
            vertex: AtomicU32::new(INVALID_INDEX),
            slot: AtomicU32::new(INVALID_INDEX),
        }
    }

    /// The oppositely oriented half-edge, if wired.
    pub fn twin(&self) -> Option<EdgeIndex> {
        EdgeIndex::unpack(self.twin.load(Ordering::Acquire))
    }

    /// The next half-edge around the face, if wired.
    pub fn next(&self) -> Option<EdgeIndex> {
        EdgeIndex::unpack(self.next.load(Ordering::Acquire))
    }

    /// The previous half-edge around the face, if wired.
    pub fn prev(&self) -> Option<EdgeIndex> {
        EdgeIndex::unpack(self.prev.load(Ordering::Acquire))
    }

    /// The origin vertex, if wired.
    pub fn vertex(&self) -> Option<VertexHandle> {
        VertexHandle::unpack(self.vertex.load(Ordering::Acquire))
    }

    /// The arena slot this record currently occupies.
    ///
    /// `None` only for storage that has never been issued.
    pub fn slot(&self) -> Option<EdgeIndex> {
        EdgeIndex::unpack(self.slot.load(Ordering::Acquire))
    }

    /// Set or clear the twin link.
    pub fn set_twin(&self, twin: Option<EdgeIndex>) {
        self.twin.store(EdgeIndex::pack(twin), Ordering::Release);
    }

    /// Set or clear the next link.
    pub fn set_next(&self, next: Option<EdgeIndex>) {
        self.next.store(EdgeIndex::pack(next), Ordering::Release);
    }

    /// Set or clear the prev link.
    pub fn set_prev(&self, prev: Option<EdgeIndex>) {
        self.prev.store(EdgeIndex::pack(prev), Ordering::Release);
    }

    /// Set or clear the origin vertex.
    pub fn set_vertex(&self, vertex: Option<VertexHandle>) {
        self.vertex.store(VertexHandle::pack(vertex), Ordering::Release);
    }

    pub(crate) fn set_slot(&self, slot: EdgeIndex) {
        self.slot.store(slot.0, Ordering::Release);
    }

    /// Clear twin, next, prev and vertex. The slot index is kept.
    pub(crate) fn reset(&self) {
        self.twin.store(INVALID_INDEX, Ordering::Release);
        self.next.store(INVALID_INDEX, Ordering::Release);
        self.prev.store(INVALID_INDEX, Ordering::Release);
        self.vertex.store(INVALID_INDEX, Ordering::Release);
    }

    /// Whether twin, next, prev and vertex are all unset.
    pub fn is_unset(&self) -> bool {
        self.twin().is_none()
            && self.next().is_none()
            && self.prev().is_none()
            && self.vertex().is_none()
    }

    /// Plain-value copy of all fields.
    ///
    /// Each field is read independently; under concurrent writers the
    /// result may mix values from different moments.
    pub fn load(&self) -> RecordFields {
        RecordFields {
            twin: self.twin(),
            next: self.next(),
            prev: self.prev(),
            vertex: self.vertex(),
            slot: self.slot(),
        }
    }
}

impl fmt::Debug for HalfEdgeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

/// Snapshot of a [`HalfEdgeRecord`]'s fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordFields {
    /// Twin link.
    pub twin: Option<EdgeIndex>,
    /// Next link.
    pub next: Option<EdgeIndex>,
    /// Prev link.
    pub prev: Option<EdgeIndex>,
    /// Origin vertex.
    pub vertex: Option<VertexHandle>,
    /// Occupied slot.
    pub slot: Option<EdgeIndex>,
}
