//! Strongly-typed identifiers for edges and vertices.
//!
//! Both identifiers are dense `u32` indices. Link fields that may be unset
//! are stored in atomics as a raw `u32`, with [`INVALID_INDEX`] standing in
//! for `None`; [`EdgeIndex::pack`] / [`EdgeIndex::unpack`] (and the
//! [`VertexHandle`] equivalents) convert between the two forms.

use std::fmt;

/// Raw sentinel meaning "no index". Never handed out as a real slot.
pub const INVALID_INDEX: u32 = u32::MAX;

/// Physical slot index of a half-edge record inside a slot arena.
///
/// Indices are global across blocks: slot `i` lives in block
/// `i / block_capacity` at offset `i % block_capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIndex(pub u32);

impl EdgeIndex {
    /// Largest index that can be issued (one below the sentinel).
    pub const MAX: u32 = INVALID_INDEX - 1;

    /// The index as a `usize`, for slicing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Encode an optional index as a raw `u32` for atomic storage.
    #[inline]
    pub fn pack(index: Option<Self>) -> u32 {
        match index {
            Some(EdgeIndex(raw)) => {
                debug_assert_ne!(raw, INVALID_INDEX, "sentinel used as a real edge index");
                raw
            }
            None => INVALID_INDEX,
        }
    }

    /// Decode a raw `u32` written by [`pack`](Self::pack).
    #[inline]
    pub fn unpack(raw: u32) -> Option<Self> {
        (raw != INVALID_INDEX).then_some(EdgeIndex(raw))
    }
}

impl fmt::Display for EdgeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl From<u32> for EdgeIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identity of an interned point.
///
/// Handles are issued in insertion order by the vertex interner and are
/// never recycled, so two handles are equal exactly when they name the same
/// point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexHandle(pub u32);

impl VertexHandle {
    /// The handle as a `usize`, for slicing.
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Encode an optional handle as a raw `u32` for atomic storage.
    #[inline]
    pub fn pack(handle: Option<Self>) -> u32 {
        match handle {
            Some(VertexHandle(raw)) => {
                debug_assert_ne!(raw, INVALID_INDEX, "sentinel used as a real vertex handle");
                raw
            }
            None => INVALID_INDEX,
        }
    }

    /// Decode a raw `u32` written by [`pack`](Self::pack).
    #[inline]
    pub fn unpack(raw: u32) -> Option<Self> {
        (raw != INVALID_INDEX).then_some(VertexHandle(raw))
    }
}

impl fmt::Display for VertexHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u32> for VertexHandle {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
