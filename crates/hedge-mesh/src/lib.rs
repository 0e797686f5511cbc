//! Mesh-level structures over the hedge slot arena.
//!
//! - [`VertexInterner`] deduplicates vertex positions into dense
//!   [`VertexHandle`](hedge_core::VertexHandle)s.
//! - [`FaceLoopBuilder`] wires half-edge records into a closed face loop
//!   and validates it into a [`FaceLoop`].
//! - [`Mesh`] owns an interner and a shared [`SlotArena`](hedge_arena::SlotArena)
//!   and pairs twins across faces.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod face;
pub mod interner;
pub mod mesh;

pub use error::{MeshError, TopologyError};
pub use face::{FaceLoop, FaceLoopBuilder, LoopWalk};
pub use interner::VertexInterner;
pub use mesh::Mesh;
