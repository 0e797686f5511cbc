//! Hedge: concurrent half-edge mesh storage.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the hedge sub-crates. For most users, adding `hedge` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use hedge::prelude::*;
//!
//! let mut mesh = Mesh::new(ArenaConfig::default()).unwrap();
//! let a = mesh.add_vertex(0.0, 0.0, 0.0);
//! let b = mesh.add_vertex(1.0, 0.0, 0.0);
//! let c = mesh.add_vertex(0.0, 1.0, 0.0);
//! let d = mesh.add_vertex(1.0, 1.0, 0.0);
//!
//! let left = mesh.add_face(&[a, b, c]).unwrap();
//! let right = mesh.add_face(&[c, b, d]).unwrap();
//! assert_eq!(left.vertices(mesh.arena()).collect::<Vec<_>>(), vec![a, b, c]);
//!
//! // The shared edge b-c is twinned across the two faces.
//! let bc = mesh.find_half_edge(b, c).unwrap();
//! let cb = mesh.find_half_edge(c, b).unwrap();
//! assert_eq!(mesh.arena().get(bc).unwrap().twin(), Some(cb.index()));
//! assert!(right.contains(mesh.arena(), cb));
//! ```
//!
//! Hand wiring with a builder:
//!
//! ```rust
//! use hedge::prelude::*;
//!
//! let arena = SlotArena::new(ArenaConfig::new(64)).unwrap();
//! let e: Vec<_> = (0..3).map(|_| arena.allocate().unwrap()).collect();
//!
//! let mut b = FaceLoopBuilder::begin(&arena, e[0], e[2]);
//! b.set_vertex(VertexHandle(0))
//!     .link_next(e[1])
//!     .set_vertex(VertexHandle(1))
//!     .link_next(e[2])
//!     .set_vertex(VertexHandle(2))
//!     .close();
//! let face = b.finalize().unwrap();
//! assert_eq!(face.len(), 3);
//!
//! // Readers on other threads protect records before following links.
//! let guard = arena.protect(face.head()).unwrap();
//! let next = guard.follow_next().unwrap().unwrap();
//! assert_eq!(next.handle(), e[1]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hedge-core` | Edge and vertex IDs, `Point3` |
//! | [`arena`] | `hedge-arena` | `SlotArena`, handles, hazard slots, records |
//! | [`mesh`] | `hedge-mesh` | Vertex interner, face loops, `Mesh` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// IDs and geometry primitives (`hedge-core`).
pub use hedge_core as types;

/// Concurrent slot arena (`hedge-arena`).
///
/// [`arena::SlotArena`] owns the records; [`arena::Protected`] guards keep
/// a record from being reissued while a reader holds it.
pub use hedge_arena as arena;

/// Mesh-level structures (`hedge-mesh`).
///
/// [`mesh::FaceLoopBuilder`] wires and validates loops, and
/// [`mesh::Mesh`] pairs twins across faces.
pub use hedge_mesh as mesh;

/// Common imports for typical hedge usage.
///
/// ```rust
/// use hedge::prelude::*;
/// ```
pub mod prelude {
    // IDs and geometry
    pub use hedge_core::{EdgeIndex, Point3, VertexHandle};

    // Arena
    pub use hedge_arena::{ArenaConfig, EdgeHandle, HalfEdgeRecord, Protected, SlotArena};

    // Mesh
    pub use hedge_mesh::{FaceLoop, FaceLoopBuilder, Mesh, VertexInterner};

    // Errors
    pub use hedge_arena::ArenaError;
    pub use hedge_mesh::{MeshError, TopologyError};
}
