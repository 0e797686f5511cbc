//! Test fixtures and seeded workloads for hedge development.
//!
//! - [`fixtures`] builds small arenas and meshes (triangle, quad pair,
//!   tetrahedron) with known topology.
//! - [`ops`] generates deterministic allocate/release/protect streams for
//!   single- and multi-threaded arena stress tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod ops;

pub use fixtures::{quad_pair, small_arena, tetrahedron, triangle, MeshFixture};
pub use ops::{drive, ArenaOp, OpStream};
