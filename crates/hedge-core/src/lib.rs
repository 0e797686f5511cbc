//! Core types for the hedge half-edge workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! identifiers shared by the arena and mesh crates ([`EdgeIndex`],
//! [`VertexHandle`]) and the [`Point3`] value type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod point;

pub use id::{EdgeIndex, VertexHandle, INVALID_INDEX};
pub use point::Point3;
