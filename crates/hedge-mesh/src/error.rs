//! Topology and mesh error types.

use std::error::Error;
use std::fmt;

use hedge_arena::ArenaError;
use hedge_core::{EdgeIndex, VertexHandle};

/// A face loop failed validation.
///
/// Every variant carries the edge at which the first broken invariant was
/// found. All of them are recoverable: discard the partial loop and build
/// again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// Following `next` from this edge leads nowhere, or never returns to
    /// the head within the number of edges the builder wired.
    OpenLoop {
        /// Last edge reached before the walk gave up.
        edge: EdgeIndex,
    },
    /// The declared tail is not on the loop, or its `next` is not the head.
    TailNotClosing {
        /// The declared tail.
        edge: EdgeIndex,
    },
    /// An edge on the loop has no origin vertex.
    MissingVertex {
        /// The edge without a vertex.
        edge: EdgeIndex,
    },
    /// `prev` of this edge does not point back at its predecessor.
    BrokenPrev {
        /// The edge whose `prev` is wrong.
        edge: EdgeIndex,
    },
    /// This edge's twin does not name it as its own twin.
    AsymmetricTwin {
        /// The edge whose twin link is one-sided.
        edge: EdgeIndex,
    },
    /// The loop references a slot that is not allocated (or was recycled).
    DeadEdge {
        /// The dead slot.
        edge: EdgeIndex,
    },
    /// The builder wired this edge but the loop from the head never
    /// reaches it.
    Unreachable {
        /// The stray edge.
        edge: EdgeIndex,
    },
}

impl TopologyError {
    /// The offending edge.
    pub fn edge(&self) -> EdgeIndex {
        match *self {
            Self::OpenLoop { edge }
            | Self::TailNotClosing { edge }
            | Self::MissingVertex { edge }
            | Self::BrokenPrev { edge }
            | Self::AsymmetricTwin { edge }
            | Self::DeadEdge { edge }
            | Self::Unreachable { edge } => edge,
        }
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenLoop { edge } => write!(f, "face loop does not close after {edge}"),
            Self::TailNotClosing { edge } => {
                write!(f, "tail {edge} does not link back to the loop head")
            }
            Self::MissingVertex { edge } => write!(f, "edge {edge} has no vertex"),
            Self::BrokenPrev { edge } => {
                write!(f, "edge {edge} has a prev link that does not match its predecessor")
            }
            Self::AsymmetricTwin { edge } => write!(f, "twin of edge {edge} does not point back"),
            Self::DeadEdge { edge } => write!(f, "edge {edge} is not allocated"),
            Self::Unreachable { edge } => {
                write!(f, "edge {edge} was wired but is not on the loop")
            }
        }
    }
}

impl Error for TopologyError {}

/// Errors from [`Mesh`](crate::Mesh) and [`VertexInterner`](crate::VertexInterner)
/// operations.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshError {
    /// The underlying slot arena rejected the request.
    Arena(ArenaError),
    /// A face loop failed validation.
    Topology(TopologyError),
    /// A coordinate was NaN or infinite.
    NonFiniteCoordinate {
        /// The rejected point.
        coords: [f64; 3],
    },
    /// A face has fewer than three vertices or repeats a vertex back to back.
    DegenerateFace {
        /// What made the face degenerate.
        reason: String,
    },
    /// The directed edge is already used by another face.
    NonManifoldEdge {
        /// Origin vertex.
        from: VertexHandle,
        /// Destination vertex.
        to: VertexHandle,
    },
    /// A vertex handle the interner never issued.
    UnknownVertex {
        /// The unknown handle.
        vertex: VertexHandle,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena error: {e}"),
            Self::Topology(e) => write!(f, "topology error: {e}"),
            Self::NonFiniteCoordinate { coords } => {
                write!(f, "non-finite coordinate {coords:?}")
            }
            Self::DegenerateFace { reason } => write!(f, "degenerate face: {reason}"),
            Self::NonManifoldEdge { from, to } => {
                write!(f, "directed edge {from} -> {to} already belongs to a face")
            }
            Self::UnknownVertex { vertex } => write!(f, "unknown vertex {vertex}"),
        }
    }
}

impl Error for MeshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Topology(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for MeshError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<TopologyError> for MeshError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_error_reports_edge() {
        let err = TopologyError::BrokenPrev { edge: EdgeIndex(4) };
        assert_eq!(err.edge(), EdgeIndex(4));
        assert!(err.to_string().contains("e4"));
    }

    #[test]
    fn mesh_error_wraps_sources() {
        let err: MeshError = TopologyError::OpenLoop { edge: EdgeIndex(1) }.into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("topology error"));

        let err = MeshError::UnknownVertex {
            vertex: VertexHandle(3),
        };
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "unknown vertex v3");
    }
}
