//! Top-level mesh: a vertex interner plus a shared slot arena.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use hedge_arena::{ArenaConfig, EdgeHandle, SlotArena};
use hedge_core::{Point3, VertexHandle};

use crate::error::{MeshError, TopologyError};
use crate::face::{FaceLoop, FaceLoopBuilder};
use crate::interner::VertexInterner;

/// Directed edge key: (origin, destination).
type DirectedEdge = (VertexHandle, VertexHandle);

/// Owner of a mesh's vertices and half-edge storage.
///
/// Raw edges come from [`allocate_edge`](Self::allocate_edge) and are wired
/// by the caller with a [`FaceLoopBuilder`]. [`add_face`](Self::add_face)
/// does the common case in one call and also pairs twins with faces added
/// earlier.
///
/// Mutating methods take `&mut self`; the mesh is not meant to be shared
/// during construction. The arena itself is `Sync` and can be handed to
/// worker threads via [`shared_arena`](Self::shared_arena).
pub struct Mesh {
    vertices: VertexInterner,
    arena: Arc<SlotArena>,
    /// Half-edges created by `add_face`, keyed by their directed edge.
    directed: IndexMap<DirectedEdge, EdgeHandle>,
    faces: usize,
}

impl Mesh {
    /// Create a mesh with its own arena.
    pub fn new(config: ArenaConfig) -> Result<Self, MeshError> {
        Ok(Self::with_arena(Arc::new(SlotArena::new(config)?)))
    }

    /// Create a mesh over an existing (possibly shared) arena.
    pub fn with_arena(arena: Arc<SlotArena>) -> Self {
        Self {
            vertices: VertexInterner::new(),
            arena,
            directed: IndexMap::new(),
            faces: 0,
        }
    }

    /// Intern a vertex.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexHandle {
        self.vertices.intern(x, y, z)
    }

    /// Intern a vertex, rejecting non-finite coordinates.
    pub fn try_add_vertex(&mut self, x: f64, y: f64, z: f64) -> Result<VertexHandle, MeshError> {
        self.vertices.try_intern(x, y, z)
    }

    /// The point behind a vertex handle.
    pub fn vertex(&self, handle: VertexHandle) -> Option<&Point3> {
        self.vertices.get(handle)
    }

    /// Allocate an unwired half-edge.
    pub fn allocate_edge(&self) -> Result<EdgeHandle, MeshError> {
        Ok(self.arena.allocate()?)
    }

    /// Release a single half-edge.
    ///
    /// If the edge came from [`add_face`](Self::add_face), its directed-edge
    /// entry and its twin's back-link are dropped too, so the directed edge
    /// can be used again. The rest of its face is left in place; walks of
    /// that face stop at the gap. Prefer [`remove_face`](Self::remove_face)
    /// to release whole faces.
    pub fn release_edge(&mut self, edge: EdgeHandle) -> Result<(), MeshError> {
        let rec = self.arena.get(edge)?;
        let dest = rec
            .next()
            .and_then(|next| self.arena.resolve(next).ok())
            .and_then(|next| next.vertex());
        if let (Some(from), Some(to)) = (rec.vertex(), dest) {
            if self.directed.get(&(from, to)) == Some(&edge) {
                self.directed.swap_remove(&(from, to));
            }
        }
        self.unlink_twin(edge);
        Ok(self.arena.deallocate(edge)?)
    }

    /// Build a face over `vertices` (in loop order) and validate it.
    ///
    /// Allocates one half-edge per vertex, links them into a closed loop,
    /// and twins each half-edge with the opposite half-edge of an earlier
    /// face when one exists. On any error, every edge allocated here is
    /// released and earlier faces are left as they were.
    pub fn add_face(&mut self, vertices: &[VertexHandle]) -> Result<FaceLoop, MeshError> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::DegenerateFace {
                reason: format!("{n} vertices, need at least 3"),
            });
        }
        let mut keys: SmallVec<[DirectedEdge; 8]> = SmallVec::with_capacity(n);
        for (i, &from) in vertices.iter().enumerate() {
            if !self.vertices.contains(from) {
                return Err(MeshError::UnknownVertex { vertex: from });
            }
            let to = vertices[(i + 1) % n];
            if from == to {
                return Err(MeshError::DegenerateFace {
                    reason: format!("vertex {from} repeated back to back"),
                });
            }
            let key = (from, to);
            if self.directed.contains_key(&key) || keys.contains(&key) {
                return Err(MeshError::NonManifoldEdge { from, to });
            }
            keys.push(key);
        }

        let mut edges: SmallVec<[EdgeHandle; 8]> = SmallVec::with_capacity(n);
        for _ in 0..n {
            match self.arena.allocate() {
                Ok(e) => edges.push(e),
                Err(err) => {
                    self.discard(&edges);
                    return Err(err.into());
                }
            }
        }

        let mut builder = FaceLoopBuilder::begin(&self.arena, edges[0], edges[n - 1]);
        for (i, (&edge, &(from, to))) in edges.iter().zip(&keys).enumerate() {
            if i > 0 {
                builder.link_next(edge);
            }
            builder.set_vertex(from);
            if let Some(&twin) = self.directed.get(&(to, from)) {
                builder.add_twin(twin);
            }
        }
        builder.close();

        let face = match builder.finalize() {
            Ok(face) => face,
            Err(err) => {
                self.discard(&edges);
                return Err(err.into());
            }
        };

        for (&key, &edge) in keys.iter().zip(&edges) {
            self.directed.insert(key, edge);
        }
        self.faces += 1;
        tracing::trace!(edges = n, faces = self.faces, "face added");
        Ok(face)
    }

    /// Unlink and release every half-edge of `face`.
    ///
    /// Twins on neighbouring faces lose their twin link and become boundary
    /// half-edges again.
    pub fn remove_face(&mut self, face: &FaceLoop) -> Result<(), MeshError> {
        if !self.arena.is_allocated(face.head()) {
            return Err(TopologyError::DeadEdge {
                edge: face.head().index(),
            }
            .into());
        }
        let edges: SmallVec<[EdgeHandle; 8]> = face.edges(&self.arena).collect();
        if edges.len() != face.len() {
            // Walk stopped early: some edge was already released.
            let dead = edges
                .last()
                .and_then(|&e| self.arena.get(e).ok())
                .and_then(|rec| rec.next())
                .unwrap_or(face.head().index());
            return Err(TopologyError::DeadEdge { edge: dead }.into());
        }
        let last = edges[edges.len() - 1];
        if self.arena.get(last)?.next() != Some(face.head().index()) {
            return Err(TopologyError::TailNotClosing { edge: last.index() }.into());
        }

        for (i, &edge) in edges.iter().enumerate() {
            let rec = self.arena.get(edge)?;
            let dest = self.arena.get(edges[(i + 1) % edges.len()])?.vertex();
            if let (Some(from), Some(to)) = (rec.vertex(), dest) {
                if self.directed.get(&(from, to)) == Some(&edge) {
                    self.directed.swap_remove(&(from, to));
                }
            }
        }
        self.discard(&edges);
        self.faces = self.faces.saturating_sub(1);
        Ok(())
    }

    /// Clear the twin's link back to `edge`, if any.
    fn unlink_twin(&self, edge: EdgeHandle) {
        let Some(twin) = self.arena.get(edge).ok().and_then(|rec| rec.twin()) else {
            return;
        };
        if let Ok(other) = self.arena.resolve(twin) {
            if other.twin() == Some(edge.index()) {
                other.set_twin(None);
            }
        }
    }

    /// Clear twin back-links and release `edges`.
    fn discard(&self, edges: &[EdgeHandle]) {
        for &edge in edges {
            if !self.arena.is_allocated(edge) {
                continue;
            }
            self.unlink_twin(edge);
            if let Err(err) = self.arena.deallocate(edge) {
                tracing::warn!(%edge, error = %err, "failed to release face edge");
            }
        }
    }

    /// The half-edge from `from` to `to` created by [`add_face`](Self::add_face).
    pub fn find_half_edge(&self, from: VertexHandle, to: VertexHandle) -> Option<EdgeHandle> {
        self.directed.get(&(from, to)).copied()
    }

    /// Number of faces built with [`add_face`](Self::add_face) and not removed.
    pub fn face_count(&self) -> usize {
        self.faces
    }

    /// Number of half-edges currently allocated in the arena.
    pub fn half_edge_count(&self) -> usize {
        self.arena.live_count()
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The slot arena.
    pub fn arena(&self) -> &SlotArena {
        &self.arena
    }

    /// A clone of the shared arena handle.
    pub fn shared_arena(&self) -> Arc<SlotArena> {
        Arc::clone(&self.arena)
    }

    /// The vertex interner.
    pub fn interner(&self) -> &VertexInterner {
        &self.vertices
    }
}
