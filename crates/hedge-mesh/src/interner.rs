//! Value-deduplicating vertex storage.
//!
//! [`VertexInterner`] keeps every distinct [`Point3`] exactly once in an
//! `IndexSet`. A point's handle is its insertion index, so handles are
//! dense, stable, and never reused (there is no removal).
//!
//! Not thread-safe by contract: interning takes `&mut self`. Build one
//! interner per thread and merge afterwards if construction must be
//! parallel.

use indexmap::IndexSet;

use hedge_core::{Point3, VertexHandle};

use crate::error::MeshError;

/// Deduplicating store of mesh vertices.
#[derive(Debug, Default)]
pub struct VertexInterner {
    points: IndexSet<Point3>,
}

impl VertexInterner {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interner with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: IndexSet::with_capacity(capacity),
        }
    }

    /// Handle of the point `(x, y, z)`, storing it if unseen.
    ///
    /// Coordinates must be finite; use [`try_intern`](Self::try_intern)
    /// for untrusted input.
    pub fn intern(&mut self, x: f64, y: f64, z: f64) -> VertexHandle {
        self.intern_point(Point3::new(x, y, z))
    }

    /// Like [`intern`](Self::intern) but rejects NaN and infinities.
    pub fn try_intern(&mut self, x: f64, y: f64, z: f64) -> Result<VertexHandle, MeshError> {
        let point = Point3::new(x, y, z);
        if !point.is_finite() {
            return Err(MeshError::NonFiniteCoordinate {
                coords: [x, y, z],
            });
        }
        Ok(self.intern_point(point))
    }

    /// Handle of `point`, storing it if unseen.
    pub fn intern_point(&mut self, point: Point3) -> VertexHandle {
        debug_assert!(point.is_finite(), "interning non-finite point {point}");
        // Route through `new` so -0.0 folds even for literal-built points.
        let point = Point3::new(point.x, point.y, point.z);
        let (index, _) = self.points.insert_full(point);
        debug_assert!(index < u32::MAX as usize, "vertex handle space exhausted");
        VertexHandle(index as u32)
    }

    /// Handle of an already interned point.
    pub fn lookup(&self, point: &Point3) -> Option<VertexHandle> {
        self.points
            .get_index_of(point)
            .map(|i| VertexHandle(i as u32))
    }

    /// The point behind `handle`.
    pub fn get(&self, handle: VertexHandle) -> Option<&Point3> {
        self.points.get_index(handle.as_usize())
    }

    /// Whether `handle` was issued by this interner.
    pub fn contains(&self, handle: VertexHandle) -> bool {
        handle.as_usize() < self.points.len()
    }

    /// Number of distinct points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point has been interned.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexHandle, &Point3)> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (VertexHandle(i as u32), p))
    }
}
