//! Benchmark profiles for the hedge arena and mesh.
//!
//! - [`grid_points`]: vertex positions of an `n x n` quad grid
//! - [`grid_mesh`]: the same grid triangulated into a [`Mesh`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hedge_arena::ArenaConfig;
use hedge_core::VertexHandle;
use hedge_mesh::{Mesh, MeshError};

/// Row-major positions of an `(n + 1) x (n + 1)` lattice in the z = 0 plane.
pub fn grid_points(n: usize) -> Vec<[f64; 3]> {
    (0..=n)
        .flat_map(|y| (0..=n).map(move |x| [x as f64, y as f64, 0.0]))
        .collect()
}

/// Triangulate an `n x n` grid: two triangles per cell, `6 n^2` half-edges.
///
/// Interior edges are twinned as faces are added.
pub fn grid_mesh(n: usize, config: ArenaConfig) -> Result<Mesh, MeshError> {
    let mut mesh = Mesh::new(config)?;
    let vs: Vec<VertexHandle> = grid_points(n)
        .into_iter()
        .map(|[x, y, z]| mesh.add_vertex(x, y, z))
        .collect();
    let at = |x: usize, y: usize| vs[y * (n + 1) + x];
    for y in 0..n {
        for x in 0..n {
            let (a, b, c, d) = (at(x, y), at(x + 1, y), at(x, y + 1), at(x + 1, y + 1));
            mesh.add_face(&[a, b, c])?;
            mesh.add_face(&[c, b, d])?;
        }
    }
    Ok(mesh)
}
