//! Arenas and meshes with known topology.
//!
//! Vertex positions are fixed so that tests can look vertices up again by
//! coordinate.

use hedge_arena::{ArenaConfig, SlotArena};
use hedge_core::VertexHandle;
use hedge_mesh::{FaceLoop, Mesh};

/// An arena with small blocks so tests cross block boundaries quickly.
pub fn small_arena(block_capacity: u32) -> SlotArena {
    SlotArena::new(ArenaConfig::new(block_capacity).with_hazard_slots(4))
        .expect("fixture arena config is valid")
}

/// A mesh plus the handles used to build it.
pub struct MeshFixture {
    pub mesh: Mesh,
    pub vertices: Vec<VertexHandle>,
    pub faces: Vec<FaceLoop>,
}

fn build(points: &[[f64; 3]], faces: &[&[usize]]) -> MeshFixture {
    let mut mesh = Mesh::new(ArenaConfig::new(16).with_hazard_slots(4))
        .expect("fixture arena config is valid");
    let vertices: Vec<_> = points
        .iter()
        .map(|&[x, y, z]| mesh.add_vertex(x, y, z))
        .collect();
    let faces = faces
        .iter()
        .map(|face| {
            let vs: Vec<_> = face.iter().map(|&i| vertices[i]).collect();
            mesh.add_face(&vs).expect("fixture face is valid")
        })
        .collect();
    MeshFixture {
        mesh,
        vertices,
        faces,
    }
}

/// One counter-clockwise triangle in the z = 0 plane.
pub fn triangle() -> MeshFixture {
    build(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        &[&[0, 1, 2]],
    )
}

/// Unit square split along the diagonal 1-2 into two triangles.
///
/// ```text
///   2 ---- 3
///   | \    |
///   |   \  |
///   0 ---- 1
/// ```
pub fn quad_pair() -> MeshFixture {
    build(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [1.0, 1.0, 0.0],
        ],
        &[&[0, 1, 2], &[2, 1, 3]],
    )
}

/// Closed, consistently oriented tetrahedron: every half-edge has a twin.
pub fn tetrahedron() -> MeshFixture {
    build(
        &[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ],
        &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]],
    )
}
