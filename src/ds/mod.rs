//! Mesh **d**ata **s**tructures.
//!
//! Right now there is exactly one: the [`HalfEdgeMesh`], which represents
//! manifold triangle meshes (with or without boundary) and refuses to be
//! built from anything else.

use failure::Fail;

use crate::handle::VertexHandle;


pub mod half_edge;

pub use self::half_edge::HalfEdgeMesh;


/// Reasons why a set of triangles is not a valid manifold surface mesh.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum InvalidMeshError {
    #[fail(display = "the mesh has no vertices")]
    Empty,

    #[fail(
        display = "face {} references vertex {}, but the mesh only has {} vertices",
        face, vertex, num_vertices
    )]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        num_vertices: usize,
    },

    #[fail(display = "face {} is degenerate (it references a vertex more than once)", face)]
    DegenerateFace {
        face: usize,
    },

    #[fail(
        display = "edge {:?} -> {:?} is non-manifold (it borders more than two faces or \
            the adjacent faces are oriented inconsistently)",
        from, to
    )]
    NonManifoldEdge {
        from: VertexHandle,
        to: VertexHandle,
    },

    #[fail(display = "vertex {:?} is non-manifold (its faces do not form a single fan)", _0)]
    NonManifoldVertex(VertexHandle),
}
