//! Simple procedurally generated meshes.
//!
//! All shapes are oriented counter-clockwise when looked at from the outside
//! (or from `+z` for the flat ones).

use std::f64::consts::PI;

use cgmath::Point3;

use crate::{
    ds::HalfEdgeMesh,
    geometry::Positions,
};


fn build(positions: Vec<Point3<f64>>, faces: &[[usize; 3]]) -> (HalfEdgeMesh, Positions) {
    let mesh = HalfEdgeMesh::from_triangles(positions.len(), faces)
        .expect("generated shape is not a valid manifold mesh");
    (mesh, positions.into())
}

/// A flat disk in the xy-plane with radius 1: one center vertex and `steps`
/// vertices on the rim.
///
/// Panics if `steps < 3`.
pub fn disk(steps: usize) -> (HalfEdgeMesh, Positions) {
    assert!(steps >= 3, "a disk needs at least three rim vertices");

    let mut positions = vec![Point3::new(0.0, 0.0, 0.0)];
    positions.extend((0..steps).map(|step| {
        let around_circle = 2.0 * PI * step as f64 / steps as f64;
        Point3::new(around_circle.cos(), around_circle.sin(), 0.0)
    }));

    let faces = (0..steps)
        .map(|step| [0, step + 1, (step + 1) % steps + 1])
        .collect::<Vec<_>>();

    build(positions, &faces)
}

/// A flat grid in the xy-plane covering `[0, nx] × [0, ny]` with
/// `(nx + 1) * (ny + 1)` vertices. Vertex `(i, j)` has index
/// `j * (nx + 1) + i`.
pub fn grid(nx: usize, ny: usize) -> (HalfEdgeMesh, Positions) {
    let idx = |i: usize, j: usize| j * (nx + 1) + i;

    let mut positions = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            positions.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let a = idx(i, j);
            let b = idx(i + 1, j);
            let c = idx(i + 1, j + 1);
            let d = idx(i, j + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    build(positions, &faces)
}

/// A regular tetrahedron inscribed in the cube `[-1, 1]³`.
pub fn tetrahedron() -> (HalfEdgeMesh, Positions) {
    let positions = vec![
        Point3::new( 1.0,  1.0,  1.0),
        Point3::new( 1.0, -1.0, -1.0),
        Point3::new(-1.0,  1.0, -1.0),
        Point3::new(-1.0, -1.0,  1.0),
    ];
    let faces = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];

    build(positions, &faces)
}

/// A regular octahedron with its vertices on the coordinate axes.
pub fn octahedron() -> (HalfEdgeMesh, Positions) {
    let positions = vec![
        Point3::new( 1.0,  0.0,  0.0),
        Point3::new(-1.0,  0.0,  0.0),
        Point3::new( 0.0,  1.0,  0.0),
        Point3::new( 0.0, -1.0,  0.0),
        Point3::new( 0.0,  0.0,  1.0),
        Point3::new( 0.0,  0.0, -1.0),
    ];
    let faces = [
        [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
        [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
    ];

    build(positions, &faces)
}

/// A UV sphere with radius 1, `rings` latitude bands and `segments`
/// longitude slices. The poles are single vertices.
///
/// Panics if `rings < 2` or `segments < 3`.
pub fn uv_sphere(rings: usize, segments: usize) -> (HalfEdgeMesh, Positions) {
    assert!(rings >= 2 && segments >= 3, "sphere is too coarse");

    let mut positions = vec![Point3::new(0.0, 0.0, 1.0)];
    for ring in 1..rings {
        let theta = PI * ring as f64 / rings as f64;
        for segment in 0..segments {
            let phi = 2.0 * PI * segment as f64 / segments as f64;
            positions.push(Point3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            ));
        }
    }
    let south = positions.len();
    positions.push(Point3::new(0.0, 0.0, -1.0));

    let ring_vertex = |ring: usize, segment: usize| 1 + (ring - 1) * segments + segment % segments;

    let mut faces = Vec::new();
    for s in 0..segments {
        faces.push([0, ring_vertex(1, s), ring_vertex(1, s + 1)]);
    }
    for ring in 1..rings - 1 {
        for s in 0..segments {
            let a = ring_vertex(ring, s);
            let b = ring_vertex(ring + 1, s);
            let c = ring_vertex(ring + 1, s + 1);
            let d = ring_vertex(ring, s + 1);
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }
    for s in 0..segments {
        faces.push([south, ring_vertex(rings - 1, s + 1), ring_vertex(rings - 1, s)]);
    }

    build(positions, &faces)
}
