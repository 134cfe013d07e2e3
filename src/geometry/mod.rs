//! Discrete geometry on top of a [`HalfEdgeMesh`] and its vertex positions.
//!
//! [`Geometry`] computes all quantities the direction field solver and the
//! exporter need once and stores them in dense property maps: face normals
//! and areas, corner angles, vertex normals and tangent bases, dual areas,
//! cotan weights and the intrinsic angles of half edges inside the tangent
//! plane of their origin vertex.

use std::f64::consts::PI;

use cgmath::{prelude::*, Point3, Vector2, Vector3};

use crate::{
    ds::HalfEdgeMesh,
    handle::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle},
    map::VecMap,
    math::{angle_between, from_angle},
};




/// Vertex positions of a mesh.
pub type Positions = VecMap<VertexHandle, Point3<f64>>;

/// An orthonormal basis of the tangent plane of a vertex.
///
/// The normal is implicit: `x × y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentBasis {
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
}

impl TangentBasis {
    pub fn normal(&self) -> Vector3<f64> {
        self.x.cross(self.y)
    }

    /// Expresses a vector given in this basis in world coordinates.
    pub fn to_world(&self, v: Vector2<f64>) -> Vector3<f64> {
        self.x * v.x + self.y * v.y
    }
}

/// Vertex positions and all quantities derived from them.
///
/// Degenerate input (isolated vertices, zero-area faces) results in
/// non-finite values in some quantities. These are kept as they are: the
/// exporter sanitizes them.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Positions,

    face_normals: VecMap<FaceHandle, Vector3<f64>>,
    face_areas: VecMap<FaceHandle, f64>,

    /// Interior angle at the origin of each half edge inside its face. `0`
    /// for boundary half edges.
    corner_angles: VecMap<HalfEdgeHandle, f64>,

    /// Angle of each outgoing half edge in the tangent plane of its origin,
    /// measured counter-clockwise from the vertex's reference half edge.
    half_edge_angles: VecMap<HalfEdgeHandle, f64>,

    edge_cotan_weights: VecMap<EdgeHandle, f64>,

    vertex_angle_sums: VecMap<VertexHandle, f64>,
    vertex_normals: VecMap<VertexHandle, Vector3<f64>>,
    vertex_dual_areas: VecMap<VertexHandle, f64>,
    tangent_bases: VecMap<VertexHandle, TangentBasis>,
}

impl Geometry {
    /// Computes all geometric quantities of `mesh` with the given vertex
    /// positions.
    ///
    /// Panics if `positions` doesn't contain exactly one position per vertex.
    pub fn new(mesh: &HalfEdgeMesh, positions: Positions) -> Self {
        assert_eq!(
            positions.num_elements(),
            mesh.num_vertices(),
            "number of vertex positions doesn't match the number of vertices",
        );

        // ----- Faces -------------------------------------------------------
        let mut face_normals = VecMap::with_capacity(mesh.num_faces() as usize);
        let mut face_areas = VecMap::with_capacity(mesh.num_faces() as usize);
        for f in mesh.faces() {
            let [a, b, c] = mesh.vertices_of_face(f);
            let cross = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
            let len = cross.magnitude();
            face_normals.push(cross / len);
            face_areas.push(0.5 * len);
        }

        // ----- Corners -----------------------------------------------------
        let corner_angles = mesh.half_edges()
            .map(|he| {
                let angle = mesh.prev(he).map(|prev| {
                    let p = positions[mesh.origin(he)];
                    angle_between(
                        positions[mesh.target(he)] - p,
                        positions[mesh.origin(prev)] - p,
                    )
                });
                (he, angle.unwrap_or(0.0))
            })
            .collect::<VecMap<_, _>>();

        // ----- Edges -------------------------------------------------------
        let cotan_of_opposite_corner = |he: HalfEdgeHandle| -> f64 {
            match mesh.prev(he) {
                None => 0.0,
                Some(prev) => {
                    let opposite = positions[mesh.origin(prev)];
                    let u = positions[mesh.origin(he)] - opposite;
                    let v = positions[mesh.target(he)] - opposite;
                    u.dot(v) / u.cross(v).magnitude()
                }
            }
        };
        let edge_cotan_weights = mesh.edges()
            .map(|e| {
                let he = e.half_edge();
                let w = 0.5 * (cotan_of_opposite_corner(he) + cotan_of_opposite_corner(he.twin()));
                (e, w)
            })
            .collect::<VecMap<_, _>>();

        // ----- Vertices ----------------------------------------------------
        let num_vertices = mesh.num_vertices() as usize;
        let mut vertex_angle_sums = VecMap::with_capacity(num_vertices);
        let mut vertex_normals = VecMap::with_capacity(num_vertices);
        let mut vertex_dual_areas = VecMap::with_capacity(num_vertices);
        let mut tangent_bases = VecMap::with_capacity(num_vertices);
        let mut half_edge_angles = VecMap::from_elem(0.0, mesh.num_half_edges() as usize);

        for v in mesh.vertices() {
            let mut angle_sum = 0.0;
            let mut normal = Vector3::zero();
            let mut dual_area = 0.0;
            for he in mesh.outgoing_half_edges(v) {
                if let Some(f) = mesh.face_of(he) {
                    angle_sum += corner_angles[he];
                    normal += face_normals[f] * corner_angles[he];
                    dual_area += face_areas[f] / 3.0;
                }
            }
            let normal = normal.normalize();

            // Intrinsic angles: rescale the corner angles so that they sum up
            // to 2π (interior) or π (boundary).
            let full_angle = if mesh.is_boundary_vertex(v) { PI } else { 2.0 * PI };
            let scale = if angle_sum > 0.0 { full_angle / angle_sum } else { 0.0 };
            let mut running = 0.0;
            for he in mesh.outgoing_half_edges(v) {
                half_edge_angles[he] = running;
                running += corner_angles[he] * scale;
            }

            let basis = match mesh.reference_half_edge(v) {
                Some(he) => {
                    let edge = positions[mesh.target(he)] - positions[v];
                    let x = (edge - normal * normal.dot(edge)).normalize();
                    TangentBasis { x, y: normal.cross(x) }
                }

                // An isolated vertex has no tangent plane.
                None => {
                    let nan = Vector3::new(f64::NAN, f64::NAN, f64::NAN);
                    TangentBasis { x: nan, y: nan }
                }
            };

            vertex_angle_sums.push(angle_sum);
            vertex_normals.push(normal);
            vertex_dual_areas.push(dual_area);
            tangent_bases.push(basis);
        }

        Self {
            positions,
            face_normals,
            face_areas,
            corner_angles,
            half_edge_angles,
            edge_cotan_weights,
            vertex_angle_sums,
            vertex_normals,
            vertex_dual_areas,
            tangent_bases,
        }
    }

    pub fn positions(&self) -> &Positions {
        &self.positions
    }

    pub fn position(&self, v: VertexHandle) -> Point3<f64> {
        self.positions[v]
    }

    pub fn face_normal(&self, f: FaceHandle) -> Vector3<f64> {
        self.face_normals[f]
    }

    pub fn face_area(&self, f: FaceHandle) -> f64 {
        self.face_areas[f]
    }

    /// The interior angle at the origin of `he` inside its face (`0` for
    /// boundary half edges).
    pub fn corner_angle(&self, he: HalfEdgeHandle) -> f64 {
        self.corner_angles[he]
    }

    /// `(cot α + cot β) / 2` where α and β are the angles opposite of the
    /// edge. Boundary edges only have one of them.
    pub fn cotan_weight(&self, e: EdgeHandle) -> f64 {
        self.edge_cotan_weights[e]
    }

    pub fn vertex_angle_sum(&self, v: VertexHandle) -> f64 {
        self.vertex_angle_sums[v]
    }

    /// Angle-weighted average of the adjacent face normals.
    pub fn vertex_normal(&self, v: VertexHandle) -> Vector3<f64> {
        self.vertex_normals[v]
    }

    pub fn vertex_normals(&self) -> &VecMap<VertexHandle, Vector3<f64>> {
        &self.vertex_normals
    }

    /// Barycentric dual area: a third of the area of all adjacent faces.
    pub fn vertex_dual_area(&self, v: VertexHandle) -> f64 {
        self.vertex_dual_areas[v]
    }

    pub fn tangent_basis(&self, v: VertexHandle) -> TangentBasis {
        self.tangent_bases[v]
    }

    pub fn tangent_bases(&self) -> &VecMap<VertexHandle, TangentBasis> {
        &self.tangent_bases
    }

    /// The angle of the outgoing half edge `he` in the intrinsic tangent
    /// frame of its origin vertex.
    pub fn half_edge_angle(&self, he: HalfEdgeHandle) -> f64 {
        self.half_edge_angles[he]
    }

    /// The half edge as 2D vector in the intrinsic tangent frame of its
    /// origin: its length in the direction of [`Self::half_edge_angle`].
    pub fn half_edge_vector_in_vertex(&self, mesh: &HalfEdgeMesh, he: HalfEdgeHandle) -> Vector2<f64> {
        let len = (self.positions[mesh.target(he)] - self.positions[mesh.origin(he)]).magnitude();
        from_angle(self.half_edge_angles[he]) * len
    }

    /// The rotation (as unit complex number) that transports a tangent
    /// vector from the origin of `he` to its target, following the discrete
    /// Levi-Civita connection.
    pub fn transport_along_half_edge(&self, he: HalfEdgeHandle) -> Vector2<f64> {
        from_angle(self.half_edge_angles[he.twin()] - self.half_edge_angles[he] + PI)
    }

    pub fn total_area(&self) -> f64 {
        self.face_areas.values().sum()
    }
}
