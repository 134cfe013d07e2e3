//! Everything related to the `HalfEdgeMesh`.

use std::fmt;

use fxhash::FxHashMap;

use crate::{
    handle::{hsize, EdgeHandle, FaceHandle, Handle, HalfEdgeHandle, VertexHandle},
    map::VecMap,
};
use super::InvalidMeshError;




/// A manifold triangle mesh stored as half edges.
///
/// The mesh is built once via [`HalfEdgeMesh::from_triangles`] and is
/// immutable afterwards. All faces are triangles and are expected to be
/// oriented consistently (counter-clockwise when looking at the face from the
/// outside). Vertices that are not referenced by any face are allowed and are
/// simply isolated.
///
/// Each edge is stored as two twin half edges with adjacent indices. Half
/// edges on the boundary of the mesh don't have a face.
#[derive(Clone)]
pub struct HalfEdgeMesh {
    vertices: VecMap<VertexHandle, Vertex>,
    faces: VecMap<FaceHandle, Face>,
    half_edges: VecMap<HalfEdgeHandle, HalfEdge>,
}

#[derive(Debug, Clone, Copy)]
struct Face {
    edge: HalfEdgeHandle,
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    /// The reference half edge. For boundary vertices, this is the outgoing
    /// half edge which runs along the boundary and still has a face.
    outgoing: Option<HalfEdgeHandle>,
}

#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    target: VertexHandle,
    face: Option<FaceHandle>,
    /// `None` for boundary half edges.
    next: Option<HalfEdgeHandle>,
}

impl HalfEdgeMesh {
    /// Builds a mesh with `num_vertices` vertices and the given triangles.
    ///
    /// Vertex `i` of the mesh gets the handle with index `i`, face `j` the
    /// handle with index `j`. Fails if a face references a non-existing
    /// vertex, references a vertex twice or if the result would not be a
    /// manifold surface.
    pub fn from_triangles(
        num_vertices: usize,
        triangles: &[[usize; 3]],
    ) -> Result<Self, InvalidMeshError> {
        let mut mesh = Self {
            vertices: VecMap::from_elem(Vertex { outgoing: None }, num_vertices),
            faces: VecMap::with_capacity(triangles.len()),
            half_edges: VecMap::with_capacity(triangles.len() * 3 + triangles.len() / 2),
        };

        // Maps a directed edge to its half edge.
        let mut edge_map = FxHashMap::default();
        edge_map.reserve(triangles.len() * 3);

        let mut incident_faces = vec![0u32; num_vertices];

        for (face_idx, triangle) in triangles.iter().enumerate() {
            for &vertex in triangle {
                if vertex >= num_vertices {
                    return Err(InvalidMeshError::VertexOutOfRange {
                        face: face_idx,
                        vertex,
                        num_vertices,
                    });
                }
            }

            let [a, b, c] = *triangle;
            if a == b || b == c || a == c {
                return Err(InvalidMeshError::DegenerateFace { face: face_idx });
            }

            let face = FaceHandle::from_usize(face_idx);
            let vertices = [
                VertexHandle::from_usize(a),
                VertexHandle::from_usize(b),
                VertexHandle::from_usize(c),
            ];

            let mut inner = [HalfEdgeHandle::new(0); 3];
            for i in 0..3 {
                let from = vertices[i];
                let to = vertices[(i + 1) % 3];

                let he = match edge_map.get(&(from, to)) {
                    Some(&he) => {
                        // The half edge was created as twin of an earlier
                        // face's edge. If it has a face already, the same
                        // directed edge is used twice.
                        if mesh.half_edges[he].face.is_some() {
                            return Err(InvalidMeshError::NonManifoldEdge { from, to });
                        }
                        he
                    }
                    None => {
                        let he = mesh.add_edge(from, to);
                        edge_map.insert((from, to), he);
                        edge_map.insert((to, from), he.twin());
                        he
                    }
                };

                mesh.half_edges[he].face = Some(face);
                inner[i] = he;
            }

            for i in 0..3 {
                mesh.half_edges[inner[i]].next = Some(inner[(i + 1) % 3]);
                incident_faces[vertices[i].to_usize()] += 1;
            }

            mesh.faces.push(Face { edge: inner[0] });
        }

        mesh.assign_reference_half_edges()?;
        mesh.check_vertex_fans(&incident_faces)?;

        Ok(mesh)
    }

    /// Adds a pair of twin half edges without face and returns the one
    /// pointing from `from` to `to`.
    fn add_edge(&mut self, from: VertexHandle, to: VertexHandle) -> HalfEdgeHandle {
        let he = self.half_edges.push(HalfEdge { target: to, face: None, next: None });
        self.half_edges.push(HalfEdge { target: from, face: None, next: None });
        he
    }

    /// Sets the `outgoing` half edge of all non-isolated vertices. For
    /// boundary vertices, that's the inner half edge whose twin lies on the
    /// boundary, so that circulating counter-clockwise visits the whole fan.
    fn assign_reference_half_edges(&mut self) -> Result<(), InvalidMeshError> {
        let mut is_boundary = vec![false; self.vertices.num_elements() as usize];

        for he in self.half_edges.handles() {
            let origin = self.origin(he);
            match (self.half_edges[he].face, self.half_edges[he.twin()].face) {
                (Some(_), None) => {
                    // Two boundary fans meeting in one vertex.
                    if is_boundary[origin.to_usize()] {
                        return Err(InvalidMeshError::NonManifoldVertex(origin));
                    }
                    is_boundary[origin.to_usize()] = true;
                    self.vertices[origin].outgoing = Some(he);
                }
                (Some(_), Some(_)) if !is_boundary[origin.to_usize()] => {
                    if self.vertices[origin].outgoing.is_none() {
                        self.vertices[origin].outgoing = Some(he);
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Makes sure that circulating around each vertex reaches all of its
    /// faces.
    fn check_vertex_fans(&self, incident_faces: &[u32]) -> Result<(), InvalidMeshError> {
        for v in self.vertices() {
            let reached = self.outgoing_half_edges(v)
                .filter(|&he| self.half_edges[he].face.is_some())
                .count();

            if reached != incident_faces[v.to_usize()] as usize {
                return Err(InvalidMeshError::NonManifoldVertex(v));
            }
        }

        Ok(())
    }

    pub fn num_vertices(&self) -> hsize {
        self.vertices.num_elements()
    }

    pub fn num_faces(&self) -> hsize {
        self.faces.num_elements()
    }

    pub fn num_half_edges(&self) -> hsize {
        self.half_edges.num_elements()
    }

    pub fn num_edges(&self) -> hsize {
        self.half_edges.num_elements() / 2
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> + Clone {
        self.vertices.handles()
    }

    pub fn faces(&self) -> impl Iterator<Item = FaceHandle> + Clone {
        self.faces.handles()
    }

    pub fn half_edges(&self) -> impl Iterator<Item = HalfEdgeHandle> + Clone {
        self.half_edges.handles()
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + Clone {
        (0..self.num_edges()).map(EdgeHandle::new)
    }

    /// The vertex the half edge points to.
    pub fn target(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.half_edges[he].target
    }

    /// The vertex the half edge starts at.
    pub fn origin(&self, he: HalfEdgeHandle) -> VertexHandle {
        self.half_edges[he.twin()].target
    }

    /// The face left of the half edge or `None` if it's a boundary half edge.
    pub fn face_of(&self, he: HalfEdgeHandle) -> Option<FaceHandle> {
        self.half_edges[he].face
    }

    /// The next half edge in the same face or `None` for boundary half edges.
    pub fn next(&self, he: HalfEdgeHandle) -> Option<HalfEdgeHandle> {
        self.half_edges[he].next
    }

    /// The previous half edge in the same face or `None` for boundary half
    /// edges.
    pub fn prev(&self, he: HalfEdgeHandle) -> Option<HalfEdgeHandle> {
        // All faces are triangles.
        self.next(he).and_then(|next| self.next(next))
    }

    /// The three half edges of a face, in counter-clockwise order.
    pub fn half_edges_of_face(&self, face: FaceHandle) -> [HalfEdgeHandle; 3] {
        let a = self.faces[face].edge;
        let b = self.half_edges[a].next.unwrap_or(a);
        let c = self.half_edges[b].next.unwrap_or(b);
        [a, b, c]
    }

    /// The three vertices of a face, in counter-clockwise order.
    pub fn vertices_of_face(&self, face: FaceHandle) -> [VertexHandle; 3] {
        let [a, b, c] = self.half_edges_of_face(face);
        [self.origin(a), self.origin(b), self.origin(c)]
    }

    /// The reference half edge of a vertex (`None` for isolated vertices).
    ///
    /// For boundary vertices, this half edge lies on the boundary (its twin
    /// has no face).
    pub fn reference_half_edge(&self, v: VertexHandle) -> Option<HalfEdgeHandle> {
        self.vertices[v].outgoing
    }

    pub fn is_isolated_vertex(&self, v: VertexHandle) -> bool {
        self.vertices[v].outgoing.is_none()
    }

    pub fn is_boundary_vertex(&self, v: VertexHandle) -> bool {
        self.vertices[v].outgoing
            .map(|he| self.half_edges[he.twin()].face.is_none())
            .unwrap_or(false)
    }

    pub fn is_boundary_edge(&self, e: EdgeHandle) -> bool {
        let he = e.half_edge();
        self.half_edges[he].face.is_none() || self.half_edges[he.twin()].face.is_none()
    }

    pub fn has_boundary(&self) -> bool {
        self.half_edges.values().any(|he| he.face.is_none())
    }

    /// Iterates over all outgoing half edges of `v` in counter-clockwise
    /// order, starting with the reference half edge.
    ///
    /// For boundary vertices, the last half edge yielded is the boundary half
    /// edge leaving `v` (the one without face).
    pub fn outgoing_half_edges(&self, v: VertexHandle) -> OutgoingHalfEdges<'_> {
        let start = self.vertices[v].outgoing;
        OutgoingHalfEdges {
            mesh: self,
            current: start,
            start: start.unwrap_or(HalfEdgeHandle::new(0)),
        }
    }

    /// The one-ring neighbors of `v` in counter-clockwise order.
    pub fn neighbors(&self, v: VertexHandle) -> impl Iterator<Item = VertexHandle> + '_ {
        self.outgoing_half_edges(v).map(move |he| self.target(he))
    }

    /// The vertex indices of all faces, as used for registering the mesh
    /// with a viewer.
    pub fn face_vertex_list(&self) -> Vec<[usize; 3]> {
        self.faces()
            .map(|f| {
                let [a, b, c] = self.vertices_of_face(f);
                [a.to_usize(), b.to_usize(), c.to_usize()]
            })
            .collect()
    }
}

/// Iterator returned by [`HalfEdgeMesh::outgoing_half_edges`].
#[derive(Clone)]
pub struct OutgoingHalfEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    current: Option<HalfEdgeHandle>,
    start: HalfEdgeHandle,
}

impl Iterator for OutgoingHalfEdges<'_> {
    type Item = HalfEdgeHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.current?;

        // The next outgoing half edge counter-clockwise is the twin of the
        // previous half edge in the current face. Boundary half edges have no
        // face, so we stop there.
        self.current = self.mesh.prev(out)
            .map(|prev| prev.twin())
            .filter(|&next| next != self.start);

        Some(out)
    }
}

impl fmt::Debug for HalfEdgeMesh {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        struct FacesDebug<'a>(&'a HalfEdgeMesh);
        impl fmt::Debug for FacesDebug<'_> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.debug_map()
                    .entries(self.0.faces().map(|fh| (fh, self.0.vertices_of_face(fh))))
                    .finish()
            }
        }

        f.debug_struct("HalfEdgeMesh")
            .field("num_vertices", &self.num_vertices())
            .field("num_edges", &self.num_edges())
            .field("faces", &FacesDebug(self))
            .finish()
    }
}
