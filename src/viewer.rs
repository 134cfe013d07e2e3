//! The interface to an (external) viewer and the per-vertex data shown in it.
//!
//! The library doesn't render anything itself. A [`Viewer`] receives the
//! mesh, the tangent bases and the direction field as typed data; the
//! exporter reads the very same [`VertexVectorQuantity`].

use std::ops::{Deref, DerefMut};

use cgmath::{Point3, Vector3};
use failure::Error;

use crate::{
    VertexHandle,
    algo::DirectionField,
    ds::HalfEdgeMesh,
    export::ExportRecord,
    geometry::{Geometry, Positions},
    map::VecMap,
};


/// A field of tangent vectors living on the vertices of a mesh, expressed in
/// world coordinates.
#[derive(Debug, Clone)]
pub struct VertexVectorQuantity {
    roots: VecMap<VertexHandle, Point3<f64>>,
    normals: VecMap<VertexHandle, Vector3<f64>>,
    vectors: VecMap<VertexHandle, Vector3<f64>>,
}

impl VertexVectorQuantity {
    /// Converts a field given in the intrinsic tangent frames of the vertices
    /// to world space, using the tangent bases of `geometry`.
    ///
    /// Panics if `field` doesn't have exactly one entry per vertex.
    pub fn from_intrinsic(mesh: &HalfEdgeMesh, geometry: &Geometry, field: &DirectionField) -> Self {
        assert_eq!(
            field.num_elements(),
            mesh.num_vertices(),
            "direction field doesn't match the mesh",
        );

        let len = mesh.num_vertices() as usize;
        let mut roots = VecMap::with_capacity(len);
        let mut normals = VecMap::with_capacity(len);
        let mut vectors = VecMap::with_capacity(len);
        for v in mesh.vertices() {
            roots.push(geometry.position(v));
            normals.push(geometry.vertex_normal(v));
            vectors.push(geometry.tangent_basis(v).to_world(field[v]));
        }

        Self { roots, normals, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.num_elements() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The point each vector is attached to (the vertex position).
    pub fn vector_roots(&self) -> &VecMap<VertexHandle, Point3<f64>> {
        &self.roots
    }

    pub fn vertex_normals(&self) -> &VecMap<VertexHandle, Vector3<f64>> {
        &self.normals
    }

    pub fn vectors(&self) -> &VecMap<VertexHandle, Vector3<f64>> {
        &self.vectors
    }

    /// One record per vertex, in vertex order.
    pub fn export_records(&self) -> Vec<ExportRecord> {
        self.roots.values()
            .zip(self.normals.values())
            .zip(self.vectors.values())
            .map(|((&root, &normal), &tangent)| ExportRecord { root, normal, tangent })
            .collect()
    }
}

/// Something that can display meshes and vector fields on them.
///
/// Structures are referred to by name. `init` is called once before
/// everything else and `shutdown` once at the very end; [`ViewerSession`]
/// takes care of both.
pub trait Viewer {
    fn init(&mut self) -> Result<(), Error>;

    fn register_surface_mesh(
        &mut self,
        name: &str,
        positions: &Positions,
        faces: &[[usize; 3]],
    ) -> Result<(), Error>;

    /// Sets the first axis of every vertex's tangent basis. The viewer uses
    /// it to interpret intrinsic quantities.
    fn set_vertex_tangent_basis_x(
        &mut self,
        mesh_name: &str,
        basis_x: &VecMap<VertexHandle, Vector3<f64>>,
    ) -> Result<(), Error>;

    fn add_vertex_vector_quantity(
        &mut self,
        mesh_name: &str,
        name: &str,
        quantity: &VertexVectorQuantity,
        enabled: bool,
    ) -> Result<(), Error>;

    /// Shows everything registered so far. Usually blocks until the user
    /// closes the viewer.
    fn show(&mut self) -> Result<(), Error>;

    fn shutdown(&mut self);
}

/// A viewer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullViewer;

impl Viewer for NullViewer {
    fn init(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn register_surface_mesh(&mut self, _: &str, _: &Positions, _: &[[usize; 3]]) -> Result<(), Error> {
        Ok(())
    }

    fn set_vertex_tangent_basis_x(
        &mut self,
        _: &str,
        _: &VecMap<VertexHandle, Vector3<f64>>,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn add_vertex_vector_quantity(
        &mut self,
        _: &str,
        _: &str,
        _: &VertexVectorQuantity,
        _: bool,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn shutdown(&mut self) {}
}

/// An initialized viewer. It is shut down when the session is dropped, on
/// every exit path.
#[derive(Debug)]
pub struct ViewerSession<V: Viewer> {
    viewer: V,
}

impl<V: Viewer> ViewerSession<V> {
    pub fn new(mut viewer: V) -> Result<Self, Error> {
        viewer.init()?;
        Ok(Self { viewer })
    }
}

impl<V: Viewer> Deref for ViewerSession<V> {
    type Target = V;
    fn deref(&self) -> &Self::Target {
        &self.viewer
    }
}

impl<V: Viewer> DerefMut for ViewerSession<V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.viewer
    }
}

impl<V: Viewer> Drop for ViewerSession<V> {
    fn drop(&mut self) {
        self.viewer.shutdown();
    }
}


#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use approx::assert_relative_eq;
    use cgmath::{prelude::*, Vector2};

    use crate::shape;
    use super::*;

    /// Logs every call into a shared list.
    struct RecordingViewer(Rc<RefCell<Vec<String>>>);

    impl RecordingViewer {
        fn log(&self, s: impl Into<String>) -> Result<(), Error> {
            self.0.borrow_mut().push(s.into());
            Ok(())
        }
    }

    impl Viewer for RecordingViewer {
        fn init(&mut self) -> Result<(), Error> {
            self.log("init")
        }

        fn register_surface_mesh(
            &mut self,
            name: &str,
            positions: &Positions,
            faces: &[[usize; 3]],
        ) -> Result<(), Error> {
            self.log(format!("mesh {} {} {}", name, positions.num_elements(), faces.len()))
        }

        fn set_vertex_tangent_basis_x(
            &mut self,
            mesh_name: &str,
            basis_x: &VecMap<VertexHandle, Vector3<f64>>,
        ) -> Result<(), Error> {
            self.log(format!("basis {} {}", mesh_name, basis_x.num_elements()))
        }

        fn add_vertex_vector_quantity(
            &mut self,
            mesh_name: &str,
            name: &str,
            quantity: &VertexVectorQuantity,
            enabled: bool,
        ) -> Result<(), Error> {
            self.log(format!("quantity {} {} {} {}", mesh_name, name, quantity.len(), enabled))
        }

        fn show(&mut self) -> Result<(), Error> {
            self.log("show")
        }

        fn shutdown(&mut self) {
            self.0.borrow_mut().push("shutdown".into());
        }
    }

    fn constant_field(mesh: &HalfEdgeMesh) -> DirectionField {
        mesh.vertices().map(|v| (v, Vector2::new(1.0, 0.0))).collect()
    }

    #[test]
    fn quantity_is_in_world_space() {
        let (mesh, positions) = shape::grid(2, 1);
        let geom = Geometry::new(&mesh, positions);
        let field = mesh.vertices().map(|v| (v, Vector2::new(0.0, 1.0))).collect();
        let q = VertexVectorQuantity::from_intrinsic(&mesh, &geom, &field);

        assert_eq!(q.len(), 6);
        for v in mesh.vertices() {
            assert_eq!(q.vector_roots()[v], geom.position(v));
            assert_eq!(q.vertex_normals()[v], geom.vertex_normal(v));

            // `(0, 1)` is the second basis vector, perpendicular to the
            // normal.
            assert_relative_eq!(q.vectors()[v], geom.tangent_basis(v).y, epsilon = 1e-12);
            assert_relative_eq!(q.vectors()[v].dot(geom.vertex_normal(v)), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn export_records_follow_vertex_order() {
        let (mesh, positions) = shape::tetrahedron();
        let geom = Geometry::new(&mesh, positions);
        let q = VertexVectorQuantity::from_intrinsic(&mesh, &geom, &constant_field(&mesh));
        let records = q.export_records();

        assert_eq!(records.len(), 4);
        for (v, record) in mesh.vertices().zip(&records) {
            assert_eq!(record.root, geom.position(v));
            assert_eq!(record.normal, geom.vertex_normal(v));
            assert_eq!(record.tangent, geom.tangent_basis(v).x);
        }
    }

    #[test]
    fn isolated_vertex_exports_zeroes() {
        let mesh = HalfEdgeMesh::from_triangles(1, &[]).unwrap();
        let geom = Geometry::new(&mesh, vec![Point3::new(1.0, 2.0, 3.0)].into());
        let q = VertexVectorQuantity::from_intrinsic(&mesh, &geom, &constant_field(&mesh));
        let records = q.export_records();

        assert_eq!(records.len(), 1);
        assert!(records[0].tangent.x.is_nan());
        assert_eq!(records[0].values(), [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn session_calls_init_and_shutdown() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mesh, positions) = shape::disk(5);
        let geom = Geometry::new(&mesh, positions);
        let q = VertexVectorQuantity::from_intrinsic(&mesh, &geom, &constant_field(&mesh));

        {
            let mut session = ViewerSession::new(RecordingViewer(log.clone())).unwrap();
            session.register_surface_mesh("m", geom.positions(), &mesh.face_vertex_list()).unwrap();
            let basis_x = geom.tangent_bases().iter().map(|(v, b)| (v, b.x)).collect();
            session.set_vertex_tangent_basis_x("m", &basis_x).unwrap();
            session.add_vertex_vector_quantity("m", "vectors", &q, true).unwrap();
            session.show().unwrap();
        }

        assert_eq!(*log.borrow(), vec![
            "init",
            "mesh m 6 5",
            "basis m 6",
            "quantity m vectors 6 true",
            "show",
            "shutdown",
        ]);
    }

    #[test]
    fn shutdown_without_show() {
        let log = Rc::new(RefCell::new(Vec::new()));
        drop(ViewerSession::new(RecordingViewer(log.clone())).unwrap());
        assert_eq!(*log.borrow(), vec!["init", "shutdown"]);

        let mut null = ViewerSession::new(NullViewer).unwrap();
        null.show().unwrap();
    }
}
