//! A viewer that prints what it's given to the terminal.

use cgmath::{InnerSpace, Vector3};
use failure::{bail, Error};
use dirfield::{
    VertexHandle,
    geometry::Positions,
    map::VecMap,
    viewer::{VertexVectorQuantity, Viewer},
};

use crate::ui;


#[derive(Debug)]
struct MeshEntry {
    name: String,
    num_vertices: usize,
    num_faces: usize,
    has_basis: bool,
}

#[derive(Debug)]
struct QuantityEntry {
    mesh_name: String,
    name: String,
    len: usize,
    enabled: bool,
    lengths: Option<LengthStats>,
}

/// Minimum, mean and maximum of a set of vector lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LengthStats {
    min: f64,
    mean: f64,
    max: f64,
}

impl LengthStats {
    /// Returns `None` if there are no finite vectors.
    fn of<'a>(vectors: impl IntoIterator<Item = &'a Vector3<f64>>) -> Option<Self> {
        let mut count = 0;
        let mut sum = 0.0;
        let mut min = std::f64::INFINITY;
        let mut max = std::f64::NEG_INFINITY;
        for len in vectors.into_iter().map(|v| v.magnitude()).filter(|l| l.is_finite()) {
            count += 1;
            sum += len;
            min = min.min(len);
            max = max.max(len);
        }

        if count == 0 {
            None
        } else {
            Some(Self { min, mean: sum / count as f64, max })
        }
    }
}

/// Prints a summary of all registered meshes and quantities when `show` is
/// called.
#[derive(Debug, Default)]
pub struct TerminalViewer {
    initialized: bool,
    meshes: Vec<MeshEntry>,
    quantities: Vec<QuantityEntry>,
}

impl TerminalViewer {
    fn mesh_mut(&mut self, name: &str) -> Result<&mut MeshEntry, Error> {
        match self.meshes.iter_mut().find(|m| m.name == name) {
            Some(m) => Ok(m),
            None => bail!("no mesh named '{}' was registered", name),
        }
    }
}

impl Viewer for TerminalViewer {
    fn init(&mut self) -> Result<(), Error> {
        if self.initialized {
            bail!("viewer was already initialized");
        }
        self.initialized = true;
        Ok(())
    }

    fn register_surface_mesh(
        &mut self,
        name: &str,
        positions: &Positions,
        faces: &[[usize; 3]],
    ) -> Result<(), Error> {
        let entry = MeshEntry {
            name: name.to_owned(),
            num_vertices: positions.num_elements() as usize,
            num_faces: faces.len(),
            has_basis: false,
        };

        // Registering under an existing name replaces the old mesh and
        // everything attached to it.
        self.quantities.retain(|q| q.mesh_name != name);
        match self.meshes.iter_mut().find(|m| m.name == name) {
            Some(old) => *old = entry,
            None => self.meshes.push(entry),
        }

        Ok(())
    }

    fn set_vertex_tangent_basis_x(
        &mut self,
        mesh_name: &str,
        basis_x: &VecMap<VertexHandle, Vector3<f64>>,
    ) -> Result<(), Error> {
        let mesh = self.mesh_mut(mesh_name)?;
        if basis_x.num_elements() as usize != mesh.num_vertices {
            bail!(
                "tangent basis has {} entries, but mesh '{}' has {} vertices",
                basis_x.num_elements(),
                mesh_name,
                mesh.num_vertices,
            );
        }

        mesh.has_basis = true;
        Ok(())
    }

    fn add_vertex_vector_quantity(
        &mut self,
        mesh_name: &str,
        name: &str,
        quantity: &VertexVectorQuantity,
        enabled: bool,
    ) -> Result<(), Error> {
        let mesh = self.mesh_mut(mesh_name)?;
        if quantity.len() != mesh.num_vertices {
            bail!(
                "quantity '{}' has {} entries, but mesh '{}' has {} vertices",
                name,
                quantity.len(),
                mesh_name,
                mesh.num_vertices,
            );
        }

        let entry = QuantityEntry {
            mesh_name: mesh_name.to_owned(),
            name: name.to_owned(),
            len: quantity.len(),
            enabled,
            lengths: LengthStats::of(quantity.vectors().values()),
        };
        self.quantities.retain(|q| !(q.mesh_name == mesh_name && q.name == name));
        self.quantities.push(entry);

        Ok(())
    }

    fn show(&mut self) -> Result<(), Error> {
        if !self.initialized {
            bail!("viewer was not initialized");
        }

        let count = |n: usize| ui::fmt_with_thousand_sep(n as u64);

        let mut meshes = vec![
            vec!["mesh".to_owned(), "vertices".into(), "faces".into(), "tangent basis".into()],
        ];
        for m in &self.meshes {
            meshes.push(vec![
                m.name.clone(),
                count(m.num_vertices),
                count(m.num_faces),
                String::from(if m.has_basis { "yes" } else { "-" }),
            ]);
        }
        ui::print_table(&meshes);

        if self.quantities.is_empty() {
            return Ok(());
        }

        let stat = |s: Option<LengthStats>, f: fn(LengthStats) -> f64| {
            s.map(|s| format!("{:.4}", f(s))).unwrap_or_else(|| "-".into())
        };
        let mut quantities = vec![vec![
            "quantity".to_owned(),
            "mesh".into(),
            "vectors".into(),
            "enabled".into(),
            "min length".into(),
            "mean length".into(),
            "max length".into(),
        ]];
        for q in &self.quantities {
            quantities.push(vec![
                q.name.clone(),
                q.mesh_name.clone(),
                count(q.len),
                String::from(if q.enabled { "yes" } else { "no" }),
                stat(q.lengths, |s| s.min),
                stat(q.lengths, |s| s.mean),
                stat(q.lengths, |s| s.max),
            ]);
        }
        ui::print_table(&quantities);

        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
        self.meshes.clear();
        self.quantities.clear();
    }
}


#[cfg(test)]
mod tests {
    use dirfield::{
        algo::smoothest_vertex_direction_field,
        geometry::Geometry,
        shape,
    };

    use super::*;

    #[test]
    fn length_stats() {
        let vectors = [
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 3.0, 4.0),
            Vector3::new(std::f64::NAN, 0.0, 0.0),
        ];
        let stats = LengthStats::of(&vectors).unwrap();
        assert_eq!(stats, LengthStats { min: 1.0, mean: 3.0, max: 5.0 });

        assert_eq!(LengthStats::of(&Vec::<Vector3<f64>>::new()), None);
    }

    #[test]
    fn records_mesh_and_quantity() {
        let (mesh, positions) = shape::uv_sphere(4, 6);
        let geom = Geometry::new(&mesh, positions);
        let field = smoothest_vertex_direction_field(&mesh, &geom).unwrap();
        let quantity = VertexVectorQuantity::from_intrinsic(&mesh, &geom, &field);

        let mut viewer = TerminalViewer::default();
        viewer.init().unwrap();
        viewer.register_surface_mesh("m", geom.positions(), &mesh.face_vertex_list()).unwrap();
        let basis_x = geom.tangent_bases().iter().map(|(v, b)| (v, b.x)).collect();
        viewer.set_vertex_tangent_basis_x("m", &basis_x).unwrap();
        viewer.add_vertex_vector_quantity("m", "vectors", &quantity, true).unwrap();

        assert_eq!(viewer.meshes.len(), 1);
        assert!(viewer.meshes[0].has_basis);
        assert_eq!(viewer.quantities.len(), 1);

        let lengths = viewer.quantities[0].lengths.unwrap();
        assert!(lengths.min >= 0.0);
        assert!(lengths.max <= 1.0 + 1e-9);

        viewer.show().unwrap();
        viewer.shutdown();
        assert!(viewer.meshes.is_empty());
    }

    #[test]
    fn unknown_mesh_is_error() {
        let (mesh, positions) = shape::tetrahedron();
        let geom = Geometry::new(&mesh, positions);
        let basis_x = geom.tangent_bases().iter().map(|(v, b)| (v, b.x)).collect();

        let mut viewer = TerminalViewer::default();
        viewer.init().unwrap();
        assert!(viewer.set_vertex_tangent_basis_x("nope", &basis_x).is_err());
        assert!(viewer.init().is_err());
    }
}
