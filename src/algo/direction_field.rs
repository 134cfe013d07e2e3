//! Smoothest tangent direction fields on the vertices of a mesh.
//!
//! The field minimizes the Dirichlet energy of the discrete connection
//! Laplacian: for each edge `(i, j)` with cotan weight `w` and transport
//! rotation `r_ij`, the energy contains `w · |z_j − r_ij · z_i|²`, where
//! `z_i` is the tangent vector of vertex `i` as complex number in the
//! intrinsic tangent frame of `i`.
//!
//! - Closed meshes: the field is the eigenvector of the smallest eigenvalue
//!   of `L z = λ M z` (`M` is the lumped mass matrix), found with inverse
//!   power iteration.
//! - Meshes with boundary: boundary vertices are fixed to the direction of
//!   the boundary, the interior is the energy minimizer under these
//!   Dirichlet conditions.
//!
//! Complex numbers `a + bi` are expanded into real 2×2 blocks
//! `[[a, −b], [b, a]]`; the Hermitian system becomes a real symmetric one
//! and can be factorized with a sparse Cholesky decomposition.

use cgmath::Vector2;
use failure::Fail;
use log::{debug, warn};
use nalgebra::DMatrix;
use nalgebra_sparse::{
    factorization::{CholeskyError, CscCholesky},
    CooMatrix, CscMatrix,
};

use crate::{
    ds::{HalfEdgeMesh, InvalidMeshError},
    geometry::Geometry,
    handle::{Handle, VertexHandle},
    map::VecMap,
    math::{conj, normalize_or_zero},
};


/// One 2D vector per vertex, expressed in the vertex's intrinsic tangent
/// frame (angle 0 points along the vertex's reference half edge).
pub type DirectionField = VecMap<VertexHandle, Vector2<f64>>;

/// Options for [`smoothest_vertex_direction_field_with`].
#[derive(Debug, Clone, Copy)]
pub struct FieldOptions {
    /// Maximum number of inverse power iterations on closed meshes.
    /// *Default*: 50.
    pub max_iterations: usize,

    /// The inverse power iteration stops once an iteration changes the
    /// solution by less than this (in the mass norm). *Default*: `1e-8`.
    pub tolerance: f64,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
        }
    }
}

#[derive(Debug, Fail)]
pub enum FieldError {
    #[fail(display = "invalid mesh: {}", _0)]
    InvalidMesh(#[cause] InvalidMeshError),

    #[fail(display = "failed to factorize the field energy matrix: {:?}", _0)]
    Factorization(CholeskyError),
}

impl From<InvalidMeshError> for FieldError {
    fn from(src: InvalidMeshError) -> Self {
        FieldError::InvalidMesh(src)
    }
}

/// Computes the smoothest unit direction field with default options. See
/// [`smoothest_vertex_direction_field_with`].
pub fn smoothest_vertex_direction_field(
    mesh: &HalfEdgeMesh,
    geometry: &Geometry,
) -> Result<DirectionField, FieldError> {
    smoothest_vertex_direction_field_with(mesh, geometry, FieldOptions::default())
}

/// Computes the smoothest direction field: exactly one vector per vertex,
/// normalized to unit length unless it is zero.
///
/// Fails if the mesh has no vertices or if the energy matrix can't be
/// factorized (which only happens for severely degenerate geometry).
pub fn smoothest_vertex_direction_field_with(
    mesh: &HalfEdgeMesh,
    geometry: &Geometry,
    options: FieldOptions,
) -> Result<DirectionField, FieldError> {
    if mesh.num_vertices() == 0 {
        return Err(InvalidMeshError::Empty.into());
    }

    let system = FieldSystem::new(mesh, geometry);
    let solution = if mesh.has_boundary() {
        debug!("mesh has boundary, solving with boundary-aligned Dirichlet conditions");
        system.solve_boundary_aligned(mesh)?
    } else {
        debug!("mesh is closed, computing the smallest eigenvector");
        system.smallest_eigenvector(options)?
    };

    Ok(mesh.vertices()
        .map(|v| {
            let i = v.to_usize();
            (v, normalize_or_zero(Vector2::new(solution[2 * i], solution[2 * i + 1])))
        })
        .collect())
}


/// The real form of the connection Laplacian and the lumped mass matrix.
pub(crate) struct FieldSystem {
    num_vertices: usize,

    /// Entries of the `2n × 2n` real symmetric Laplacian. May contain
    /// duplicates, which are summed up.
    triplets: Vec<(usize, usize, f64)>,

    /// Lumped mass per vertex (applies to both real components).
    mass: Vec<f64>,

    /// Multiple of `M` added to `L` to make it positive definite.
    shift: f64,
}

impl FieldSystem {
    pub(crate) fn new(mesh: &HalfEdgeMesh, geometry: &Geometry) -> Self {
        let num_vertices = mesh.num_vertices() as usize;
        let mut triplets = Vec::with_capacity(16 * mesh.num_edges() as usize);

        // Adds the complex entry `c` at (row, col).
        let mut add = |row: usize, col: usize, c: Vector2<f64>| {
            triplets.push((2 * row, 2 * col, c.x));
            triplets.push((2 * row, 2 * col + 1, -c.y));
            triplets.push((2 * row + 1, 2 * col, c.y));
            triplets.push((2 * row + 1, 2 * col + 1, c.x));
        };

        let mut skipped = 0;
        for e in mesh.edges() {
            let w = geometry.cotan_weight(e);
            if !w.is_finite() {
                skipped += 1;
                continue;
            }

            let he = e.half_edge();
            let i = mesh.origin(he).to_usize();
            let j = mesh.target(he).to_usize();
            let r = geometry.transport_along_half_edge(he);

            add(i, i, Vector2::new(w, 0.0));
            add(j, j, Vector2::new(w, 0.0));
            add(j, i, -r * w);
            add(i, j, -conj(r) * w);
        }
        if skipped > 0 {
            warn!("ignored {} edges with non-finite cotan weights (degenerate faces)", skipped);
        }

        // Isolated vertices and vertices only adjacent to degenerate faces
        // have no area. They get the average area so that `M` stays
        // positive definite.
        let areas = mesh.vertices().map(|v| geometry.vertex_dual_area(v)).collect::<Vec<_>>();
        let valid = areas.iter().filter(|a| a.is_finite() && **a > 0.0);
        let (sum, count) = valid.fold((0.0f64, 0usize), |(s, c), a| (s + a, c + 1));
        let fallback = if count > 0 { sum / count as f64 } else { 1.0 };
        let mass = areas.into_iter()
            .map(|a| if a.is_finite() && a > 0.0 { a } else { fallback })
            .collect::<Vec<_>>();

        let trace_l: f64 = triplets.iter()
            .filter(|&&(r, c, _)| r == c)
            .map(|&(_, _, v)| v)
            .sum::<f64>() / 2.0;
        let trace_m: f64 = mass.iter().sum();
        let shift = if trace_l > 0.0 { 1e-6 * trace_l / trace_m } else { 1.0 };

        Self { num_vertices, triplets, mass, shift }
    }

    /// Computes `L x`.
    pub(crate) fn apply_laplacian(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; x.len()];
        for &(r, c, v) in &self.triplets {
            out[r] += v * x[c];
        }
        out
    }

    fn mass_of(&self, component: usize) -> f64 {
        self.mass[component / 2]
    }

    fn mass_norm(&self, x: &[f64]) -> f64 {
        x.iter()
            .enumerate()
            .map(|(k, xk)| self.mass_of(k) * xk * xk)
            .sum::<f64>()
            .sqrt()
    }

    /// Inverse power iteration for the smallest eigenvector of
    /// `L x = λ M x`. The result is normalized in the mass norm.
    pub(crate) fn smallest_eigenvector(&self, options: FieldOptions) -> Result<Vec<f64>, FieldError> {
        let dim = 2 * self.num_vertices;
        let chol = factorize(dim, self.shifted_triplets(|k| Some(k)))?;

        // Deterministic, but not symmetric start vector.
        let mut x = (0..dim)
            .map(|k| 1.0 + 0.5 * (k as f64 * 0.618_033_988_75).fract())
            .collect::<Vec<_>>();
        let norm = self.mass_norm(&x);
        x.iter_mut().for_each(|xk| *xk /= norm);

        for iteration in 0..options.max_iterations {
            let rhs = x.iter()
                .enumerate()
                .map(|(k, xk)| self.mass_of(k) * xk)
                .collect::<Vec<_>>();
            let mut y = solve(&chol, &rhs);
            let norm = self.mass_norm(&y);
            y.iter_mut().for_each(|yk| *yk /= norm);

            let diff = x.iter().zip(&y).map(|(a, b)| a - b).collect::<Vec<_>>();
            let change = self.mass_norm(&diff);
            x = y;

            if change < options.tolerance {
                debug!("inverse power iteration converged after {} iterations", iteration + 1);
                return Ok(x);
            }
        }

        debug!(
            "inverse power iteration stopped after {} iterations without reaching \
                tolerance {}",
            options.max_iterations,
            options.tolerance,
        );
        Ok(x)
    }

    /// Fixes every boundary vertex to the unit vector along its reference
    /// half edge (which runs along the boundary) and minimizes the energy
    /// for the remaining vertices.
    pub(crate) fn solve_boundary_aligned(&self, mesh: &HalfEdgeMesh) -> Result<Vec<f64>, FieldError> {
        let mut solution = vec![0.0; 2 * self.num_vertices];

        // Maps a vertex index to its index among the interior vertices.
        let mut interior_index = vec![None; self.num_vertices];
        let mut num_interior = 0;
        for v in mesh.vertices() {
            if mesh.is_boundary_vertex(v) {
                solution[2 * v.to_usize()] = 1.0;
            } else {
                interior_index[v.to_usize()] = Some(num_interior);
                num_interior += 1;
            }
        }

        if num_interior == 0 {
            return Ok(solution);
        }

        // Maps a component of the full system to a component of the
        // interior system.
        let reduce = |k: usize| interior_index[k / 2].map(|i| 2 * i + k % 2);

        // Move the known boundary values to the right hand side.
        let mut rhs = vec![0.0; 2 * num_interior];
        for &(r, c, v) in &self.triplets {
            if let (Some(row), None) = (reduce(r), reduce(c)) {
                rhs[row] -= v * solution[c];
            }
        }

        let chol = factorize(2 * num_interior, self.shifted_triplets(reduce))?;
        let interior = solve(&chol, &rhs);

        for k in 0..solution.len() {
            if let Some(reduced) = reduce(k) {
                solution[k] = interior[reduced];
            }
        }

        Ok(solution)
    }

    /// All entries of `L + shift · M` whose row and column survive the
    /// given index mapping, already mapped.
    fn shifted_triplets<'a>(
        &'a self,
        map: impl Fn(usize) -> Option<usize> + Copy + 'a,
    ) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
        let laplacian = self.triplets.iter().filter_map(move |&(r, c, v)| {
            Some((map(r)?, map(c)?, v))
        });
        let mass = (0..2 * self.num_vertices).filter_map(move |k| {
            map(k).map(|reduced| (reduced, reduced, self.shift * self.mass_of(k)))
        });

        laplacian.chain(mass)
    }
}

fn factorize(
    dim: usize,
    triplets: impl Iterator<Item = (usize, usize, f64)>,
) -> Result<CscCholesky<f64>, FieldError> {
    let mut coo = CooMatrix::new(dim, dim);
    for (r, c, v) in triplets {
        coo.push(r, c, v);
    }

    let csc = CscMatrix::from(&coo);
    debug!("factorizing {}x{} system with {} non-zeros", dim, dim, csc.nnz());
    CscCholesky::factor(&csc).map_err(FieldError::Factorization)
}

fn solve(chol: &CscCholesky<f64>, rhs: &[f64]) -> Vec<f64> {
    let b = DMatrix::from_column_slice(rhs.len(), 1, rhs);
    chol.solve(&b).iter().copied().collect()
}
