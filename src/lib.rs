//! Smoothest tangent direction fields on triangle meshes.
//!
//! The typical pipeline:
//!
//! - read a mesh from an OBJ, PLY or STL file ([`io::load`]), which yields a
//!   [`HalfEdgeMesh`][ds::HalfEdgeMesh] and its [`Geometry`][geometry::Geometry]
//!   (normals, tangent bases, cotan weights, ...),
//! - compute the smoothest direction field
//!   ([`algo::smoothest_vertex_direction_field`]),
//! - convert it to world space ([`viewer::VertexVectorQuantity`]) and show it
//!   in a [`viewer::Viewer`] or write it to a text file ([`export`]).
//!
//! ```
//! use dirfield::{
//!     algo::smoothest_vertex_direction_field,
//!     export::write_records,
//!     geometry::Geometry,
//!     shape,
//!     viewer::VertexVectorQuantity,
//! };
//!
//! let (mesh, positions) = shape::uv_sphere(6, 8);
//! let geometry = Geometry::new(&mesh, positions);
//! let field = smoothest_vertex_direction_field(&mesh, &geometry)?;
//!
//! let quantity = VertexVectorQuantity::from_intrinsic(&mesh, &geometry, &field);
//! let mut out = Vec::new();
//! write_records(&quantity.export_records(), &mut out)?;
//! assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 1 + mesh.num_vertices() as usize);
//! # Ok::<(), failure::Error>(())
//! ```

pub mod algo;
pub mod ds;
pub mod export;
pub mod geometry;
pub mod handle;
pub mod io;
pub mod map;
pub mod math;
pub mod shape;
pub mod viewer;

pub use self::handle::{EdgeHandle, FaceHandle, HalfEdgeHandle, VertexHandle};
