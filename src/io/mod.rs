//! Reading meshes from OBJ, OFF, PLY and STL files.
//!
//! Every reader produces a [`RawMesh`] (positions and triangles) which is
//! turned into a [`HalfEdgeMesh`] by [`RawMesh::into_mesh`]. [`load`] does
//! everything at once: detect the format, read the file, build the mesh and
//! compute its [`Geometry`].

use std::{
    fs,
    io,
    path::Path,
};

use cgmath::Point3;
use derive_more::Display;
use failure::Fail;
use log::debug;

use crate::{
    ds::{HalfEdgeMesh, InvalidMeshError},
    geometry::{Geometry, Positions},
};


pub mod obj;
pub mod off;
pub mod parse;
pub mod ply;
pub mod stl;

#[cfg(test)]
mod tests;


/// Represents one of the supported file formats.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    #[display(fmt = "OBJ")]
    Obj,
    #[display(fmt = "OFF")]
    Off,
    #[display(fmt = "PLY")]
    Ply,
    #[display(fmt = "STL")]
    Stl,
}

impl FileFormat {
    /// Tries to guess the file format from the file extension (ignoring
    /// case).
    ///
    /// Returns `None` if:
    /// - the path/file has no extension in its name, or
    /// - the extension is no valid UTF8, or
    /// - the file extension is not known.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| {
                match ext.to_ascii_lowercase().as_str() {
                    "obj" => Some(FileFormat::Obj),
                    "off" => Some(FileFormat::Off),
                    "ply" => Some(FileFormat::Ply),
                    "stl" => Some(FileFormat::Stl),
                    _ => None,
                }
            })
    }

    /// Tries to guess the file format from the start of the file contents.
    ///
    /// PLY files have the magic number `ply` and OFF files start with `OFF`
    /// (possibly after comment lines); STL files start with `solid`
    /// or are binary files with a size matching their triangle count. OBJ
    /// has no magic number, so a file is assumed to be OBJ if it starts with
    /// one of the common statements (`#`, `v`, `o`, `g`, `mtllib`, ...).
    pub fn from_file_start(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"ply\n") || data.starts_with(b"ply\r\n") {
            return Some(FileFormat::Ply);
        }

        if is_off_start(data) {
            return Some(FileFormat::Off);
        }

        if data.starts_with(b"solid")
            || (data.len() >= stl::BINARY_HEADER_LEN + 4
                && stl::guess_encoding(data) == stl::Encoding::Binary)
        {
            return Some(FileFormat::Stl);
        }

        let start = data.iter()
            .position(|b| !b.is_ascii_whitespace())
            .map(|pos| &data[pos..])
            .unwrap_or(&[]);
        let first_word = start.split(|b| b.is_ascii_whitespace()).next().unwrap_or(&[]);
        let is_obj = start.starts_with(b"#") || match first_word {
            b"v" | b"vt" | b"vn" | b"f" | b"o" | b"g" | b"s" | b"mtllib" | b"usemtl" => true,
            _ => false,
        };

        if is_obj {
            Some(FileFormat::Obj)
        } else {
            None
        }
    }
}

/// Whether `data` starts with the `OFF` keyword, skipping leading blank and
/// comment lines.
fn is_off_start(mut data: &[u8]) -> bool {
    loop {
        let start = data.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(data.len());
        data = &data[start..];
        if !data.starts_with(b"#") {
            break;
        }
        let end = data.iter().position(|&b| b == b'\n').unwrap_or(data.len());
        data = &data[end..];
    }

    data.starts_with(b"OFF") && data.get(3).map_or(true, |b| b.is_ascii_whitespace())
}

/// Vertex positions and triangles as read from a file, not yet checked for
/// being a valid manifold mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMesh {
    pub positions: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl RawMesh {
    /// Builds the half edge mesh. Fails if the triangles don't form a
    /// manifold mesh or reference vertices that don't exist.
    pub fn into_mesh(self) -> Result<(HalfEdgeMesh, Positions), InvalidMeshError> {
        let mesh = HalfEdgeMesh::from_triangles(self.positions.len(), &self.faces)?;
        Ok((mesh, self.positions.into()))
    }
}

#[derive(Debug, Fail)]
pub enum LoadError {
    #[fail(display = "failed to read '{}'", _0)]
    Io(String, #[cause] io::Error),

    #[fail(
        display = "could not determine the file format of '{}' (supported: OBJ, PLY, STL)",
        _0
    )]
    UnknownFormat(String),

    #[fail(display = "invalid {} file", _0)]
    Parse(FileFormat, #[cause] parse::Error),

    #[fail(display = "file does not contain a valid mesh")]
    InvalidMesh(#[cause] InvalidMeshError),
}

impl From<InvalidMeshError> for LoadError {
    fn from(src: InvalidMeshError) -> Self {
        LoadError::InvalidMesh(src)
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

/// Reads the raw mesh data from a file in the given format.
pub fn read_raw(data: &[u8], format: FileFormat) -> Result<RawMesh, parse::Error> {
    match format {
        FileFormat::Obj => obj::read(data),
        FileFormat::Off => off::read(data),
        FileFormat::Ply => ply::read(data),
        FileFormat::Stl => stl::read(data, stl::ReadOptions::default()),
    }
}

/// Reads a mesh from memory.
pub fn read_from_memory(
    data: &[u8],
    format: FileFormat,
) -> Result<(HalfEdgeMesh, Positions), LoadError> {
    let raw = read_raw(data, format).map_err(|e| LoadError::Parse(format, e))?;
    let out = raw.into_mesh()?;

    debug!(
        "read {} mesh with {} vertices, {} faces and {} edges",
        format,
        out.0.num_vertices(),
        out.0.num_faces(),
        out.0.num_edges(),
    );

    Ok(out)
}

/// Reads the mesh in the file at `path`. The format is determined by the
/// file extension or, if that fails, by the first bytes of the file.
pub fn read(path: impl AsRef<Path>) -> Result<(HalfEdgeMesh, Positions), LoadError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|e| LoadError::Io(display_path(path), e))?;

    let format = FileFormat::from_extension(path)
        .or_else(|| FileFormat::from_file_start(&data))
        .ok_or_else(|| LoadError::UnknownFormat(display_path(path)))?;

    read_from_memory(&data, format)
}

/// Reads the mesh in the file at `path` (see [`read`]) and computes its
/// geometry.
pub fn load(path: impl AsRef<Path>) -> Result<(HalfEdgeMesh, Geometry), LoadError> {
    let (mesh, positions) = read(path)?;
    let geometry = Geometry::new(&mesh, positions);
    Ok((mesh, geometry))
}
