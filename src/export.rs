//! Writing a direction field to a plain text file.
//!
//! The file starts with the line [`HEADER`], followed by one line per vertex
//! with nine space-separated numbers: the root position, the vertex normal
//! and the tangent vector, each as `x y z`. Non-finite values are written
//! as `0`.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use cgmath::{Point3, Vector3};
use failure::Fail;
use log::debug;

use crate::math::{sanitize, sanitize_vec3};


/// The first line of every exported file. It only documents the columns and
/// is not meant to be parsed.
pub const HEADER: &str = "Vertex X Y Z, Normal X Y Z, Tangent X Y Z";

/// Appended to the input file stem to get the name of the output file.
pub const OUTPUT_SUFFIX: &str = "_vertex_dir_field.txt";

/// The data of one exported vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportRecord {
    pub root: Point3<f64>,
    pub normal: Vector3<f64>,
    pub tangent: Vector3<f64>,
}

impl ExportRecord {
    /// All nine values in file order, sanitized.
    pub fn values(&self) -> [f64; 9] {
        let n = sanitize_vec3(self.normal);
        let t = sanitize_vec3(self.tangent);
        [
            sanitize(self.root.x), sanitize(self.root.y), sanitize(self.root.z),
            n.x, n.y, n.z,
            t.x, t.y, t.z,
        ]
    }
}

#[derive(Debug, Fail)]
pub enum ExportError {
    #[fail(display = "failed to open '{}' for writing", _0)]
    Open(String, #[cause] io::Error),

    #[fail(display = "failed to write to '{}'", _0)]
    Write(String, #[cause] io::Error),
}

/// The path of the output file for the mesh file `input`: in the same
/// directory, with the extension replaced by [`OUTPUT_SUFFIX`].
///
/// ```
/// use std::path::Path;
/// use dirfield::export::output_path;
///
/// assert_eq!(
///     output_path(Path::new("/a/b/bunny.obj")),
///     Path::new("/a/b/bunny_vertex_dir_field.txt"),
/// );
/// ```
pub fn output_path(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(OUTPUT_SUFFIX);
    input.with_file_name(name)
}

/// Writes the header and one line per record into `w`.
pub fn write_records<'a>(
    records: impl IntoIterator<Item = &'a ExportRecord>,
    mut w: impl Write,
) -> io::Result<()> {
    writeln!(w, "{}", HEADER)?;
    for record in records {
        let values = record.values();
        write!(w, "{}", values[0])?;
        for v in &values[1..] {
            write!(w, " {}", v)?;
        }
        writeln!(w)?;
    }

    Ok(())
}

/// Writes all records to the file at `path`, replacing it if it exists.
pub fn export(records: &[ExportRecord], path: &Path) -> Result<(), ExportError> {
    let display = || path.display().to_string();

    let file = File::create(path).map_err(|e| ExportError::Open(display(), e))?;
    let mut w = BufWriter::new(file);

    write_records(records, &mut w)
        .and_then(|_| w.flush())
        .map_err(|e| ExportError::Write(display(), e))?;

    debug!("wrote {} records to '{}'", records.len(), path.display());
    Ok(())
}


#[cfg(test)]
mod tests {
    use std::{f64::NAN, fs};

    use super::*;

    fn record(i: f64) -> ExportRecord {
        ExportRecord {
            root: Point3::new(i, 2.0 * i, -i),
            normal: Vector3::new(0.0, 0.0, 1.0),
            tangent: Vector3::new(1.0, 0.0, 0.0),
        }
    }

    fn to_string(records: &[ExportRecord]) -> String {
        let mut out = Vec::new();
        write_records(records, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn output_path_is_next_to_input() {
        assert_eq!(
            output_path(Path::new("/a/b/bunny.obj")),
            Path::new("/a/b/bunny_vertex_dir_field.txt"),
        );
        assert_eq!(output_path(Path::new("spot.ply")), Path::new("spot_vertex_dir_field.txt"));
        assert_eq!(
            output_path(Path::new("dir/mesh.tar.stl")),
            Path::new("dir/mesh.tar_vertex_dir_field.txt"),
        );
        assert_eq!(output_path(Path::new("noext")), Path::new("noext_vertex_dir_field.txt"));
    }

    #[test]
    fn one_line_per_record() {
        let records = (0..5).map(|i| record(i as f64)).collect::<Vec<_>>();
        let out = to_string(&records);
        let lines = out.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), records.len() + 1);
        assert_eq!(lines[0], HEADER);
        for line in &lines[1..] {
            let tokens = line.split(' ').collect::<Vec<_>>();
            assert_eq!(tokens.len(), 9);
            assert!(tokens.iter().all(|t| t.parse::<f64>().is_ok()));
        }
        assert_eq!(lines[3], "2 4 -2 0 0 1 1 0 0");
    }

    #[test]
    fn empty_field_only_has_header() {
        assert_eq!(to_string(&[]), format!("{}\n", HEADER));
    }

    #[test]
    fn non_finite_values_are_zeroed() {
        let r = ExportRecord {
            root: Point3::new(0.5, f64::INFINITY, 1.0),
            normal: Vector3::new(NAN, NAN, NAN),
            tangent: Vector3::new(f64::NEG_INFINITY, 0.25, NAN),
        };
        let out = to_string(&[r]);

        assert_eq!(out.lines().nth(1), Some("0.5 0 1 0 0 0 0 0.25 0"));
    }

    #[test]
    fn values_round_trip() {
        let r = ExportRecord {
            root: Point3::new(0.1, 1e-7, 123456.789),
            normal: Vector3::new(-0.0, 1.0, 0.3333333333333333),
            tangent: Vector3::new(2.5e10, -1.0, 0.0),
        };
        let out = to_string(&[r]);
        let parsed = out.lines()
            .nth(1)
            .unwrap()
            .split(' ')
            .map(|t| t.parse::<f64>().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(parsed, r.values().to_vec());
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        export(&[record(1.0), record(2.0)], &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, to_string(&[record(1.0), record(2.0)]));

        // Existing files are replaced.
        export(&[record(3.0)], &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), to_string(&[record(3.0)]));
    }

    #[test]
    fn missing_directory_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        match export(&[record(1.0)], &path) {
            Err(ExportError::Open(p, _)) => assert_eq!(p, path.display().to_string()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
