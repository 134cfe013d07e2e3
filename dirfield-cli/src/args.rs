//! Defines `Args` which is used to parse command line arguments.

use std::path::PathBuf;

use structopt::StructOpt;


/// Computes the smoothest tangent direction field on a triangle mesh and
/// writes it to `<mesh-name>_vertex_dir_field.txt` next to the mesh file.
#[derive(StructOpt, Debug)]
#[structopt(name = "dirfield")]
pub struct Args {
    /// Path to the mesh file (OBJ, PLY or STL).
    #[structopt(parse(from_os_str))]
    pub mesh: Option<PathBuf>,

    /// If set, the viewer is not shown. The output file is written anyway.
    #[structopt(short = "s", long = "silent")]
    pub silent: bool,
}
