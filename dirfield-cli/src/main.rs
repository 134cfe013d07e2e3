use std::path::Path;

use failure::{Error, ResultExt};
use structopt::StructOpt;
use dirfield::{
    algo::smoothest_vertex_direction_field,
    export::{self, output_path},
    io,
    viewer::{VertexVectorQuantity, Viewer, ViewerSession},
};

#[macro_use]
mod ui;

mod args;
mod viewer;

use crate::{
    args::Args,
    viewer::TerminalViewer,
};


/// We just catch potential errors here and pretty print them. The actual
/// useful code is in `run()`.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        print_error(&e);

        if std::env::var("RUST_BACKTRACE") == Ok("1".to_string()) {
            error!();
            error!("{}", e.backtrace());
        }

        std::process::exit(1);
    }
}

fn print_error(e: &Error) {
    error!("An error occured: {}", e);

    for cause in e.iter_causes() {
        error!("  ... caused by: {}", cause);
    }
}

fn run() -> Result<(), Error> {
    let args = Args::from_args();
    log::debug!("{:?}", args);

    let path = match &args.mesh {
        Some(path) => path,
        None => {
            Args::clap().print_help()?;
            println!();
            std::process::exit(1);
        }
    };

    let (mesh, geometry) = progress!(["Loading '{}'", path.display()] => {
        io::load(path).context(format!("failed to load mesh '{}'", path.display()))?
    });
    info!(
        "Mesh has {} vertices, {} faces and {} edges",
        ui::fmt_with_thousand_sep(mesh.num_vertices().into()),
        ui::fmt_with_thousand_sep(mesh.num_faces().into()),
        ui::fmt_with_thousand_sep(mesh.num_edges().into()),
    );
    if mesh.has_boundary() {
        info!("Mesh has boundary: boundary vertices are aligned with their boundary edge");
    }

    let mesh_name = mesh_name(path);
    let mut viewer = ViewerSession::new(TerminalViewer::default())?;
    viewer.register_surface_mesh(&mesh_name, geometry.positions(), &mesh.face_vertex_list())?;
    let basis_x = geometry.tangent_bases().iter().map(|(v, b)| (v, b.x)).collect();
    viewer.set_vertex_tangent_basis_x(&mesh_name, &basis_x)?;

    let field = progress!(["Computing smoothest direction field"] => {
        smoothest_vertex_direction_field(&mesh, &geometry)
            .context("failed to compute the direction field")?
    });
    let quantity = VertexVectorQuantity::from_intrinsic(&mesh, &geometry, &field);
    viewer.add_vertex_vector_quantity(&mesh_name, "vectors", &quantity, true)?;

    // Failing to write the output is reported, but not fatal.
    let out_path = output_path(path);
    match export::export(&quantity.export_records(), &out_path) {
        Ok(()) => info!("Wrote direction field to '{}'", out_path.display()),
        Err(e) => {
            let e = Error::from(e);
            warn!("Could not write the direction field: {}", e);
            for cause in e.iter_causes() {
                warn!("  ... caused by: {}", cause);
            }
        }
    }

    if !args.silent {
        viewer.show()?;
    }

    drop(viewer);
    println!("DONE.");

    Ok(())
}

/// The name the mesh is registered under in the viewer.
fn mesh_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".into())
}
