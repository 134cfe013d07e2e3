#![no_main]

use libfuzzer_sys::fuzz_target;
use dirfield::{
    algo::{smoothest_vertex_direction_field_with, FieldOptions},
    geometry::Geometry,
    io::{read_from_memory, FileFormat},
};

// Everything after the file has been parsed: building the half edge mesh,
// the geometry and the field. The first byte selects the format.
fuzz_target!(|data: &[u8]| {
    let (format, data) = match data.split_first() {
        Some((0, rest)) => (FileFormat::Obj, rest),
        Some((1, rest)) => (FileFormat::Off, rest),
        Some((2, rest)) => (FileFormat::Ply, rest),
        Some((_, rest)) => (FileFormat::Stl, rest),
        None => return,
    };

    if let Ok((mesh, positions)) = read_from_memory(data, format) {
        // Huge meshes only slow the fuzzer down.
        if mesh.num_vertices() > 2_000 {
            return;
        }

        let geometry = Geometry::new(&mesh, positions);
        let options = FieldOptions { max_iterations: 5, ..FieldOptions::default() };
        let _ = smoothest_vertex_direction_field_with(&mesh, &geometry, options);
    }
});
