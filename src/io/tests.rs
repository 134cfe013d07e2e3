use crate::ds::InvalidMeshError;
use super::{read_from_memory, FileFormat, LoadError};


#[test]
fn format_from_extension() {
    assert_eq!(FileFormat::from_extension("bunny.obj"), Some(FileFormat::Obj));
    assert_eq!(FileFormat::from_extension("/a/b/bunny.PLY"), Some(FileFormat::Ply));
    assert_eq!(FileFormat::from_extension("x.Stl"), Some(FileFormat::Stl));
    assert_eq!(FileFormat::from_extension("x.off"), Some(FileFormat::Off));
    assert_eq!(FileFormat::from_extension("x.xyz"), None);
    assert_eq!(FileFormat::from_extension("README"), None);
}

#[test]
fn format_from_file_start() {
    assert_eq!(FileFormat::from_file_start(b"ply\nformat ascii 1.0\n"), Some(FileFormat::Ply));
    assert_eq!(FileFormat::from_file_start(b"solid cube\n"), Some(FileFormat::Stl));
    assert_eq!(FileFormat::from_file_start(b"# Blender\nmtllib x.mtl\n"), Some(FileFormat::Obj));
    assert_eq!(FileFormat::from_file_start(b"\n\nv 0 0 0\n"), Some(FileFormat::Obj));
    assert_eq!(FileFormat::from_file_start(b"OFF\n3 1 0\n"), Some(FileFormat::Off));
    assert_eq!(FileFormat::from_file_start(b"OFF 3 1 0\n"), Some(FileFormat::Off));
    assert_eq!(FileFormat::from_file_start(b"# comment\n\nOFF\n"), Some(FileFormat::Off));
    assert_eq!(FileFormat::from_file_start(b"OFFSET 3\n"), None);
    assert_eq!(FileFormat::from_file_start(b"COFF\n3 1 0\n"), None);
    assert_eq!(FileFormat::from_file_start(b""), None);

    // An empty binary STL file: 80 byte header and a triangle count of 0.
    assert_eq!(FileFormat::from_file_start(&[0; 84]), Some(FileFormat::Stl));
}

#[test]
fn format_display() {
    assert_eq!(FileFormat::Obj.to_string(), "OBJ");
    assert_eq!(FileFormat::Off.to_string(), "OFF");
    assert_eq!(FileFormat::Ply.to_string(), "PLY");
    assert_eq!(FileFormat::Stl.to_string(), "STL");
}

#[test]
fn same_mesh_from_all_formats() {
    let obj = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
    let ply = b"ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\n\
        property float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n\
        0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
    let off = b"OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
    let stl = b"solid t\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\n\
        vertex 0 1 0\nendloop\nendfacet\nendsolid t\n";

    let inputs: [(&[u8], FileFormat); 4] = [
        (obj, FileFormat::Obj),
        (off, FileFormat::Off),
        (ply, FileFormat::Ply),
        (stl, FileFormat::Stl),
    ];
    for &(data, format) in &inputs {
        let (mesh, positions) = read_from_memory(data, format).unwrap();
        assert_eq!(mesh.num_vertices(), 3, "{}", format);
        assert_eq!(mesh.num_faces(), 1, "{}", format);
        assert_eq!(mesh.face_vertex_list(), vec![[0, 1, 2]], "{}", format);
        assert_eq!(positions.num_elements(), 3, "{}", format);
    }
}

#[test]
fn parse_errors_name_the_format() {
    match read_from_memory(b"v 0 zero 0\n", FileFormat::Obj) {
        Err(e @ LoadError::Parse(FileFormat::Obj, _)) => {
            assert_eq!(e.to_string(), "invalid OBJ file");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn non_manifold_input_is_rejected() {
    let obj = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 -1 0\nf 1 2 3\nf 1 2 4\n";
    match read_from_memory(obj, FileFormat::Obj) {
        Err(LoadError::InvalidMesh(InvalidMeshError::NonManifoldEdge { .. })) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn index_out_of_range_is_rejected() {
    let obj = b"v 0 0 0\nv 1 0 0\nf 1 2 3\n";
    match read_from_memory(obj, FileFormat::Obj) {
        Err(LoadError::InvalidMesh(InvalidMeshError::VertexOutOfRange { vertex: 2, .. })) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn missing_file() {
    match super::read("/this/file/does/not/exist.obj") {
        Err(LoadError::Io(path, _)) => assert_eq!(path, "/this/file/does/not/exist.obj"),
        other => panic!("unexpected result: {:?}", other),
    }
}
