use cgmath::Point3;
use failure::Error;

use crate::io::parse;
use super::read;


#[test]
fn triangles_and_comments() -> Result<(), Error> {
    let data = b"\
        # a single triangle\n\
        o triangle\n\
        v 0 0 0\n\
        v 1.0 0.0 0.0   \n\
        v 0 1 0 1.0\n\
        \n\
        f 1 2 3 # trailing comment\n";
    let mesh = read(data)?;

    assert_eq!(mesh.positions, vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]);
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);

    Ok(())
}

#[test]
fn corner_formats() -> Result<(), Error> {
    let data = b"\
        v 0 0 0\n\
        v 1 0 0\n\
        v 1 1 0\n\
        v 0 1 0\n\
        vt 0 0\n\
        vn 0 0 1\n\
        f 1/1 2/1 3/1\n\
        f 1//1 3//1 4//1\n\
        f 2/1/1 3/1/1 4/1/1\n";
    let mesh = read(data)?;

    assert_eq!(mesh.positions.len(), 4);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3], [1, 2, 3]]);

    Ok(())
}

#[test]
fn negative_indices() -> Result<(), Error> {
    let data = b"v 0 0 0\nv 1 0 0\nv 1 1 0\nf -3 -2 -1\nv 0 1 0\nf -4 -2 -1\n";
    let mesh = read(data)?;

    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn polygons_are_fan_triangulated() -> Result<(), Error> {
    let data = b"v 0 0 0\r\nv 1 0 0\r\nv 2 1 0\r\nv 1 2 0\r\nv 0 1 0\r\nf 1 2 3 4 5\r\n";
    let mesh = read(data)?;

    assert_eq!(mesh.positions.len(), 5);
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);

    Ok(())
}

#[test]
fn no_trailing_linebreak() -> Result<(), Error> {
    let mesh = read(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3")?;
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);

    Ok(())
}

#[test]
fn zero_index_is_invalid() {
    match read(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("invalid vertex index 0")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn negative_index_out_of_range() {
    match read(b"v 0 0 0\nv 1 0 0\nf -1 -2 -3\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("invalid vertex index -3")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn face_with_two_vertices() {
    match read(b"v 0 0 0\nv 1 0 0\nf 1 2\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("only 2 vertices")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_coordinate() {
    let data = b"v 0 zero 0\n";
    match read(data) {
        Err(parse::Error::Custom(msg, span)) => {
            assert!(msg.contains("invalid float"), "message: {}", msg);
            assert_eq!(&data[span.lo()..span.hi()], b"zero");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn long_comments_and_statements() -> Result<(), Error> {
    let long = "x".repeat(5000);
    let data = format!(
        "#{long}\n# {long}\nmtllib {long}.mtl\n{long} 1 2\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        long = long,
    );
    let mesh = read(data.as_bytes())?;

    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);

    Ok(())
}
