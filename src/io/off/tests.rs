use cgmath::Point3;
use failure::Error;

use crate::io::parse;
use super::read;


const SQUARE: &[u8] = b"\
OFF
# a unit square made of two triangles
4 2 0

0 0 0
1 0 0
1 1 0
0 1 0   # trailing comment
3 0 1 2
3 0 2 3
";

fn square_positions() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ]
}

#[test]
fn read_square() -> Result<(), Error> {
    let mesh = read(SQUARE)?;
    assert_eq!(mesh.positions, square_positions());
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn counts_on_header_line_and_polygons() -> Result<(), Error> {
    // Face colors after the indices are ignored, the quad is triangulated.
    let data = b"OFF 4 1 4\r\n0 0 0\r\n1 0 0\r\n1 1 0\r\n0 1 0\r\n4 0 1 2 3 255 0 0\r\n";
    let mesh = read(data)?;
    assert_eq!(mesh.positions, square_positions());
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn no_trailing_newline() -> Result<(), Error> {
    let mesh = read(b"OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2")?;
    assert_eq!(mesh.faces, vec![[0, 1, 2]]);

    Ok(())
}

#[test]
fn missing_magic_number() {
    match read(b"3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n") {
        Err(parse::Error::Custom(msg, span)) => {
            assert!(msg.contains("not a valid OFF file"), "message: {}", msg);
            assert_eq!(span, parse::Span::new(0, 1));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn too_many_faces_in_header() {
    match read(b"OFF\n3 18446744073709551615 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n") {
        Err(parse::Error::UnexpectedEof(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn face_with_missing_indices() {
    match read(b"OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n4 0 1 2\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("only 3 indices"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn face_with_two_vertices() {
    match read(b"OFF\n2 1 0\n0 0 0\n1 0 0\n2 0 1\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("only 2 vertices"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_coordinate() {
    let data = b"OFF\n1 0 0\n0 zero 0\n";
    match read(data) {
        Err(parse::Error::Custom(msg, span)) => {
            assert!(msg.contains("invalid float"), "message: {}", msg);
            assert_eq!(&data[span.lo()..span.hi()], b"zero");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
