use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use cgmath::Point3;
use failure::Error;

use crate::io::parse;
use super::{read, read_header, Encoding, PropertyType, ScalarType};


const SQUARE_ASCII: &[u8] = b"\
ply
format ascii 1.0
comment made by hand
element vertex 4
property float x
property float y
property float z
property uchar red
element face 2
property list uchar int vertex_indices
end_header
0 0 0 255
1 0 0 0
1 1 0 0
0 1.5 -2 17
3 0 1 2
3 0 2 3
";

fn square_positions() -> Vec<Point3<f64>> {
    vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.5, -2.0),
    ]
}

/// A header for binary files with `double` positions, a `uint` list for the
/// faces and an additional element that is not used.
fn binary_header(format: &str) -> Vec<u8> {
    format!(
        "ply\n\
            format {} 1.0\n\
            element vertex 4\n\
            property double x\n\
            property double y\n\
            property double z\n\
            element face 1\n\
            property list uchar uint vertex_index\n\
            element edge 1\n\
            property int vertex1\n\
            property int vertex2\n\
            end_header\n",
        format,
    ).into_bytes()
}

/// Writes the body of the binary file described by `binary_header`.
fn write_binary_body<B: ByteOrder>(out: &mut Vec<u8>) {
    for p in square_positions() {
        out.write_f64::<B>(p.x).unwrap();
        out.write_f64::<B>(p.y).unwrap();
        out.write_f64::<B>(p.z).unwrap();
    }

    // One quad.
    out.write_u8(4).unwrap();
    for &i in &[0, 1, 2, 3] {
        out.write_u32::<B>(i).unwrap();
    }

    // The edge.
    out.write_i32::<B>(0).unwrap();
    out.write_i32::<B>(2).unwrap();
}


#[test]
fn header() -> Result<(), Error> {
    let header = read_header(SQUARE_ASCII)?;

    assert_eq!(header.encoding, Encoding::Ascii);
    assert_eq!(header.comments, vec!["made by hand".to_string()]);
    assert_eq!(header.elements.len(), 2);

    let vertex = &header.elements[0];
    assert_eq!(vertex.name, "vertex");
    assert_eq!(vertex.count, 4);
    assert_eq!(vertex.property_defs.len(), 4);
    assert_eq!(vertex.property_defs[3].name, "red");
    assert_eq!(vertex.property_defs[3].ty, PropertyType::Scalar(ScalarType::UChar));

    let face = &header.elements[1];
    assert_eq!(face.property_defs[0].ty, PropertyType::List {
        len_type: ScalarType::UChar,
        scalar_type: ScalarType::Int,
    });

    Ok(())
}

#[test]
fn read_ascii() -> Result<(), Error> {
    let mesh = read(SQUARE_ASCII)?;

    assert_eq!(mesh.positions, square_positions());
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn read_binary_little_endian() -> Result<(), Error> {
    let mut data = binary_header("binary_little_endian");
    write_binary_body::<LittleEndian>(&mut data);

    let mesh = read(&data)?;
    assert_eq!(mesh.positions, square_positions());
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn read_binary_big_endian() -> Result<(), Error> {
    let mut data = binary_header("binary_big_endian");
    write_binary_body::<BigEndian>(&mut data);

    let mesh = read(&data)?;
    assert_eq!(mesh.positions, square_positions());
    assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

    Ok(())
}

#[test]
fn truncated_binary() {
    let mut data = binary_header("binary_little_endian");
    write_binary_body::<LittleEndian>(&mut data);
    data.truncate(data.len() - 5);

    match read(&data) {
        Err(parse::Error::UnexpectedEof(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn missing_magic_number() {
    match read(b"format ascii 1.0\nend_header\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("not a valid PLY file")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn missing_format() {
    match read(b"ply\nelement vertex 0\nproperty float x\nend_header\n") {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("without format")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn signed_list_length_is_rejected() {
    let data = b"ply\nformat ascii 1.0\nelement face 0\n\
        property list int int vertex_indices\nend_header\n";
    match read(data) {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("unsigned")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn negative_vertex_index_is_rejected() {
    let data = b"ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\n\
        element face 1\nproperty list uchar int vertex_indices\nend_header\n3 0 -1 2\n";
    match read(data) {
        Err(parse::Error::Custom(msg, _)) => assert!(msg.contains("invalid vertex index")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn invalid_ascii_number() {
    let data = b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
        property float y\nproperty float z\nend_header\n0 zero 0\n";
    match read(data) {
        Err(parse::Error::Custom(msg, span)) => {
            assert!(msg.contains("invalid float"), "message: {}", msg);
            assert_eq!(&data[span.lo()..span.hi()], b"zero");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn element_without_properties_is_rejected() {
    let ascii = b"ply\nformat ascii 1.0\nelement foo 18446744073709551615\nend_header\n";
    let binary = b"ply\nformat binary_little_endian 1.0\nelement foo 3\nend_header\n";

    for data in &[&ascii[..], &binary[..]] {
        match read(data) {
            Err(parse::Error::Custom(msg, _)) => {
                assert!(msg.contains("has no properties"), "message: {}", msg);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn empty_element_without_properties_is_fine() -> Result<(), Error> {
    let data = b"ply\nformat ascii 1.0\nelement foo 0\nelement vertex 1\n\
        property float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n";
    let mesh = read(data)?;
    assert_eq!(mesh.positions, vec![Point3::new(1.0, 2.0, 3.0)]);

    Ok(())
}

#[test]
fn huge_element_count_is_eof_error() {
    let data = b"ply\nformat binary_little_endian 1.0\nelement vertex 4294967295\n\
        property float x\nproperty float y\nproperty float z\nend_header\n\0\0\0\0";
    match read(data) {
        Err(parse::Error::UnexpectedEof(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}
