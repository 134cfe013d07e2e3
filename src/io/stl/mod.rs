//! Reading STL files (ASCII and binary).
//!
//! An STL file is a plain list of triangles, each one storing the positions
//! of its three vertices. To get a connected mesh, vertices with exactly the
//! same position are unified (see [`ReadOptions::unify_vertices`]).

mod read;



pub use self::read::{read, read_raw, RawResult, ReadOptions, Triangle};


/// The two encodings of STL files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    Binary,
}

/// Size of the header of binary STL files.
pub const BINARY_HEADER_LEN: usize = 80;

/// Size of one triangle in binary STL files: four `f32` triples (normal and
/// three vertices) and a 16 bit attribute field.
pub const BINARY_TRIANGLE_LEN: usize = 4 * 3 * 4 + 2;

/// Guesses the encoding of an STL file from its full contents.
///
/// Determining this is harder than it sounds, as the 80 byte header of a
/// binary file may contain arbitrary ASCII data (including `solid`). We use:
/// - If the file size matches the triangle count stored at offset 80
///   exactly, the file is binary.
/// - Otherwise, if the file starts with `solid` and the first 1K bytes are
///   all ASCII, it is ASCII.
/// - Everything else is binary.
pub fn guess_encoding(data: &[u8]) -> Encoding {
    use byteorder::{ByteOrder, LittleEndian};

    if data.len() >= BINARY_HEADER_LEN + 4 {
        let count = LittleEndian::read_u32(&data[BINARY_HEADER_LEN..]) as u64;
        let expected = (BINARY_HEADER_LEN + 4) as u64 + count * BINARY_TRIANGLE_LEN as u64;
        if expected == data.len() as u64 {
            return Encoding::Binary;
        }
    }

    let start = &data[..data.len().min(1024)];
    if data.starts_with(b"solid") && start.is_ascii() {
        Encoding::Ascii
    } else {
        Encoding::Binary
    }
}
