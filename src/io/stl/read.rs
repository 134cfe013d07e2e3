use boolinator::Boolinator;
use cgmath::Point3;
use fxhash::FxHashMap;
use log::debug;

use crate::io::{
    RawMesh,
    parse::{self, Input, linebreak, opt_whitespace, token, whitespace},
};
use super::{guess_encoding, Encoding, BINARY_HEADER_LEN, BINARY_TRIANGLE_LEN};


/// Used to configure [`read`].
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Specifies if vertices with the exact same position should be unified
    /// into one. *Default*: `true`.
    ///
    /// Without unification, every triangle gets its own three vertices and
    /// the mesh falls apart into unconnected triangles. Only disable this if
    /// vertices at the same position must stay separate.
    pub unify_vertices: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            unify_vertices: true,
        }
    }
}

/// One raw triangle in an STL file.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Face normal as stored in the file. Usually ignored.
    pub normal: [f32; 3],

    /// The 3D positions of the vertices in CCW order (that is, when looking
    /// at the face "from the outside").
    pub vertices: [[f32; 3]; 3],

    /// Only stored in binary files and usually zero. `0` for ASCII files.
    pub attribute_byte_count: u16,
}

/// Holds the raw data from a STL file. See [`read_raw`].
#[derive(Debug, Default)]
pub struct RawResult {
    /// The solid name if it's specified in the file.
    pub solid_name: Option<String>,

    /// The encoding the file was detected to have.
    pub encoding: Option<Encoding>,

    /// All triangles from the file.
    pub triangles: Vec<Triangle>,
}

/// Receives the data of an STL file while parsing.
trait Sink {
    fn solid_name(&mut self, name: String);
    /// Called with the number of triangles that are expected, already
    /// limited to what the remaining data can hold.
    fn num_triangles(&mut self, num: usize);
    fn triangle(&mut self, triangle: Triangle);
}

impl Sink for RawResult {
    fn solid_name(&mut self, name: String) {
        self.solid_name = Some(name);
    }

    fn num_triangles(&mut self, num: usize) {
        self.triangles.reserve(num);
    }

    fn triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }
}

/// Builds a [`RawMesh`] from the triangles, optionally unifying vertices.
struct MeshSink {
    mesh: RawMesh,

    /// Maps the bit patterns of a position to its vertex index. `None` if
    /// vertices are not unified.
    unifier: Option<FxHashMap<[u32; 3], usize>>,
}

impl MeshSink {
    fn add_vertex(&mut self, pos: [f32; 3]) -> usize {
        let positions = &mut self.mesh.positions;
        let mut push = || {
            positions.push(Point3::new(pos[0].into(), pos[1].into(), pos[2].into()));
            positions.len() - 1
        };

        match &mut self.unifier {
            None => push(),
            Some(map) => {
                // `+ 0.0` turns `-0.0` into `0.0`, so that both are unified.
                let key = [
                    (pos[0] + 0.0).to_bits(),
                    (pos[1] + 0.0).to_bits(),
                    (pos[2] + 0.0).to_bits(),
                ];
                *map.entry(key).or_insert_with(push)
            }
        }
    }
}

impl Sink for MeshSink {
    fn solid_name(&mut self, _: String) {}

    fn num_triangles(&mut self, num: usize) {
        // Without unification, the number of vertices is exactly 3 * |F|.
        // Otherwise, a well behaved closed mesh has |V| ≈ |F| / 2.
        let num_vertices = match self.unifier {
            None => 3 * num,
            Some(_) => (num as f64 * 0.55) as usize,
        };

        self.mesh.positions.reserve(num_vertices);
        self.mesh.faces.reserve(num);
        if let Some(map) = &mut self.unifier {
            map.reserve(num_vertices);
        }
    }

    fn triangle(&mut self, triangle: Triangle) {
        let [pa, pb, pc] = triangle.vertices;
        let a = self.add_vertex(pa);
        let b = self.add_vertex(pb);
        let c = self.add_vertex(pc);
        self.mesh.faces.push([a, b, c]);
    }
}

/// Reads an STL file (ASCII or binary) into a [`RawMesh`].
pub fn read(data: &[u8], options: ReadOptions) -> Result<RawMesh, parse::Error> {
    let mut sink = MeshSink {
        mesh: RawMesh::default(),
        unifier: options.unify_vertices.as_some_from(FxHashMap::default),
    };
    read_into(data, &mut sink)?;

    debug!(
        "read STL with {} triangles and {} vertices (unified: {})",
        sink.mesh.faces.len(),
        sink.mesh.positions.len(),
        options.unify_vertices,
    );
    Ok(sink.mesh)
}

/// Reads the triangles of an STL file without building a mesh.
pub fn read_raw(data: &[u8]) -> Result<RawResult, parse::Error> {
    let mut out = RawResult::default();
    out.encoding = Some(read_into(data, &mut out)?);
    Ok(out)
}

fn read_into(data: &[u8], sink: &mut impl Sink) -> Result<Encoding, parse::Error> {
    let encoding = guess_encoding(data);
    let mut buf = Input::new(data);

    match encoding {
        Encoding::Ascii => read_ascii(&mut buf, sink)?,
        Encoding::Binary => read_binary(&mut buf, sink)?,
    }

    Ok(encoding)
}

fn read_ascii(buf: &mut Input<'_>, sink: &mut impl Sink) -> Result<(), parse::Error> {
    /// Eats optional whitespace, calls the passed parser and requires a
    /// linebreak at the end.
    fn line<'a, F, O>(buf: &mut Input<'a>, func: F) -> Result<O, parse::Error>
    where
        F: FnOnce(&mut Input<'a>) -> Result<O, parse::Error>,
    {
        opt_whitespace(buf);
        let out = func(buf)?;
        linebreak(buf)?;
        Ok(out)
    }

    fn float(buf: &mut Input<'_>) -> Result<f32, parse::Error> {
        token(buf)?.parse::<f32>("float")
    }

    /// Three floats separated by whitespace.
    fn vec3(buf: &mut Input<'_>) -> Result<[f32; 3], parse::Error> {
        let x = float(buf)?;
        whitespace(buf)?;
        let y = float(buf)?;
        whitespace(buf)?;
        let z = float(buf)?;
        Ok([x, y, z])
    }

    /// One line with a vertex (e.g. `vertex 2.0 0.1  1`).
    fn vertex(buf: &mut Input<'_>) -> Result<[f32; 3], parse::Error> {
        line(buf, |buf| {
            buf.expect_tag(b"vertex")?;
            whitespace(buf)?;
            vec3(buf)
        })
    }

    // `solid <name>`, where the name is optional.
    let name = line(buf, |buf| {
        buf.expect_tag(b"solid")?;
        opt_whitespace(buf);
        buf.take_until(1024, b'\n', |sd| sd.assert_ascii().map(|name| name.trim().to_string()))
    })?;
    sink.solid_name(name);

    loop {
        opt_whitespace(buf);

        // Everything after `endsolid` is ignored. Some exporters forget
        // `endsolid`, so EOF ends the file as well.
        if buf.is_eof() || buf.is_next(b"endsolid") {
            break;
        }

        let normal = line(buf, |buf| {
            buf.expect_tag(b"facet")?;
            whitespace(buf)?;
            buf.expect_tag(b"normal")?;
            whitespace(buf)?;
            vec3(buf)
        })?;

        line(buf, |buf| {
            buf.expect_tag(b"outer")?;
            whitespace(buf)?;
            buf.expect_tag(b"loop")
        })?;
        let vertices = [vertex(buf)?, vertex(buf)?, vertex(buf)?];
        line(buf, |buf| buf.expect_tag(b"endloop"))?;

        // `endfacet` may end the file without a linebreak.
        opt_whitespace(buf);
        buf.expect_tag(b"endfacet")?;
        if !buf.is_eof() {
            linebreak(buf)?;
        }

        sink.triangle(Triangle {
            normal,
            vertices,
            attribute_byte_count: 0,
        });
    }

    Ok(())
}

fn read_binary(buf: &mut Input<'_>, sink: &mut impl Sink) -> Result<(), parse::Error> {
    // The header has no significance. Some writers put `solid <name>` in
    // there, so we pass that on.
    let header = buf.with_bytes(BINARY_HEADER_LEN, |sd| Ok(sd.data))?;
    if header.starts_with(b"solid") && header.is_ascii() {
        let name = String::from_utf8_lossy(&header[5..]);
        sink.solid_name(name.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string());
    }

    let num_triangles = parse::u32_le(buf)?;

    // The count comes straight from the file, so we never reserve more than
    // the remaining bytes can hold. A wrong count leads to an error either
    // way: too high results in EOF, too low in additional data.
    let fitting = buf.len() / BINARY_TRIANGLE_LEN;
    sink.num_triangles(std::cmp::min(num_triangles as usize, fitting));

    for _ in 0..num_triangles {
        let triangle = buf.with_bytes(BINARY_TRIANGLE_LEN, |sd| {
            use byteorder::{ByteOrder, LittleEndian};

            fn vec3(data: &[u8]) -> [f32; 3] {
                [
                    LittleEndian::read_f32(&data[0..]),
                    LittleEndian::read_f32(&data[4..]),
                    LittleEndian::read_f32(&data[8..]),
                ]
            }

            Ok(Triangle {
                normal: vec3(&sd.data[0..]),
                vertices: [
                    vec3(&sd.data[12..]),
                    vec3(&sd.data[24..]),
                    vec3(&sd.data[36..]),
                ],
                attribute_byte_count: LittleEndian::read_u16(&sd.data[48..]),
            })
        })?;

        sink.triangle(triangle);
    }

    buf.assert_eof()
}
