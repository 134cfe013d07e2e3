use std::cmp::min;

use cgmath::Point3;
use log::{debug, warn};
use smallvec::SmallVec;

use crate::io::{
    RawMesh,
    parse::{self, Input, Span, debug_fmt_bytes, linebreak, opt_whitespace, token, whitespace},
};
use super::{
    ElementDef, Encoding, Header, Property, PropertyDef, PropertyType, Scalar, ScalarType,
};



// ===========================================================================
// ===== Header
// ===========================================================================

/// Calls the passed parser and requires a linebreak at the end.
fn line<'a, F, O>(buf: &mut Input<'a>, func: F) -> Result<O, parse::Error>
where
    F: FnOnce(&mut Input<'a>) -> Result<O, parse::Error>,
{
    let out = func(buf)?;
    linebreak(buf)?;
    Ok(out)
}

fn parse_scalar_type(buf: &mut Input<'_>) -> Result<ScalarType, parse::Error> {
    let word = token(buf)?;
    word.assert_ascii()?
        .parse::<ScalarType>()
        .map_err(|e| word.error(e.to_string()))
}

fn parse_ident(buf: &mut Input<'_>) -> Result<String, parse::Error> {
    token(buf)?.assert_ascii().map(|s| s.to_string())
}

/// Parses the header of a PLY file. Afterwards, `buf` points to the first
/// byte of the body.
fn parse_header(buf: &mut Input<'_>) -> Result<Header, parse::Error> {
    /// Adds the comment in the current line (which starts with `comment` or
    /// `obj_info`) to the list of comments and consumes the whole line.
    fn add_comment(buf: &mut Input<'_>, comments: &mut Vec<String>) -> Result<(), parse::Error> {
        line(buf, |buf| {
            token(buf)?;
            opt_whitespace(buf);
            buf.take_until(4096, b'\n', |line| {
                comments.push(line.assert_ascii()?.trim_end().to_string());
                Ok(())
            })
        })
    }

    // PLY files always start with `ply`. This serves as magic number.
    line(buf, |buf| buf.expect_tag(b"ply")).map_err(|_| {
        parse::Error::Custom(
            "not a valid PLY file (does not start with \"ply\")".into(),
            Span::new(0, 3),
        )
    })?;

    let mut comments = Vec::new();
    let mut encoding = None;
    let mut elements: Vec<ElementDef> = Vec::new();

    // Line by line until we reach the end of the header
    loop {
        opt_whitespace(buf);
        let line_start = buf.offset();

        match () {
            () if buf.is_next(b"end_header") => break,

            () if buf.is_next(b"comment") || buf.is_next(b"obj_info") => {
                add_comment(buf, &mut comments)?;
            }

            // Format line, e.g. `format ascii 1.0`.
            () if buf.is_next(b"format") => {
                let parsed = line(buf, |buf| {
                    buf.expect_tag(b"format")?;
                    whitespace(buf)?;

                    let word = token(buf)?;
                    let encoding = match word.data {
                        b"ascii" => Encoding::Ascii,
                        b"binary_little_endian" => Encoding::BinaryLittleEndian,
                        b"binary_big_endian" => Encoding::BinaryBigEndian,
                        other => {
                            let len = min(other.len(), 50); // limit size of error string
                            let msg = format!(
                                "expected \"ascii\", \"binary_little_endian\" or \
                                    \"binary_big_endian\", found {}",
                                debug_fmt_bytes(&other[..len]),
                            );
                            return Err(word.error(msg));
                        }
                    };

                    whitespace(buf)?;
                    buf.expect_tag(b"1.0")?;
                    Ok(encoding)
                })?;

                if encoding.is_some() {
                    return Err(parse::Error::Custom(
                        "duplicate format line".into(),
                        Span::new(line_start, buf.offset()),
                    ));
                }
                encoding = Some(parsed);
            }

            // Element definition, e.g. `element vertex 8`
            () if buf.is_next(b"element") => {
                let def = line(buf, |buf| {
                    buf.expect_tag(b"element")?;
                    whitespace(buf)?;
                    let name = parse_ident(buf)?;
                    whitespace(buf)?;
                    let count = token(buf)?.parse::<u64>("element count")?;

                    Ok(ElementDef { name, count, property_defs: vec![] })
                })?;
                elements.push(def);
            }

            // Property definition, e.g. `property float x` or
            // `property list uchar int vertex_index`
            () if buf.is_next(b"property") => {
                let elem = elements.last_mut().ok_or_else(|| {
                    buf.spanned_data(b"property".len())
                        .error("property definition without preceding element definition")
                })?;

                let def = line(buf, |buf| {
                    buf.expect_tag(b"property")?;
                    whitespace(buf)?;

                    if buf.is_next(b"list") {
                        buf.expect_tag(b"list")?;
                        whitespace(buf)?;

                        let len_type = parse_scalar_type(buf)?;
                        whitespace(buf)?;
                        let scalar_type = parse_scalar_type(buf)?;
                        whitespace(buf)?;
                        let name = parse_ident(buf)?;

                        // Floating point or signed lengths don't make sense.
                        if !len_type.is_unsigned_integer() {
                            return Err(parse::Error::Custom(
                                format!(
                                    "only unsigned integers can be used to store list \
                                        lengths (property '{}')",
                                    name,
                                ),
                                Span::new(line_start, buf.offset()),
                            ));
                        }

                        Ok(PropertyDef { name, ty: PropertyType::List { len_type, scalar_type } })
                    } else {
                        let ty = PropertyType::Scalar(parse_scalar_type(buf)?);
                        whitespace(buf)?;
                        let name = parse_ident(buf)?;

                        Ok(PropertyDef { name, ty })
                    }
                })?;
                elem.property_defs.push(def);
            }

            // Something else...
            () => {
                let len = min(buf.len(), 10);
                let start = buf.spanned_data(len);
                let msg = format!(
                    "expected line starting with \"comment\", \"format\", \"element\", \
                        \"property\" or \"end_header\", found {}",
                    debug_fmt_bytes(start.data),
                );

                return Err(start.error(msg));
            }
        }
    }

    // `end_header` is followed by exactly one linebreak: in binary files,
    // the body may start with bytes that look like whitespace.
    buf.expect_tag(b"end_header")?;
    buf.skip_until(|b| b != b' ' && b != b'\t');
    if buf.is_next(b"\r\n") {
        buf.expect_tag(b"\r\n")?;
    } else {
        buf.expect_tag(b"\n")?;
    }

    let encoding = encoding.ok_or_else(|| {
        parse::Error::Custom("PLY header without format line".into(), Span::new(0, buf.offset()))
    })?;

    Ok(Header { encoding, comments, elements })
}

/// Parses only the header of a PLY file.
pub fn read_header(data: &[u8]) -> Result<Header, parse::Error> {
    parse_header(&mut Input::new(data))
}


// ===========================================================================
// ===== Body
// ===========================================================================

/// Helper trait to abstract the three different encodings.
trait EncodingReader {
    fn read_i8(buf: &mut Input<'_>) -> Result<i8, parse::Error>;
    fn read_u8(buf: &mut Input<'_>) -> Result<u8, parse::Error>;
    fn read_i16(buf: &mut Input<'_>) -> Result<i16, parse::Error>;
    fn read_u16(buf: &mut Input<'_>) -> Result<u16, parse::Error>;
    fn read_i32(buf: &mut Input<'_>) -> Result<i32, parse::Error>;
    fn read_u32(buf: &mut Input<'_>) -> Result<u32, parse::Error>;
    fn read_f32(buf: &mut Input<'_>) -> Result<f32, parse::Error>;
    fn read_f64(buf: &mut Input<'_>) -> Result<f64, parse::Error>;

    /// Skips a separator between two values. Only relevant for ASCII
    /// (whitespace), therefore this empty implementation is provided.
    fn skip_separator(_buf: &mut Input<'_>) -> Result<(), parse::Error> {
        Ok(())
    }

    /// Finish reading one element. Only relevant for ASCII (where a
    /// linebreak needs to be skipped), therefore this empty implementation
    /// is provided.
    fn finish_element(_buf: &mut Input<'_>) -> Result<(), parse::Error> {
        Ok(())
    }
}

/// Binary big endian encoding.
enum BbeEncoding {}
impl EncodingReader for BbeEncoding {
    fn read_i8(buf: &mut Input<'_>) -> Result<i8, parse::Error> { parse::i8_we(buf) }
    fn read_u8(buf: &mut Input<'_>) -> Result<u8, parse::Error> { parse::u8_we(buf) }
    fn read_i16(buf: &mut Input<'_>) -> Result<i16, parse::Error> { parse::i16_be(buf) }
    fn read_u16(buf: &mut Input<'_>) -> Result<u16, parse::Error> { parse::u16_be(buf) }
    fn read_i32(buf: &mut Input<'_>) -> Result<i32, parse::Error> { parse::i32_be(buf) }
    fn read_u32(buf: &mut Input<'_>) -> Result<u32, parse::Error> { parse::u32_be(buf) }
    fn read_f32(buf: &mut Input<'_>) -> Result<f32, parse::Error> { parse::f32_be(buf) }
    fn read_f64(buf: &mut Input<'_>) -> Result<f64, parse::Error> { parse::f64_be(buf) }
}

/// Binary little endian encoding.
enum BleEncoding {}
impl EncodingReader for BleEncoding {
    fn read_i8(buf: &mut Input<'_>) -> Result<i8, parse::Error> { parse::i8_we(buf) }
    fn read_u8(buf: &mut Input<'_>) -> Result<u8, parse::Error> { parse::u8_we(buf) }
    fn read_i16(buf: &mut Input<'_>) -> Result<i16, parse::Error> { parse::i16_le(buf) }
    fn read_u16(buf: &mut Input<'_>) -> Result<u16, parse::Error> { parse::u16_le(buf) }
    fn read_i32(buf: &mut Input<'_>) -> Result<i32, parse::Error> { parse::i32_le(buf) }
    fn read_u32(buf: &mut Input<'_>) -> Result<u32, parse::Error> { parse::u32_le(buf) }
    fn read_f32(buf: &mut Input<'_>) -> Result<f32, parse::Error> { parse::f32_le(buf) }
    fn read_f64(buf: &mut Input<'_>) -> Result<f64, parse::Error> { parse::f64_le(buf) }
}

/// ASCII encoding.
enum AsciiEncoding {}
impl EncodingReader for AsciiEncoding {
    fn read_i8(buf: &mut Input<'_>) -> Result<i8, parse::Error> {
        token(buf)?.parse("char")
    }
    fn read_u8(buf: &mut Input<'_>) -> Result<u8, parse::Error> {
        token(buf)?.parse("uchar")
    }
    fn read_i16(buf: &mut Input<'_>) -> Result<i16, parse::Error> {
        token(buf)?.parse("short")
    }
    fn read_u16(buf: &mut Input<'_>) -> Result<u16, parse::Error> {
        token(buf)?.parse("ushort")
    }
    fn read_i32(buf: &mut Input<'_>) -> Result<i32, parse::Error> {
        token(buf)?.parse("int")
    }
    fn read_u32(buf: &mut Input<'_>) -> Result<u32, parse::Error> {
        token(buf)?.parse("uint")
    }
    fn read_f32(buf: &mut Input<'_>) -> Result<f32, parse::Error> {
        token(buf)?.parse("float")
    }
    fn read_f64(buf: &mut Input<'_>) -> Result<f64, parse::Error> {
        token(buf)?.parse("double")
    }

    fn skip_separator(buf: &mut Input<'_>) -> Result<(), parse::Error> {
        whitespace(buf)
    }
    fn finish_element(buf: &mut Input<'_>) -> Result<(), parse::Error> {
        // The last line of the file doesn't need a linebreak.
        opt_whitespace(buf);
        if buf.is_eof() {
            Ok(())
        } else {
            linebreak(buf)
        }
    }
}

/// Reads a single value of type `ty`.
fn read_scalar<E: EncodingReader>(buf: &mut Input<'_>, ty: ScalarType) -> Result<Scalar, parse::Error> {
    let s = match ty {
        ScalarType::Char => Scalar::Char(E::read_i8(buf)?),
        ScalarType::UChar => Scalar::UChar(E::read_u8(buf)?),
        ScalarType::Short => Scalar::Short(E::read_i16(buf)?),
        ScalarType::UShort => Scalar::UShort(E::read_u16(buf)?),
        ScalarType::Int => Scalar::Int(E::read_i32(buf)?),
        ScalarType::UInt => Scalar::UInt(E::read_u32(buf)?),
        ScalarType::Float => Scalar::Float(E::read_f32(buf)?),
        ScalarType::Double => Scalar::Double(E::read_f64(buf)?),
    };

    Ok(s)
}

/// Parses one element with all its properties as described by `def`.
/// Properties are written into `out`.
fn parse_element<E: EncodingReader>(
    buf: &mut Input<'_>,
    def: &ElementDef,
    out: &mut Vec<Property>,
) -> Result<(), parse::Error> {
    for (i, prop_def) in def.property_defs.iter().enumerate() {
        let property = match prop_def.ty {
            PropertyType::Scalar(ty) => Property::Scalar(read_scalar::<E>(buf, ty)?),
            PropertyType::List { len_type, scalar_type } => {
                let start = buf.offset();

                // The header parser made sure that `len_type` is unsigned.
                let len = read_scalar::<E>(buf, len_type)?.as_integer().unwrap_or(0);

                // Every value needs at least one byte. This rejects lengths
                // which can't possibly fit into the file early.
                if len as usize > buf.len() {
                    return Err(parse::Error::Custom(
                        format!("list length {} exceeds the remaining file size", len),
                        Span::new(start, buf.offset()),
                    ));
                }

                let mut list = SmallVec::new();
                for _ in 0..len {
                    E::skip_separator(buf)?;
                    list.push(read_scalar::<E>(buf, scalar_type)?);
                }

                Property::List(list)
            }
        };
        out.push(property);

        // If this was the last property, finish the element, otherwise skip a
        // separator.
        if i == def.property_defs.len() - 1 {
            E::finish_element(buf)?;
        } else {
            E::skip_separator(buf)?;
        }
    }

    Ok(())
}

/// Collects vertices and faces from the elements of a PLY file.
struct MeshBuilder {
    mesh: RawMesh,
    num_polygons: usize,
}

impl MeshBuilder {
    fn vertex(&mut self, def: &ElementDef, props: &[Property], span: Span) -> Result<(), parse::Error> {
        let coord = |name: &str| -> Result<f64, parse::Error> {
            let pos = def.property_defs.iter().position(|p| p.name == name);
            match pos.map(|i| &props[i]) {
                Some(Property::Scalar(s)) => Ok(s.to_f64()),
                _ => Err(parse::Error::Custom(
                    format!("vertex without scalar property '{}'", name),
                    span,
                )),
            }
        };

        self.mesh.positions.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
        Ok(())
    }

    fn face(&mut self, index_prop: usize, props: &[Property], span: Span) -> Result<(), parse::Error> {
        let list = match &props[index_prop] {
            Property::List(list) => list,
            Property::Scalar(_) => unreachable!("checked when looking up the property"),
        };

        let indices = list.iter()
            .map(|s| {
                s.as_integer()
                    .filter(|&i| i >= 0)
                    .map(|i| i as usize)
                    .ok_or_else(|| {
                        parse::Error::Custom(format!("invalid vertex index {:?}", s), span)
                    })
            })
            .collect::<Result<SmallVec<[usize; 4]>, _>>()?;

        if indices.len() < 3 {
            return Err(parse::Error::Custom(
                format!("face with only {} vertices", indices.len()),
                span,
            ));
        }
        if indices.len() > 3 {
            self.num_polygons += 1;
        }

        // Fan triangulation for polygons.
        for i in 1..indices.len() - 1 {
            self.mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
        }

        Ok(())
    }
}

/// Finds the vertex index list of the `face` element.
fn face_index_property(def: &ElementDef) -> Result<usize, parse::Error> {
    let pos = def.property_defs.iter().position(|p| {
        (p.name == "vertex_indices" || p.name == "vertex_index")
            && match p.ty {
                PropertyType::List { scalar_type, .. } => !scalar_type.is_floating_point(),
                PropertyType::Scalar(_) => false,
            }
    });

    pos.ok_or_else(|| parse::Error::Custom(
        "'face' element without integer list property 'vertex_indices' or 'vertex_index'".into(),
        Span::new(0, 0),
    ))
}

/// Reads a PLY file into a [`RawMesh`].
pub fn read(data: &[u8]) -> Result<RawMesh, parse::Error> {
    let mut buf = Input::new(data);
    let header = parse_header(&mut buf)?;

    debug!(
        "PLY header: {:?} with elements {:?}",
        header.encoding,
        header.elements.iter().map(|e| (&e.name, e.count)).collect::<Vec<_>>(),
    );

    let mut builder = MeshBuilder {
        mesh: RawMesh::default(),
        num_polygons: 0,
    };

    // Keep this vector on the outside to retain allocations
    let mut properties = Vec::new();

    for def in &header.elements {
        let face_index = match def.name.as_str() {
            "face" => Some(face_index_property(def)?),
            _ => None,
        };

        // An element without properties takes up no bytes, so its count
        // can't be checked against the file.
        if def.property_defs.is_empty() && def.count > 0 {
            return Err(parse::Error::Custom(
                format!("element '{}' with {} entries has no properties", def.name, def.count),
                Span::new(buf.offset(), buf.offset()),
            ));
        }

        // Every other element consumes at least one byte, so a faulty count
        // ends in an EOF error instead of excessive work.
        for _ in 0..def.count {
            properties.clear();
            let start = buf.offset();

            match header.encoding {
                Encoding::Ascii => {
                    parse_element::<AsciiEncoding>(&mut buf, def, &mut properties)?;
                }
                Encoding::BinaryBigEndian => {
                    parse_element::<BbeEncoding>(&mut buf, def, &mut properties)?;
                }
                Encoding::BinaryLittleEndian => {
                    parse_element::<BleEncoding>(&mut buf, def, &mut properties)?;
                }
            }

            let span = Span::new(start, buf.offset());
            match (def.name.as_str(), face_index) {
                ("vertex", _) => builder.vertex(def, &properties, span)?,
                (_, Some(idx)) => builder.face(idx, &properties, span)?,
                _ => {}
            }
        }
    }

    if header.encoding == Encoding::Ascii {
        opt_whitespace(&mut buf);
        buf.skip_until(|b| !parse::is_inline_whitespace(b) && b != b'\n');
    }
    if !buf.is_eof() {
        warn!("ignoring {} bytes after the last PLY element", buf.len());
    }

    if builder.num_polygons > 0 {
        debug!("triangulated {} polygons with more than three vertices", builder.num_polygons);
    }

    Ok(builder.mesh)
}
