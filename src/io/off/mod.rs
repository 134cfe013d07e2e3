//! Reading Object File Format (OFF) files.
//!
//! An OFF file starts with the keyword `OFF`, followed by the number of
//! vertices, faces and edges (the edge count is ignored). Then come one line
//! per vertex (`x y z`) and one line per face (`n i_0 ... i_{n-1}` with
//! zero-based indices). Additional values on a line, like colors, are
//! ignored. Faces with more than three vertices are fan-triangulated. `#`
//! starts a comment that runs to the end of the line.

use cgmath::Point3;
use log::{debug, warn};
use smallvec::SmallVec;

use crate::io::{
    RawMesh,
    parse::{
        self, Input, Span, SpannedData,
        debug_fmt_bytes, is_inline_whitespace, opt_whitespace, token,
    },
};


#[cfg(test)]
mod tests;


/// Reads an OFF file into a [`RawMesh`].
pub fn read(data: &[u8]) -> Result<RawMesh, parse::Error> {
    let mut buf = Input::new(data);

    // The counts may follow `OFF` on the same line.
    let mut tokens = line_tokens(&mut buf)?;
    if tokens[0].data != b"OFF" {
        let msg = format!(
            "not a valid OFF file: expected \"OFF\", found {}",
            debug_fmt_bytes(tokens[0].data),
        );
        return Err(tokens[0].error(msg));
    }
    tokens.remove(0);
    if tokens.is_empty() {
        tokens = line_tokens(&mut buf)?;
    }

    if tokens.len() < 2 {
        return Err(parse::Error::Custom(
            "expected vertex and face count".into(),
            line_span(&tokens),
        ));
    }
    let num_vertices = tokens[0].parse::<u64>("vertex count")?;
    let num_faces = tokens[1].parse::<u64>("face count")?;

    // Nothing is reserved up front: every vertex and face needs at least one
    // line, so a faulty count in the header ends with an EOF error.
    let mut mesh = RawMesh::default();
    for _ in 0..num_vertices {
        let tokens = line_tokens(&mut buf)?;
        if tokens.len() < 3 {
            return Err(parse::Error::Custom(
                format!("vertex with only {} coordinates", tokens.len()),
                line_span(&tokens),
            ));
        }

        mesh.positions.push(Point3::new(
            tokens[0].parse::<f64>("float")?,
            tokens[1].parse::<f64>("float")?,
            tokens[2].parse::<f64>("float")?,
        ));
    }

    let mut num_polygons = 0;
    for _ in 0..num_faces {
        let tokens = line_tokens(&mut buf)?;
        let len = tokens[0].parse::<usize>("face vertex count")?;
        if len < 3 {
            return Err(tokens[0].error(format!("face with only {} vertices", len)));
        }
        if tokens.len() - 1 < len {
            return Err(parse::Error::Custom(
                format!("face with {} vertices, but only {} indices", len, tokens.len() - 1),
                line_span(&tokens),
            ));
        }

        let indices = tokens[1..=len].iter()
            .map(|t| t.parse::<usize>("vertex index"))
            .collect::<Result<SmallVec<[usize; 4]>, _>>()?;
        if len > 3 {
            num_polygons += 1;
        }

        for i in 1..len - 1 {
            mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
        }
    }

    skip_blank(&mut buf);
    if !buf.is_eof() {
        warn!("ignoring {} bytes after the last OFF face", buf.len());
    }

    debug!(
        "read OFF with {} vertices and {} triangles ({} polygons triangulated)",
        mesh.positions.len(),
        mesh.faces.len(),
        num_polygons,
    );

    Ok(mesh)
}

fn skip_line(buf: &mut Input<'_>) {
    buf.skip_until(b'\n');
    if !buf.is_eof() {
        buf.consume(1);
    }
}

/// Skips whitespace, empty lines and comments.
fn skip_blank(buf: &mut Input<'_>) {
    loop {
        buf.skip_until(|b| !is_inline_whitespace(b) && b != b'\n');
        if buf.is_next(b"#") {
            skip_line(buf);
        } else {
            break;
        }
    }
}

/// Returns the tokens of the next line that is not empty and not a comment.
/// The result always contains at least one token.
fn line_tokens<'a>(buf: &mut Input<'a>) -> Result<SmallVec<[SpannedData<'a>; 8]>, parse::Error> {
    skip_blank(buf);
    if buf.is_eof() {
        return Err(parse::Error::UnexpectedEof(buf.offset()));
    }

    let mut tokens = SmallVec::new();
    loop {
        opt_whitespace(buf);
        if buf.is_eof() || buf[0] == b'\n' || buf[0] == b'#' {
            break;
        }
        tokens.push(token(buf)?);
    }
    skip_line(buf);

    Ok(tokens)
}

/// The span from the first to the last token.
fn line_span(tokens: &[SpannedData<'_>]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => Span::new(first.span.lo(), last.span.hi()),
        _ => Span::new(0, 0),
    }
}
