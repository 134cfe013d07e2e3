//! Reading Wavefront OBJ files.
//!
//! Only vertex positions (`v`) and faces (`f`) are used. Face corners may
//! reference texture coordinates and normals (`i/t`, `i//n`, `i/t/n`), which
//! are ignored. Negative indices count from the end of the vertex list read
//! so far. Polygons with more than three vertices are fan-triangulated. All
//! other statements (`vt`, `vn`, `o`, `g`, `usemtl`, ...) are skipped.

use cgmath::Point3;
use log::debug;
use smallvec::SmallVec;

use crate::io::{
    RawMesh,
    parse::{self, Input, Span, SpannedData, is_inline_whitespace, opt_whitespace, token},
};


#[cfg(test)]
mod tests;


/// Reads an OBJ file into a [`RawMesh`].
pub fn read(data: &[u8]) -> Result<RawMesh, parse::Error> {
    let mut mesh = RawMesh::default();
    let mut num_polygons = 0;
    let mut num_skipped = 0;

    let mut buf = Input::new(data);
    while !buf.is_eof() {
        opt_whitespace(&mut buf);

        // Comments and empty lines are skipped without tokenizing them, so
        // their length doesn't matter.
        if buf.is_eof() || buf[0] == b'#' || buf[0] == b'\n' {
            skip_line(&mut buf);
            continue;
        }

        // Keywords of unknown statements may be arbitrarily long as well.
        let rest = buf.len();
        let keyword = buf.take_until(rest, |b| is_inline_whitespace(b) || b == b'\n', Ok)?;

        match keyword.data {
            b"v" => {
                let mut coords = [0.0; 3];
                for c in &mut coords {
                    opt_whitespace(&mut buf);
                    *c = token(&mut buf)?.parse::<f64>("float")?;
                }

                // An optional fourth coordinate `w` is ignored; so are vertex
                // colors some exporters append.
                mesh.positions.push(Point3::new(coords[0], coords[1], coords[2]));
            }
            b"f" => {
                let mut corners = SmallVec::<[usize; 4]>::new();
                loop {
                    opt_whitespace(&mut buf);
                    if buf.is_eof() || buf[0] == b'\n' || buf[0] == b'#' {
                        break;
                    }

                    let corner = token(&mut buf)?;
                    corners.push(corner_index(&corner, mesh.positions.len())?);
                }

                if corners.len() < 3 {
                    let msg = format!("face with only {} vertices", corners.len());
                    return Err(keyword.error(msg));
                }
                if corners.len() > 3 {
                    num_polygons += 1;
                }

                for i in 1..corners.len() - 1 {
                    mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }

            _ => num_skipped += 1,
        }

        skip_line(&mut buf);
    }

    debug!(
        "read OBJ with {} vertices and {} triangles ({} polygons triangulated, {} other \
            statements skipped)",
        mesh.positions.len(),
        mesh.faces.len(),
        num_polygons,
        num_skipped,
    );

    Ok(mesh)
}

fn skip_line(buf: &mut Input<'_>) {
    buf.skip_until(b'\n');
    if !buf.is_eof() {
        buf.consume(1);
    }
}

/// Parses one face corner (`i`, `i/t`, `i//n` or `i/t/n`) and returns the
/// zero-based vertex index. `num_vertices` is the number of vertices defined
/// before this face, used to resolve negative indices.
fn corner_index(corner: &SpannedData<'_>, num_vertices: usize) -> Result<usize, parse::Error> {
    let len = corner.data.iter().position(|&b| b == b'/').unwrap_or(corner.data.len());
    let index = SpannedData {
        data: &corner.data[..len],
        span: Span::new(corner.span.lo(), corner.span.lo() + len),
    };

    let i = index.parse::<i64>("vertex index")?;
    let resolved = match i {
        i if i > 0 => Some(i as usize - 1),
        i if i < 0 => num_vertices.checked_sub(i.unsigned_abs() as usize),
        _ => None,
    };

    resolved.ok_or_else(|| {
        index.error(format!(
            "invalid vertex index {} ({} vertices defined so far)",
            i,
            num_vertices,
        ))
    })
}
