/// STL reading and writing for binary and ASCII formats
use std::io::Write;

use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{multispace0, multispace1},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::StlError;
use crate::geometry::MeshBuffers;
use nalgebra::{Point3, Vector3};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

/// Write `mesh` as binary STL
pub fn write_binary_stl<W: Write>(mesh: &MeshBuffers, writer: &mut W) -> Result<(), StlError> {
    let mut header = [0u8; HEADER_LEN];
    let label = b"dragon-core binary STL";
    header[..label.len()].copy_from_slice(label);
    writer.write_all(&header)?;
    writer.write_all(&(mesh.triangle_count() as u32).to_le_bytes())?;

    for triangle in mesh.triangles() {
        let normal = triangle.calculate_normal();
        write_floats(writer, normal.iter())?;
        for vertex in &triangle.vertices {
            write_floats(writer, vertex.position.iter())?;
        }
        // Attribute byte count
        writer.write_all(&[0, 0])?;
    }

    Ok(())
}

fn write_floats<'a, W: Write>(
    writer: &mut W,
    values: impl Iterator<Item = &'a f32>,
) -> Result<(), StlError> {
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Write `mesh` as ASCII STL under solid `name`
pub fn write_ascii_stl<W: Write>(
    mesh: &MeshBuffers,
    name: &str,
    writer: &mut W,
) -> Result<(), StlError> {
    writeln!(writer, "solid {name}")?;
    for triangle in mesh.triangles() {
        let n = triangle.calculate_normal();
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for vertex in &triangle.vertices {
            let p = vertex.position;
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}

/// Parse a binary STL file into unindexed buffers
pub fn parse_binary_stl(data: &[u8]) -> Result<MeshBuffers, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    let data = &data[HEADER_LEN..];
    let triangle_count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    // The header count is untrusted; the payload must hold every facet
    let available = (data.len() - 4) / FACET_LEN;
    if triangle_count > available {
        return Err(StlError::UnexpectedEof(available));
    }

    let mut mesh = MeshBuffers::with_capacity(triangle_count * 3, triangle_count * 3);
    let mut offset = 4;

    for facet in 0..triangle_count {
        if offset + FACET_LEN > data.len() {
            return Err(StlError::UnexpectedEof(facet));
        }

        let normal = read_vector(&data[offset..]);
        offset += 12;

        let first = mesh.vertex_count() as u32;
        for _ in 0..3 {
            mesh.push_vertex(Point3::from(read_vector(&data[offset..])), normal);
            offset += 12;
        }

        // Skip attribute byte count
        offset += 2;

        mesh.push_triangle(first, first + 1, first + 2);
    }

    tracing::debug!(triangles = triangle_count, "Parsed binary STL");
    Ok(mesh)
}

fn read_vector(bytes: &[u8]) -> Vector3<f32> {
    let component = |i: usize| {
        f32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]])
    };
    Vector3::new(component(0), component(4), component(8))
}

/// Parse an ASCII STL file into unindexed buffers
pub fn parse_ascii_stl(input: &str) -> Result<MeshBuffers, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, mesh)) => Ok(mesh),
        Err(e) => Err(StlError::Ascii(format!("{:?}", e))),
    }
}

type Facet = (Vector3<f32>, [Point3<f32>; 3]);

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, MeshBuffers> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // Optional name runs to the end of the line
    let (input, _) = take_till(|c| c == '\n')(input)?;
    let (input, facets) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut mesh = MeshBuffers::with_capacity(facets.len() * 3, facets.len() * 3);
    for (normal, corners) in facets {
        let first = mesh.vertex_count() as u32;
        for corner in corners {
            mesh.push_vertex(corner, normal);
        }
        mesh.push_triangle(first, first + 1, first + 2);
    }

    Ok((input, mesh))
}

fn parse_facet(input: &str) -> IResult<&str, Facet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, (normal, [v1, v2, v3])))
}

fn parse_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    let (input, v) = parse_vector3(input)?;
    Ok((input, Point3::from(v)))
}

fn parse_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

/// Detect and parse STL data (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<MeshBuffers, StlError> {
    // Binary files may also start with "solid", so fall back on failure
    if data.len() > 5 && &data[0..5] == b"solid" {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(mesh) = parse_ascii_stl(text) {
                return Ok(mesh);
            }
        }
    }

    parse_binary_stl(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShapeParameters;
    use crate::generator::generate;
    use crate::ring::build_ring_angles;

    #[test]
    fn test_parse_binary_header() {
        let mut data = vec![0u8; 84];
        data[80..84].copy_from_slice(&0u32.to_le_bytes());

        let mesh = parse_binary_stl(&data).unwrap();
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_truncated_binary_rejected() {
        let mut data = vec![0u8; 84 + 20];
        data[80..84].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            parse_binary_stl(&data),
            Err(StlError::UnexpectedEof(0))
        ));
        assert!(matches!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooSmall(10))));
    }

    #[test]
    fn test_oversized_triangle_count_rejected() {
        let mut data = vec![0u8; 84];
        data[80..84].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            parse_binary_stl(&data),
            Err(StlError::UnexpectedEof(0))
        ));

        // One complete facet followed by a count claiming more
        let mut data = vec![0u8; 84 + 50];
        data[80..84].copy_from_slice(&3u32.to_le_bytes());
        assert!(matches!(
            parse_stl(&data),
            Err(StlError::UnexpectedEof(1))
        ));
    }

    #[test]
    fn test_parse_ascii_facet() {
        let text = "solid tri\n\
            facet normal 0 0 1\n\
              outer loop\n\
                vertex 0 0 0\n\
                vertex 1 0 0\n\
                vertex 0 1 0\n\
              endloop\n\
            endfacet\n\
            endsolid tri\n";
        let mesh = parse_stl(text.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.positions[1], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.normals[2], Vector3::z());
    }

    #[test]
    fn test_export_dragon_binary() {
        let params = ShapeParameters::default();
        let ring = build_ring_angles(params.points, params.spine_width);
        let dragon = generate(&params, &ring, 0.0).unwrap();

        let mut bytes = Vec::new();
        write_binary_stl(&dragon.buffers, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 84 + dragon.buffers.triangle_count() * 50);

        let parsed = parse_stl(&bytes).unwrap();
        assert_eq!(parsed.triangle_count(), dragon.buffers.triangle_count());
        assert_eq!(parsed.positions[0], dragon.buffers.triangle(0).vertices[0].position);
    }

    #[test]
    fn test_export_dragon_ascii() {
        let params = ShapeParameters {
            dragon_meters: 0.3,
            points: 4,
            ..Default::default()
        };
        let ring = build_ring_angles(params.points, params.spine_width);
        let dragon = generate(&params, &ring, 0.0).unwrap();

        let mut bytes = Vec::new();
        write_ascii_stl(&dragon.buffers, "dragon", &mut bytes).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("solid dragon\n"));
        assert!(text.trim_end().ends_with("endsolid dragon"));

        let parsed = parse_ascii_stl(&text).unwrap();
        assert_eq!(parsed.triangle_count(), dragon.buffers.triangle_count());
    }
}
