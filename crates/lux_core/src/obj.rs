//! Wavefront OBJ loading.
//!
//! `tobj` parses the text with its own triangulation turned off, so each
//! face keeps its arity and its separate position/UV/normal index streams.
//! Faces are then cut into triangles by [`crate::triangulate`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lux_math::{Vec2, Vec3};

use crate::mesh::{Mesh, MeshError, MeshResult, MeshTriangle, VertexLayout};
use crate::triangulate::{reference_normal, triangulate, Winding};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file and triangulate every face with the given winding.
pub fn load_obj(path: impl AsRef<Path>, winding: Winding) -> MeshResult<Mesh> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mesh = load_obj_buf(&mut reader, winding)?;

    log::info!(
        "Loaded {}: {} positions, {} triangles",
        path.display(),
        mesh.positions.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Load OBJ text from any buffered reader. Material libraries are ignored.
pub fn load_obj_buf<R: BufRead>(reader: &mut R, winding: Winding) -> MeshResult<Mesh> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    let mut positions: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut triangles: Vec<MeshTriangle> = Vec::new();
    let mut layouts: HashMap<VertexLayout, usize> = HashMap::new();
    let mut face_count = 0usize;

    for model in &models {
        let m = &model.mesh;

        // tobj indexes each model's attributes locally.
        let position_base = positions.len() as u32;
        let uv_base = uvs.len() as u32;
        let normal_base = normals.len() as u32;

        positions.extend(m.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
        uvs.extend(m.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
        normals.extend(m.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));

        let has_uvs = !m.texcoord_indices.is_empty() && m.texcoord_indices.len() == m.indices.len();
        let has_normals = !m.normal_indices.is_empty() && m.normal_indices.len() == m.indices.len();
        let layout = VertexLayout::new(has_uvs, has_normals);

        // An empty arity list means every face is a triangle.
        let arities: Vec<usize> = if m.face_arities.is_empty() {
            vec![3; m.indices.len() / 3]
        } else {
            m.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0usize;
        for arity in arities {
            let range = start..start + arity;
            start += arity;

            let corners = lookup(&positions, position_base, &m.indices[range.clone()], "position")?;
            let declared = if has_normals {
                lookup(&normals, normal_base, &m.normal_indices[range.clone()], "normal")?
            } else {
                Vec::new()
            };

            let normal = reference_normal(&corners, &declared, winding);
            for tri in triangulate(&corners, normal, winding) {
                let corner = |stream: &[u32], base: u32| tri.map(|c| base + stream[range.start + c]);
                triangles.push(MeshTriangle {
                    positions: corner(&m.indices[..], position_base),
                    uvs: has_uvs.then(|| corner(&m.texcoord_indices[..], uv_base)),
                    normals: has_normals.then(|| corner(&m.normal_indices[..], normal_base)),
                });
            }

            face_count += 1;
            *layouts.entry(layout).or_default() += 1;
        }
    }

    if triangles.is_empty() {
        return Err(MeshError::Empty);
    }

    log::debug!(
        "Triangulated {} faces from {} models into {} triangles ({:?})",
        face_count,
        models.len(),
        triangles.len(),
        layouts
    );

    Mesh::new(positions, uvs, normals, triangles)
}

/// Resolve one face's local indices into an attribute array.
fn lookup<T: Copy>(
    values: &[T],
    base: u32,
    indices: &[u32],
    attribute: &'static str,
) -> MeshResult<Vec<T>> {
    indices
        .iter()
        .map(|&i| {
            values
                .get((base + i) as usize)
                .copied()
                .ok_or(MeshError::IndexOutOfRange {
                    attribute,
                    index: base + i,
                    len: values.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(text: &str, winding: Winding) -> MeshResult<Mesh> {
        load_obj_buf(&mut Cursor::new(text.as_bytes()), winding)
    }

    #[test]
    fn test_quad_position_only() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let mesh = load(text, Winding::CounterClockwise).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.triangles.iter().all(|t| t.layout() == VertexLayout::Position));
    }

    #[test]
    fn test_pentagon_with_uvs_and_normals() {
        let text = "\
v 0 0 0
v 2 0 0
v 1 0.5 0
v 2 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 0.5 0.25
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1 5/5/1
";
        let mesh = load(text, Winding::CounterClockwise).unwrap();
        assert_eq!(mesh.triangle_count(), 3);

        let area: f32 = mesh
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = mesh.triangle_positions(t);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-5);

        for tri in &mesh.triangles {
            assert_eq!(tri.layout(), VertexLayout::PositionUvNormal);
            // UV corners follow position corners.
            let positions = mesh.triangle_positions(tri);
            let uvs = mesh.triangle_uvs(tri).unwrap();
            for (p, uv) in positions.iter().zip(uvs) {
                assert!((p.truncate() * 0.5 - uv).length() < 1e-6);
            }
        }
    }

    #[test]
    fn test_position_normal_layout() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";
        let mesh = load(text, Winding::CounterClockwise).unwrap();
        assert_eq!(mesh.triangles[0].layout(), VertexLayout::PositionNormal);
        assert_eq!(mesh.triangle_normals(&mesh.triangles[0]).unwrap()[0], Vec3::Z);
    }

    #[test]
    fn test_unknown_lines_ignored() {
        let text = "\
# a comment
o thing
s off
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = load(text, Winding::Clockwise).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_no_faces_is_empty_error() {
        let err = load("v 0 0 0\nv 1 0 0\n", Winding::CounterClockwise).unwrap_err();
        assert!(matches!(err, MeshError::Empty));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_obj("/no/such/mesh.obj", Winding::CounterClockwise).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
