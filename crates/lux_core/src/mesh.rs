//! Indexed triangle mesh data.
//!
//! Attribute arrays are kept separate, the way OBJ files index them: each
//! triangle corner carries its own position index and, when the face
//! declared them, UV and normal indices.

use std::path::Path;

use lux_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

use crate::triangulate::Winding;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OBJ parse error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("Mesh has no faces")]
    Empty,

    #[error("{attribute} index {index} out of range (have {len})")]
    IndexOutOfRange {
        attribute: &'static str,
        index: u32,
        len: usize,
    },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// Which per-corner attributes a face declared.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    Position,
    PositionUv,
    PositionUvNormal,
    PositionNormal,
}

impl VertexLayout {
    pub fn new(has_uvs: bool, has_normals: bool) -> Self {
        match (has_uvs, has_normals) {
            (false, false) => VertexLayout::Position,
            (true, false) => VertexLayout::PositionUv,
            (true, true) => VertexLayout::PositionUvNormal,
            (false, true) => VertexLayout::PositionNormal,
        }
    }
}

/// One triangle as indices into the mesh attribute arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeshTriangle {
    pub positions: [u32; 3],
    pub uvs: Option<[u32; 3]>,
    pub normals: Option<[u32; 3]>,
}

impl MeshTriangle {
    pub fn layout(&self) -> VertexLayout {
        VertexLayout::new(self.uvs.is_some(), self.normals.is_some())
    }
}

/// A triangle mesh with separately indexed positions, UVs and normals.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<MeshTriangle>,
    pub bounds: Aabb,
}

impl Mesh {
    /// Build a mesh, checking every triangle index against its array.
    pub fn new(
        positions: Vec<Vec3>,
        uvs: Vec<Vec2>,
        normals: Vec<Vec3>,
        triangles: Vec<MeshTriangle>,
    ) -> MeshResult<Self> {
        for tri in &triangles {
            check_indices("position", &tri.positions, positions.len())?;
            if let Some(uv) = &tri.uvs {
                check_indices("uv", uv, uvs.len())?;
            }
            if let Some(n) = &tri.normals {
                check_indices("normal", n, normals.len())?;
            }
        }

        let bounds = Aabb::enclosing(positions.iter().copied());
        Ok(Self {
            positions,
            uvs,
            normals,
            triangles,
            bounds,
        })
    }

    /// A mesh with no geometry.
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            bounds: Aabb::EMPTY,
        }
    }

    /// Load and triangulate a Wavefront OBJ file.
    pub fn from_obj_file(path: impl AsRef<Path>, winding: Winding) -> MeshResult<Self> {
        crate::obj::load_obj(path, winding)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn triangle_positions(&self, tri: &MeshTriangle) -> [Vec3; 3] {
        tri.positions.map(|i| self.positions[i as usize])
    }

    pub fn triangle_uvs(&self, tri: &MeshTriangle) -> Option<[Vec2; 3]> {
        tri.uvs.map(|idx| idx.map(|i| self.uvs[i as usize]))
    }

    pub fn triangle_normals(&self, tri: &MeshTriangle) -> Option<[Vec3; 3]> {
        tri.normals.map(|idx| idx.map(|i| self.normals[i as usize]))
    }
}

fn check_indices(attribute: &'static str, indices: &[u32; 3], len: usize) -> MeshResult<()> {
    match indices.iter().find(|&&i| i as usize >= len) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            attribute,
            index,
            len,
        }),
        None => Ok(()),
    }
}
