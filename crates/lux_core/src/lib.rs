//! Renderer-agnostic data for the lux path tracer.
//!
//! This crate provides:
//!
//! - **Textures**: the [`Texture`] sampler trait with solid, checker,
//!   barycentric, Perlin marble, cube-map and image implementations plus a
//!   [`TextureCache`]
//! - **Meshes**: OBJ loading through `tobj` and ear-clipping triangulation
//!   into an indexed [`Mesh`]
//!
//! # Example
//!
//! ```ignore
//! use lux_core::{Mesh, Winding};
//!
//! let mesh = Mesh::from_obj_file("bunny.obj", Winding::CounterClockwise)?;
//! println!("{} triangles", mesh.triangle_count());
//! ```

pub mod mesh;
pub mod obj;
pub mod perlin;
pub mod texture;
pub mod triangulate;

/// Linear RGB radiance or reflectance.
pub type Color = lux_math::Vec3;

// Re-export commonly used types
pub use mesh::{Mesh, MeshError, MeshResult, MeshTriangle, VertexLayout};
pub use texture::{
    BarycentricTexture, CheckerTexture, CubeMap, ImageTexture, NoiseStyle, NoiseTexture,
    SolidColor, Texture, TextureCache, TextureError, TextureResult,
};
pub use triangulate::Winding;
