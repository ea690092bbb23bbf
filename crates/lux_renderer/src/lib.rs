//! lux renderer - CPU Path Tracing
//!
//! A Monte Carlo path tracer with multiple importance sampling: each
//! diffuse bounce draws its direction from an equal mixture of the
//! material's lobe and the scene's lights.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lux_renderer::{AxisRect, Camera, Color, Cuboid, DiffuseLight, FlipFace, Lambertian, RenderConfig, Scene, Vec3};
//!
//! let mut camera = Camera::new()
//!     .with_resolution(600, 600)
//!     .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
//!     .with_lens(40.0, 0.0, 10.0);
//! camera.initialize();
//!
//! let white = Arc::new(Lambertian::from_color(Color::splat(0.73)));
//! let white_box = Arc::new(Cuboid::new(Vec3::ZERO, Vec3::splat(165.0), white));
//! let light = Arc::new(AxisRect::xz(213.0, 343.0, 227.0, 332.0, 554.0,
//!     Arc::new(DiffuseLight::from_color(Color::splat(15.0)))));
//!
//! let mut builder = Scene::builder();
//! builder.add(white_box).add(Arc::new(FlipFace::new(light.clone()))).add_light(light);
//! let scene = builder.build();
//!
//! let image = lux_renderer::render_parallel(&camera, &scene, &RenderConfig::default());
//! ```

mod bucket;
mod bvh;
mod camera;
mod checkerboard;
mod constant_medium;
mod hittable;
mod image_sink;
mod material;
mod mesh;
pub mod pdf;
mod rect;
mod renderer;
pub mod sampling;
mod scene;
mod sphere;
mod torus;
mod transform;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, render_parallel, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use checkerboard::Checkerboard;
pub use constant_medium::ConstantMedium;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use image_sink::{color_to_rgb8, linear_to_gamma, ImageSink, PpmSink, SinkResult};
pub use material::{
    reflect, refract, Dielectric, DiffuseLight, Glossy, Isotropic, Lambertian, Material, Metal,
    ScatterKind, ScatterRecord,
};
pub use mesh::TriangleMesh;
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf, SpherePdf, SurfacePdf};
pub use rect::{AxisRect, Cuboid};
pub use renderer::{
    ray_color, render, render_pixel, ConfigError, ImageBuffer, RenderConfig,
};
pub use scene::{Scene, SceneBuilder};
pub use sphere::{MovingSphere, Sphere};
pub use torus::Torus;
pub use transform::{FlipFace, Transform};
pub use triangle::Triangle;

/// Re-export colors and textures from lux_core, math types from lux_math
pub use lux_core::{Color, CubeMap, NoiseStyle, NoiseTexture, Texture, Winding};
pub use lux_math::{Aabb, Axis, Interval, Ray, Vec3};
