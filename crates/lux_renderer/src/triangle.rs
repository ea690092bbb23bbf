//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.
//! Texture coordinates and shading normals are interpolated from
//! per-vertex attributes with the hit's barycentric weights.

use std::sync::Arc;

use lux_math::{Aabb, Interval, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::gen_f32;
use crate::Material;

/// UVs used when none are given; they make the hit's barycentric
/// weights visible to a barycentric texture.
pub const DEFAULT_UVS: [Vec2; 3] = [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(0.0, 0.0)];

/// Determinants smaller than this count as a ray parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// A triangle primitive.
pub struct Triangle {
    vertices: [Vec3; 3],
    uvs: [Vec2; 3],
    normals: [Vec3; 3],
    /// Unit geometric normal, from the vertex order
    face_normal: Vec3,
    area: f32,
    double_sided: bool,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

/// Barycentric intersection result.
struct TriangleHit {
    t: f32,
    u: f32,
    v: f32,
}

impl Triangle {
    /// Create a flat, double-sided triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, material: Arc<dyn Material>) -> Self {
        let cross = (v1 - v0).cross(v2 - v0);
        let face_normal = cross.normalize_or_zero();

        Self {
            vertices: [v0, v1, v2],
            uvs: DEFAULT_UVS,
            normals: [face_normal; 3],
            face_normal,
            area: 0.5 * cross.length(),
            double_sided: true,
            material,
            bbox: Aabb::enclosing([v0, v1, v2]),
        }
    }

    /// Per-vertex texture coordinates.
    pub fn with_uvs(mut self, uvs: [Vec2; 3]) -> Self {
        self.uvs = uvs;
        self
    }

    /// Per-vertex normals for smooth shading.
    pub fn with_normals(mut self, normals: [Vec3; 3]) -> Self {
        self.normals = normals;
        self
    }

    /// One shading normal for the whole face.
    pub fn with_face_normal(mut self, normal: Vec3) -> Self {
        self.normals = [normal; 3];
        self
    }

    /// Single-sided triangles ignore rays arriving from behind the face.
    pub fn double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        self.vertices
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    /// Möller-Trumbore. With `cull`, hits on the back of the face are
    /// rejected.
    fn intersect(&self, ray: &Ray, ray_t: Interval, cull: bool) -> Option<TriangleHit> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let h = ray.direction.cross(edge2);
        let det = edge1.dot(h);

        // Ray is parallel to triangle, or the triangle is degenerate
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }
        // Negative determinant: the ray travels along the face normal.
        if cull && det < 0.0 {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin - v0;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * ray.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        if !ray_t.contains(t) {
            return None;
        }

        Some(TriangleHit { t, u, v })
    }

    #[inline]
    fn interpolate<T>(attr: &[T; 3], u: f32, v: f32) -> T
    where
        T: Copy + std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        attr[0] * (1.0 - u - v) + attr[1] * u + attr[2] * v
    }
}

impl Hittable for Triangle {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let TriangleHit { t, u, v } = self.intersect(ray, ray_t, !self.double_sided)?;

        let uv = Self::interpolate(&self.uvs, u, v);
        let normal = Self::interpolate(&self.normals, u, v).normalize_or_zero();
        Some(HitRecord::new(
            ray,
            t,
            normal,
            (uv.x, uv.y),
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Area-light density converted to solid angle at `origin`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction, 0.0);
        let Some(hit) = self.intersect(&ray, Interval::new(0.001, f32::INFINITY), false) else {
            return 0.0;
        };

        let length = direction.length();
        let distance_squared = hit.t * hit.t * length * length;
        let cosine = (direction.dot(self.face_normal) / length).abs();
        if cosine <= 0.0 || self.area <= 0.0 {
            return 0.0;
        }
        distance_squared / (cosine * self.area)
    }

    /// Direction toward a uniformly chosen point on the triangle.
    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let r1 = gen_f32(rng).sqrt();
        let r2 = gen_f32(rng);
        let [v0, v1, v2] = self.vertices;
        let point = v0 * (1.0 - r1) + v1 * (r1 * (1.0 - r2)) + v2 * (r1 * r2);
        point - origin
    }
}
