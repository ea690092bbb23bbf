//! Axis-aligned rectangles and boxes built from them.

use std::sync::Arc;

use lux_math::{Aabb, Axis, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::sampling::gen_range;
use crate::Material;

/// A rectangle lying in a plane perpendicular to one coordinate axis.
///
/// The rectangle spans `[a0, a1] x [b0, b1]` in the two remaining axes
/// (in x, y, z order) at `normal_axis = k`. Its outward normal is the
/// positive normal axis.
pub struct AxisRect {
    normal_axis: usize,
    a_axis: usize,
    b_axis: usize,
    a: Interval,
    b: Interval,
    k: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl AxisRect {
    /// Rectangle perpendicular to `normal_axis`.
    pub fn new(
        normal_axis: Axis,
        (a0, a1): (f32, f32),
        (b0, b1): (f32, f32),
        k: f32,
        material: Arc<dyn Material>,
    ) -> Self {
        let (a_axis, b_axis) = match normal_axis {
            Axis::X => (1, 2),
            Axis::Y => (0, 2),
            Axis::Z => (0, 1),
        };
        let normal_axis = normal_axis.index();
        let a = Interval::new(a0.min(a1), a0.max(a1));
        let b = Interval::new(b0.min(b1), b0.max(b1));

        let mut lo = Vec3::ZERO;
        let mut hi = Vec3::ZERO;
        lo[a_axis] = a.min;
        hi[a_axis] = a.max;
        lo[b_axis] = b.min;
        hi[b_axis] = b.max;
        lo[normal_axis] = k;
        hi[normal_axis] = k;

        Self {
            normal_axis,
            a_axis,
            b_axis,
            a,
            b,
            k,
            material,
            // Zero depth along the normal gets padded by Aabb
            bbox: Aabb::from_points(lo, hi),
        }
    }

    /// Rectangle in the plane `z = k`.
    pub fn xy(x0: f32, x1: f32, y0: f32, y1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::Z, (x0, x1), (y0, y1), k, material)
    }

    /// Rectangle in the plane `y = k`.
    pub fn xz(x0: f32, x1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::Y, (x0, x1), (z0, z1), k, material)
    }

    /// Rectangle in the plane `x = k`.
    pub fn yz(y0: f32, y1: f32, z0: f32, z1: f32, k: f32, material: Arc<dyn Material>) -> Self {
        Self::new(Axis::X, (y0, y1), (z0, z1), k, material)
    }

    pub fn area(&self) -> f32 {
        self.a.size() * self.b.size()
    }

    fn normal(&self) -> Vec3 {
        let mut n = Vec3::ZERO;
        n[self.normal_axis] = 1.0;
        n
    }

    /// Plane crossing inside the rectangle: `(t, u, v)`.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let denom = ray.direction[self.normal_axis];
        if denom == 0.0 {
            return None;
        }
        let t = (self.k - ray.origin[self.normal_axis]) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);
        let (a, b) = (p[self.a_axis], p[self.b_axis]);
        if !self.a.contains(a) || !self.b.contains(b) {
            return None;
        }

        let u = (a - self.a.min) / self.a.size();
        let v = (b - self.b.min) / self.b.size();
        Some((t, u, v))
    }
}

impl Hittable for AxisRect {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let (t, u, v) = self.intersect(ray, ray_t)?;
        let mut rec = HitRecord::new(ray, t, self.normal(), (u, v), self.material.as_ref());
        // Snap to the plane; ray.at(t) drifts off it by rounding.
        rec.p[self.normal_axis] = self.k;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let ray = Ray::new(origin, direction, 0.0);
        let Some((t, _, _)) = self.intersect(&ray, Interval::new(0.001, f32::INFINITY)) else {
            return 0.0;
        };

        let length_squared = direction.length_squared();
        let distance_squared = t * t * length_squared;
        let cosine = direction[self.normal_axis].abs() / length_squared.sqrt();
        let area = self.area();
        if cosine <= 0.0 || area <= 0.0 {
            return 0.0;
        }
        distance_squared / (cosine * area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let mut point = Vec3::ZERO;
        point[self.a_axis] = gen_range(rng, self.a.min, self.a.max);
        point[self.b_axis] = gen_range(rng, self.b.min, self.b.max);
        point[self.normal_axis] = self.k;
        point - origin
    }
}

/// Closed box made of six rectangles.
pub struct Cuboid {
    sides: HittableList,
}

impl Cuboid {
    /// Box spanning the corners `p0` and `p1`, given in any order.
    pub fn new(p0: Vec3, p1: Vec3, material: Arc<dyn Material>) -> Self {
        let min = p0.min(p1);
        let max = p0.max(p1);

        let mut sides = HittableList::new();
        sides.add(Arc::new(AxisRect::xy(min.x, max.x, min.y, max.y, max.z, material.clone())));
        sides.add(Arc::new(AxisRect::xy(min.x, max.x, min.y, max.y, min.z, material.clone())));
        sides.add(Arc::new(AxisRect::xz(min.x, max.x, min.z, max.z, max.y, material.clone())));
        sides.add(Arc::new(AxisRect::xz(min.x, max.x, min.z, max.z, min.y, material.clone())));
        sides.add(Arc::new(AxisRect::yz(min.y, max.y, min.z, max.z, max.x, material.clone())));
        sides.add(Arc::new(AxisRect::yz(min.y, max.y, min.z, max.z, min.x, material)));

        Self { sides }
    }
}

impl Hittable for Cuboid {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.sides.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.sides.bounding_box()
    }
}
