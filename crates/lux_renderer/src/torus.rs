//! Torus primitive, intersected by solving a quartic in `f64`.
//!
//! The torus lies in the local XY plane around the z axis: `major` is the
//! distance from the center to the middle of the tube, `minor` the tube
//! radius.

use std::f64::consts::PI;
use std::sync::Arc;

use lux_math::roots::solve_quartic;
use lux_math::{Aabb, DVec3, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

pub struct Torus {
    center: Vec3,
    major: f32,
    minor: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Torus {
    pub fn new(center: Vec3, major: f32, minor: f32, material: Arc<dyn Material>) -> Self {
        let major = major.max(0.0);
        let minor = minor.max(0.0);
        let extent = Vec3::new(major + minor, major + minor, minor);
        Self {
            center,
            major,
            minor,
            material,
            bbox: Aabb::from_points(center - extent, center + extent),
        }
    }

    /// Smallest ray parameter in `ray_t` where the ray meets the surface.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<f32> {
        let scale = ray.direction.length() as f64;
        if scale == 0.0 {
            return None;
        }

        // Unit direction keeps the quartic well conditioned; roots are then
        // distances and are rescaled to the caller's parameterization.
        let o = (ray.origin - self.center).as_dvec3();
        let d = ray.direction.as_dvec3() / scale;

        let major_sq = (self.major as f64).powi(2);
        let minor_sq = (self.minor as f64).powi(2);
        let alpha = major_sq + minor_sq;

        let o_sq = o.length_squared();
        let o_dot_d = o.dot(d);
        let k = o_sq - alpha;

        let coefficients = [
            k * k - 4.0 * major_sq * (minor_sq - o.z * o.z),
            4.0 * k * o_dot_d + 8.0 * major_sq * o.z * d.z,
            2.0 * k + 4.0 * o_dot_d * o_dot_d + 4.0 * major_sq * d.z * d.z,
            4.0 * o_dot_d,
            1.0,
        ];

        solve_quartic(coefficients)
            .iter()
            .map(|distance| (distance / scale) as f32)
            .filter(|&t| ray_t.contains(t))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Outward normal at a local point: away from the nearest point on the
    /// tube's center circle.
    fn outward_normal(&self, local: DVec3) -> DVec3 {
        let ring = DVec3::new(local.x, local.y, 0.0).normalize_or_zero() * self.major as f64;
        ((local - ring) / self.minor as f64).normalize_or_zero()
    }

    /// `u` around the z axis, `v` around the tube.
    fn torus_uv(&self, local: DVec3) -> (f32, f32) {
        let phi = local.y.atan2(local.x) + PI;
        let radial = (local.x * local.x + local.y * local.y).sqrt() - self.major as f64;
        let theta = local.z.atan2(radial) + PI;
        ((phi / (2.0 * PI)) as f32, (theta / (2.0 * PI)) as f32)
    }
}

impl Hittable for Torus {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let t = self.intersect(ray, ray_t)?;
        let local = (ray.at(t) - self.center).as_dvec3();
        let normal = self.outward_normal(local).as_vec3();
        Some(HitRecord::new(
            ray,
            t,
            normal,
            self.torus_uv(local),
            self.material.as_ref(),
        ))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
