//! Sphere primitive for ray tracing.

use std::f32::consts::PI;
use std::sync::Arc;

use lux_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::{cone_cos_theta_max, random_to_sphere, random_unit_vector};
use crate::Material;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn contains(&self, p: Vec3) -> bool {
        (p - self.center).length_squared() <= self.radius * self.radius
    }
}

/// UV coordinates for a point on the unit sphere centered at origin.
///
/// `u` runs around the Y axis starting from -X, `v` from -Y to +Y.
fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;
    (phi / (2.0 * PI), theta / PI)
}

/// Nearest root of the ray-sphere quadratic inside `ray_t`.
fn intersect(center: Vec3, radius: f32, ray: &Ray, ray_t: Interval) -> Option<f32> {
    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrtd = discriminant.sqrt();

    // Prefer the near root, fall back to the far one
    [(h - sqrtd) / a, (h + sqrtd) / a]
        .into_iter()
        .find(|&root| ray_t.contains(root))
}

fn hit_sphere<'a>(
    center: Vec3,
    radius: f32,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let t = intersect(center, radius, ray, ray_t)?;
    let outward_normal = (ray.at(t) - center) / radius;
    Some(HitRecord::new(
        ray,
        t,
        outward_normal,
        sphere_uv(outward_normal),
        material,
    ))
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, self.material.as_ref(), ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// One over the solid angle of the cone the sphere subtends. From
    /// inside the sphere every direction reaches it, so the density is
    /// uniform over all directions.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        if self.contains(origin) {
            return 1.0 / (4.0 * PI);
        }

        let ray = Ray::new(origin, direction, 0.0);
        if intersect(self.center, self.radius, &ray, Interval::new(0.001, f32::INFINITY)).is_none() {
            return 0.0;
        }

        let distance_squared = (self.center - origin).length_squared();
        let cos_theta_max = cone_cos_theta_max(self.radius, distance_squared);
        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max);
        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        if self.contains(origin) {
            return random_unit_vector(rng);
        }

        let direction = self.center - origin;
        let basis = Onb::from_normal(direction);
        basis.local(random_to_sphere(self.radius, direction.length_squared(), rng))
    }
}

/// A sphere whose center moves linearly over a time interval.
///
/// Rays carry the time they were cast at; the camera's shutter interval
/// spreads them out, which blurs the sphere along its path.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f32,
    time1: f32,
    radius: f32,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl MovingSphere {
    /// Sphere at `center0` at time 0 and at `center1` at time 1.
    pub fn new(center0: Vec3, center1: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::surrounding(
            &Aabb::from_points(center0 - rvec, center0 + rvec),
            &Aabb::from_points(center1 - rvec, center1 + rvec),
        );

        Self {
            center0,
            center1,
            time0: 0.0,
            time1: 1.0,
            radius,
            material,
            bbox,
        }
    }

    /// Reach the two centers at `time0` and `time1` instead.
    pub fn with_time_range(mut self, time0: f32, time1: f32) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    /// Center at `time`, extrapolated outside the time range.
    pub fn center(&self, time: f32) -> Vec3 {
        let span = self.time1 - self.time0;
        if span.abs() < f32::EPSILON {
            return self.center0;
        }
        self.center0 + ((time - self.time0) / span) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let center = self.center(ray.time);
        hit_sphere(center, self.radius, self.material.as_ref(), ray, ray_t)
    }

    /// Encloses the sphere at both ends of its path.
    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
