//! Homogeneous participating medium (smoke, fog) inside a boundary shape.

use std::sync::Arc;

use lux_core::Texture;
use lux_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::gen_f32;
use crate::{Color, Isotropic, Material};

/// Offset past the entry point when searching for the exit.
const EXIT_SEARCH_OFFSET: f32 = 0.0001;

/// A volume of constant density filling a convex boundary.
///
/// The boundary is crossed at most once per query: a ray is assumed to
/// enter and leave it a single time. Non-convex boundaries (a torus, a
/// shape with voids) are misclassified when a ray crosses more than two
/// of their surfaces.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    density: f32,
    phase_function: Isotropic,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f32, albedo: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            density,
            phase_function: Isotropic::new(albedo),
        }
    }

    pub fn from_color(boundary: Arc<dyn Hittable>, density: f32, albedo: Color) -> Self {
        Self {
            boundary,
            density,
            phase_function: Isotropic::from_color(albedo),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        // Zero, negative or NaN density never scatters
        if self.density.is_nan() || self.density <= 0.0 {
            return None;
        }

        let entry = self.boundary.hit(ray, Interval::UNIVERSE, rng)?;
        let exit_window = Interval::new(entry.t + EXIT_SEARCH_OFFSET, f32::INFINITY);
        let exit = self.boundary.hit(ray, exit_window, rng)?;

        let mut t_enter = entry.t.max(ray_t.min);
        let t_exit = exit.t.min(ray_t.max);
        if t_enter >= t_exit {
            return None;
        }
        if t_enter < 0.0 {
            t_enter = 0.0;
        }

        let ray_length = ray.direction.length();
        let distance_inside_boundary = (t_exit - t_enter) * ray_length;
        // 1 - U keeps the log argument in (0, 1]
        let hit_distance = -(1.0 - gen_f32(rng)).ln() / self.density;
        if hit_distance > distance_inside_boundary {
            return None;
        }

        let t = t_enter + hit_distance / ray_length;
        Some(HitRecord {
            p: ray.at(t),
            // Arbitrary; the phase function ignores it
            normal: Vec3::X,
            material: &self.phase_function as &dyn Material,
            u: 0.0,
            v: 0.0,
            t,
            front_face: true,
        })
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
