//! Decorators that place a hittable in the world.
//!
//! [`Transform`] maps rays into the wrapped object's space, intersects
//! there and maps the hit back. The ray direction is transformed without
//! renormalizing, so `t` means the same thing in both spaces and the
//! search window passes through unchanged.

use std::sync::Arc;

use lux_math::{Aabb, Axis, Interval, Mat4, Mat4Ext, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};

/// An affine transform applied to a hittable.
///
/// Light sampling through a transform is exact for rigid motions and
/// uniform scales, which preserve solid angles.
pub struct Transform {
    object: Arc<dyn Hittable>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    bbox: Aabb,
}

impl Transform {
    /// Wrap `object` with an arbitrary invertible local-to-world matrix.
    pub fn new(object: Arc<dyn Hittable>, local_to_world: Mat4) -> Self {
        let bbox = local_to_world.transform_aabb(&object.bounding_box());
        Self {
            object,
            local_to_world,
            world_to_local: local_to_world.inverse(),
            bbox,
        }
    }

    pub fn translate(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        Self::new(object, Mat4::from_translation(offset))
    }

    /// Uniform scale about the origin.
    pub fn scale(object: Arc<dyn Hittable>, factor: f32) -> Self {
        Self::new(object, Mat4::from_scale(Vec3::splat(factor)))
    }

    /// Rotation about `axis` through the origin.
    pub fn rotate(object: Arc<dyn Hittable>, axis: Axis, degrees: f32) -> Self {
        Self::new(object, axis.rotation(degrees))
    }

    pub fn rotate_x(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::rotate(object, Axis::X, degrees)
    }

    pub fn rotate_y(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::rotate(object, Axis::Y, degrees)
    }

    pub fn rotate_z(object: Arc<dyn Hittable>, degrees: f32) -> Self {
        Self::rotate(object, Axis::Z, degrees)
    }

    pub fn matrix(&self) -> Mat4 {
        self.local_to_world
    }

    fn to_local(&self, ray: &Ray) -> Ray {
        Ray::new(
            self.world_to_local.transform_point3(ray.origin),
            self.world_to_local.transform_vector3(ray.direction),
            ray.time,
        )
    }
}

impl Hittable for Transform {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let local_ray = self.to_local(ray);
        let mut rec = self.object.hit(&local_ray, ray_t, rng)?;

        rec.p = self.local_to_world.transform_point3(rec.p);
        // The inverse transpose keeps the normal's side relative to the
        // ray, so front_face carries over.
        rec.normal = self.local_to_world.transform_normal(rec.normal);
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(
            self.world_to_local.transform_point3(origin),
            self.world_to_local.transform_vector3(direction),
        )
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let local_origin = self.world_to_local.transform_point3(origin);
        let local = self.object.random(local_origin, rng);
        self.local_to_world.transform_vector3(local)
    }
}

/// Reports every hit of the wrapped object as seen from the other side.
///
/// Turns a one-sided emitter around, e.g. a ceiling light whose outward
/// normal points up.
pub struct FlipFace {
    object: Arc<dyn Hittable>,
}

impl FlipFace {
    pub fn new(object: Arc<dyn Hittable>) -> Self {
        Self { object }
    }
}

impl Hittable for FlipFace {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let mut rec = self.object.hit(ray, ray_t, rng)?;
        rec.front_face = !rec.front_face;
        Some(rec)
    }

    fn bounding_box(&self) -> Aabb {
        self.object.bounding_box()
    }

    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        self.object.pdf_value(origin, direction)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        self.object.random(origin, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisRect, Cuboid, Lambertian, Material, Sphere};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    fn unit_sphere() -> Arc<dyn Hittable> {
        Arc::new(Sphere::new(Vec3::ZERO, 1.0, gray()))
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_translate_moves_hits() {
        let moved = Transform::translate(unit_sphere(), Vec3::new(0.0, 0.0, -5.0));
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = moved.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 4.0).abs() < 1e-4);
        assert!(approx(rec.p, Vec3::new(0.0, 0.0, -4.0)));
        assert!(approx(rec.normal, Vec3::Z));
        assert!(rec.front_face);
    }

    #[test]
    fn test_scale_keeps_t_in_world_units() {
        let scaled = Transform::scale(unit_sphere(), 3.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = scaled.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 7.0).abs() < 1e-4);
        assert!(approx(rec.normal, Vec3::Z));
    }

    #[test]
    fn test_rotated_box_bbox_grows() {
        let cube: Arc<dyn Hittable> = Arc::new(Cuboid::new(Vec3::splat(-1.0), Vec3::splat(1.0), gray()));
        let rotated = Transform::rotate_y(cube, 45.0);
        let bbox = rotated.bounding_box();
        let half_diagonal = 2.0_f32.sqrt();
        assert!((bbox.max().x - half_diagonal).abs() < 1e-3);
        assert!((bbox.max().y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_normal_follows_object() {
        // Rect facing +z, turned to face +x
        let rect: Arc<dyn Hittable> = Arc::new(AxisRect::xy(-1.0, 1.0, -1.0, 1.0, 0.0, gray()));
        let turned = Transform::rotate_y(rect, 90.0);
        let ray = Ray::new(Vec3::new(5.0, 0.2, 0.1), -Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let rec = turned.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 5.0).abs() < 1e-4);
        assert!(rec.front_face);
        assert!(approx(rec.normal, Vec3::X));
    }

    #[test]
    fn test_flip_face_inverts_front_face() {
        let light: Arc<dyn Hittable> = Arc::new(AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, gray()));
        let flipped = FlipFace::new(light.clone());
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        let mut rng = StdRng::seed_from_u64(0);

        let plain = light.hit(&ray, Interval::UNIVERSE, &mut rng).unwrap();
        let rec = flipped.hit(&ray, Interval::UNIVERSE, &mut rng).unwrap();
        assert!(!plain.front_face);
        assert!(rec.front_face);
        assert_eq!(flipped.pdf_value(Vec3::ZERO, Vec3::Y), light.pdf_value(Vec3::ZERO, Vec3::Y));
    }

    #[test]
    fn test_transformed_light_sampling_matches_density() {
        let light: Arc<dyn Hittable> = Arc::new(AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 0.0, gray()));
        let placed = Transform::translate(light, Vec3::new(0.0, 3.0, 0.0));
        let mut rng = StdRng::seed_from_u64(5);

        // Directly below the moved light: distance 3, area 4, cosine 1
        assert!((placed.pdf_value(Vec3::ZERO, Vec3::Y) - 9.0 / 4.0).abs() < 1e-4);
        for _ in 0..50 {
            let d = placed.random(Vec3::ZERO, &mut rng);
            assert!(placed.pdf_value(Vec3::ZERO, d) > 0.0);
        }
    }

    proptest! {
        #[test]
        fn rotate_then_unrotate_returns_hit(
            degrees in -360.0f32..360.0,
            y in -0.5f32..0.5,
        ) {
            let inner: Arc<dyn Hittable> = Arc::new(Sphere::new(Vec3::new(2.0, 0.0, 0.0), 0.75, gray()));
            let there = Arc::new(Transform::rotate_z(inner, degrees));
            let back = Transform::rotate_z(there, -degrees);

            let ray = Ray::new(Vec3::new(2.0, y, 5.0), -Vec3::Z, 0.0);
            let mut rng = StdRng::seed_from_u64(0);
            let rec = back.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng);
            prop_assert!(rec.is_some());
            let rec = rec.unwrap();
            let expected = 5.0 - (0.75f32 * 0.75 - y * y).sqrt();
            prop_assert!((rec.t - expected).abs() < 1e-3);
        }
    }
}
