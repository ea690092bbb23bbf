// Transform helpers for Mat4
//
// glam already provides transform_point3, transform_vector3 and inverse;
// this adds the box transform and per-axis rotations used by instancing.

use crate::Aabb;
use glam::{Mat4, Vec3};

/// Coordinate axis used to pick a rotation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index: 0, 1 or 2.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Right-handed rotation about this axis by `degrees`.
    pub fn rotation(self, degrees: f32) -> Mat4 {
        let radians = degrees.to_radians();
        match self {
            Axis::X => Mat4::from_rotation_x(radians),
            Axis::Y => Mat4::from_rotation_y(radians),
            Axis::Z => Mat4::from_rotation_z(radians),
        }
    }
}

/// Extension trait for Mat4 with ray tracing utilities.
pub trait Mat4Ext {
    /// Bounding box of the eight transformed corners of `aabb`.
    ///
    /// An empty box stays empty.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;

    /// Transform a surface normal: multiply by the inverse transpose and
    /// renormalize.
    fn transform_normal(&self, normal: Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        Aabb::enclosing(aabb.corners().map(|corner| self.transform_point3(corner)))
    }

    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        self.inverse()
            .transpose()
            .transform_vector3(normal)
            .normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_axis_rotation_quarter_turns() {
        assert!(approx(Axis::Z.rotation(90.0).transform_vector3(Vec3::X), Vec3::Y));
        assert!(approx(Axis::X.rotation(90.0).transform_vector3(Vec3::Y), Vec3::Z));
        assert!(approx(Axis::Y.rotation(90.0).transform_vector3(Vec3::Z), Vec3::X));
    }

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let result = mat.transform_aabb(&aabb);

        assert!(approx(result.min(), Vec3::new(10.0, 0.0, 0.0)));
        assert!(approx(result.max(), Vec3::new(11.0, 1.0, 1.0)));
    }

    #[test]
    fn test_transform_aabb_rotation_grows_box() {
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let result = Axis::Y.rotation(45.0).transform_aabb(&aabb);

        let half = 2.0f32.sqrt();
        assert!((result.x.max - half).abs() < 1e-4);
        assert!((result.z.min + half).abs() < 1e-4);
        assert!((result.y.max - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_transform_aabb_empty_stays_empty() {
        let mat = Mat4::from_scale(Vec3::splat(2.0));
        assert!(mat.transform_aabb(&Aabb::EMPTY).is_empty());
    }

    #[test]
    fn test_transform_normal_nonuniform_scale() {
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = mat.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        // Inverse transpose shrinks the x component.
        assert!(approx(n, Vec3::new(0.5, 1.0, 0.0).normalize()));
    }

    proptest! {
        #[test]
        fn rotation_round_trip(
            degrees in -360.0f32..360.0,
            x in -10.0f32..10.0,
            y in -10.0f32..10.0,
            z in -10.0f32..10.0,
        ) {
            let p = Vec3::new(x, y, z);
            for axis in [Axis::X, Axis::Y, Axis::Z] {
                let m = axis.rotation(degrees);
                let back = m.inverse().transform_point3(m.transform_point3(p));
                prop_assert!((back - p).length() < 1e-3);
            }
        }

        #[test]
        fn transformed_box_contains_transformed_points(
            degrees in -180.0f32..180.0,
            tx in -5.0f32..5.0,
            u in 0.0f32..1.0,
            v in 0.0f32..1.0,
            w in 0.0f32..1.0,
        ) {
            let aabb = Aabb::from_points(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 1.0, 4.0));
            let p = aabb.min() + (aabb.max() - aabb.min()) * Vec3::new(u, v, w);
            let m = Mat4::from_translation(Vec3::new(tx, 0.0, 0.0)) * Axis::Z.rotation(degrees);
            let moved = m.transform_aabb(&aabb);
            let q = m.transform_point3(p);
            prop_assert!(contains_with_slack(&moved, q, 1e-3));
        }
    }

    fn contains_with_slack(aabb: &Aabb, p: Vec3, eps: f32) -> bool {
        (p.cmpge(aabb.min() - eps) & p.cmple(aabb.max() + eps)).all()
    }
}
