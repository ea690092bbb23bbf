//! Planar checkerboard with two alternating materials.

use std::sync::Arc;

use lux_math::{Aabb, Interval, Onb, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;

/// A finite plane tiled with square cells.
///
/// The board starts at `corner` and spans `squares.0` cells along `u` and
/// `squares.1` cells along `v`, where `u = vup x normal` and
/// `v = normal x u`. Cell `(i, j)` uses the even material when `i + j` is
/// even and the odd material otherwise. UVs run 0 to 1 across the board.
pub struct Checkerboard {
    corner: Vec3,
    normal: Vec3,
    u: Vec3,
    v: Vec3,
    square_size: f32,
    extent: Vec2,
    even: Arc<dyn Material>,
    odd: Arc<dyn Material>,
    bbox: Aabb,
}

impl Checkerboard {
    pub fn new(
        corner: Vec3,
        normal: Vec3,
        square_size: f32,
        squares: (u32, u32),
        vup: Vec3,
        even: Arc<dyn Material>,
        odd: Arc<dyn Material>,
    ) -> Self {
        let normal = normal.normalize_or_zero();
        let u = match vup.cross(normal).try_normalize() {
            Some(u) => u,
            // vup parallel to the normal
            None => Onb::from_normal(normal).u,
        };
        let v = normal.cross(u);

        let square_size = square_size.max(0.0);
        let extent = Vec2::new(squares.0 as f32, squares.1 as f32) * square_size;
        let far_u = u * extent.x;
        let far_v = v * extent.y;
        let bbox = Aabb::enclosing([corner, corner + far_u, corner + far_v, corner + far_u + far_v]);

        Self {
            corner,
            normal,
            u,
            v,
            square_size,
            extent,
            even,
            odd,
            bbox,
        }
    }

    fn material_for(&self, a: f32, b: f32) -> &dyn Material {
        let cell = (a / self.square_size) as u64 + (b / self.square_size) as u64;
        if cell % 2 == 1 {
            self.odd.as_ref()
        } else {
            self.even.as_ref()
        }
    }
}

impl Hittable for Checkerboard {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        _rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1e-8 || self.square_size <= 0.0 {
            return None;
        }

        let t = self.normal.dot(self.corner - ray.origin) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let local = ray.at(t) - self.corner;
        let a = local.dot(self.u);
        let b = local.dot(self.v);
        if !(0.0..=self.extent.x).contains(&a) || !(0.0..=self.extent.y).contains(&b) {
            return None;
        }

        let uv = (a / self.extent.x, b / self.extent.y);
        Some(HitRecord::new(ray, t, self.normal, uv, self.material_for(a, b)))
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> Checkerboard {
        // Floor at y = 0: u runs along +X, v along -Z
        Checkerboard::new(
            Vec3::ZERO,
            Vec3::Y,
            1.0,
            (4, 3),
            -Vec3::Z,
            Arc::new(Lambertian::from_color(Vec3::ONE)),
            Arc::new(Lambertian::from_color(Vec3::ZERO)),
        )
    }

    fn albedo_at(board: &Checkerboard, x: f32, z: f32) -> Option<Vec3> {
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::new(x, 5.0, z), -Vec3::Y, 0.0);
        let rec = board.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)?;
        assert!((rec.t - 5.0).abs() < 1e-5);
        assert!(rec.front_face);
        let srec = rec.material.scatter(&ray, &rec, &mut rng)?;
        Some(srec.attenuation)
    }

    #[test]
    fn test_cells_alternate() {
        let board = board();
        assert_eq!(albedo_at(&board, 0.5, -0.5), Some(Vec3::ONE));
        assert_eq!(albedo_at(&board, 1.5, -0.5), Some(Vec3::ZERO));
        assert_eq!(albedo_at(&board, 1.5, -1.5), Some(Vec3::ONE));
        assert_eq!(albedo_at(&board, 3.5, -2.5), Some(Vec3::ZERO));
    }

    #[test]
    fn test_misses_outside_board() {
        let board = board();
        assert_eq!(albedo_at(&board, -0.5, -0.5), None);
        assert_eq!(albedo_at(&board, 4.5, -0.5), None);
        assert_eq!(albedo_at(&board, 0.5, 0.5), None);
        assert_eq!(albedo_at(&board, 0.5, -3.5), None);

        let mut rng = StdRng::seed_from_u64(0);
        let parallel = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X, 0.0);
        assert!(board.hit(&parallel, Interval::UNIVERSE, &mut rng).is_none());
    }

    #[test]
    fn test_uv_and_bounds() {
        let board = board();
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::new(1.0, 2.0, -1.5), -Vec3::Y, 0.0);
        let rec = board.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.u - 0.25).abs() < 1e-5 && (rec.v - 0.5).abs() < 1e-5);

        let bbox = board.bounding_box();
        assert!(bbox.contains_point(Vec3::new(4.0, 0.0, -3.0)));
        assert!(bbox.contains_point(Vec3::ZERO));
        assert!(bbox.max().y - bbox.min().y < 1e-3);
    }
}
