//! Triangle meshes as a single hittable.

use std::path::Path;
use std::sync::Arc;

use lux_core::{Mesh, MeshResult, VertexLayout, Winding};
use lux_math::{Aabb, Interval, Ray};
use rand::RngCore;

use crate::bvh::BvhNode;
use crate::hittable::{HitRecord, Hittable};
use crate::{Material, Triangle};

/// A loaded mesh, one [`Triangle`] per mesh triangle, behind a BVH.
///
/// All triangles share one material.
pub struct TriangleMesh {
    mesh: Mesh,
    bvh: BvhNode,
}

impl TriangleMesh {
    pub fn new(mesh: Mesh, material: Arc<dyn Material>) -> Self {
        let triangles: Vec<Arc<dyn Hittable>> = mesh
            .triangles
            .iter()
            .map(|tri| {
                let [v0, v1, v2] = mesh.triangle_positions(tri);
                let mut triangle = Triangle::new(v0, v1, v2, material.clone());
                match tri.layout() {
                    VertexLayout::Position => {}
                    VertexLayout::PositionUv => {
                        if let Some(uvs) = mesh.triangle_uvs(tri) {
                            triangle = triangle.with_uvs(uvs);
                        }
                    }
                    VertexLayout::PositionUvNormal => {
                        if let (Some(uvs), Some(normals)) =
                            (mesh.triangle_uvs(tri), mesh.triangle_normals(tri))
                        {
                            triangle = triangle.with_uvs(uvs).with_normals(normals);
                        }
                    }
                    VertexLayout::PositionNormal => {
                        if let Some(normals) = mesh.triangle_normals(tri) {
                            triangle = triangle.with_normals(normals);
                        }
                    }
                }
                Arc::new(triangle) as Arc<dyn Hittable>
            })
            .collect();

        let bvh = BvhNode::new(triangles);
        Self { mesh, bvh }
    }

    /// Load an OBJ file, failing on unreadable or empty input.
    pub fn try_load_obj(
        path: impl AsRef<Path>,
        winding: Winding,
        material: Arc<dyn Material>,
    ) -> MeshResult<Self> {
        let mesh = Mesh::from_obj_file(path, winding)?;
        Ok(Self::new(mesh, material))
    }

    /// Load an OBJ file. A file that cannot be loaded gives an empty mesh.
    pub fn load_obj(path: impl AsRef<Path>, winding: Winding, material: Arc<dyn Material>) -> Self {
        let path = path.as_ref();
        match Self::try_load_obj(path, winding, material.clone()) {
            Ok(mesh) => mesh,
            Err(e) => {
                log::error!("Failed to load mesh {}: {}; using an empty mesh", path.display(), e);
                Self::new(Mesh::empty(), material)
            }
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }
}

impl Hittable for TriangleMesh {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.bvh.hit(ray, ray_t, rng)
    }

    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use lux_core::obj::load_obj_buf;
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Vec3::splat(0.5)))
    }

    const QUAD_WITH_UVS: &str = "\
v 0 0 0
v 2 0 0
v 2 2 0
v 0 2 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    fn quad() -> TriangleMesh {
        let mesh = load_obj_buf(&mut Cursor::new(QUAD_WITH_UVS.as_bytes()), Winding::CounterClockwise).unwrap();
        TriangleMesh::new(mesh, gray())
    }

    #[test]
    fn test_quad_mesh_hit_interpolates_uv() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(1.5, 0.5, 3.0), -Vec3::Z, 0.0);
        let rec = mesh
            .hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng)
            .unwrap();
        assert!((rec.t - 3.0).abs() < 1e-5);
        assert!((rec.u - 0.75).abs() < 1e-4);
        assert!((rec.v - 0.25).abs() < 1e-4);
        assert!(rec.front_face);
    }

    #[test]
    fn test_mesh_bbox_matches_positions() {
        let mesh = quad();
        let bbox = mesh.bounding_box();
        assert!(bbox.contains_point(Vec3::new(2.0, 2.0, 0.0)));
        assert!(!bbox.contains_point(Vec3::new(2.1, 1.0, 0.0)));
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let mesh = TriangleMesh::load_obj("does/not/exist.obj", Winding::CounterClockwise, gray());
        assert!(mesh.is_empty());
        assert!(mesh.bounding_box().is_empty());

        let ray = Ray::new(Vec3::ZERO, Vec3::X, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(mesh.hit(&ray, Interval::UNIVERSE, &mut rng).is_none());

        assert!(TriangleMesh::try_load_obj("does/not/exist.obj", Winding::Clockwise, gray()).is_err());
    }
}
