//! Scene assembly: the world the integrator traces against plus the
//! shapes it samples as lights.

use std::sync::Arc;

use lux_core::Texture;
use lux_math::{Aabb, Interval, Ray};
use rand::RngCore;

use crate::bvh::BvhNode;
use crate::hittable::{HitRecord, Hittable, HittableList};

/// A built scene. Read-only once constructed.
pub struct Scene {
    world: BvhNode,
    lights: Option<HittableList>,
    environment: Option<Arc<dyn Texture>>,
}

impl Scene {
    pub fn builder() -> SceneBuilder {
        SceneBuilder::new()
    }

    pub fn world(&self) -> &BvhNode {
        &self.world
    }

    /// Shapes used for light sampling; `None` when nothing was registered.
    pub fn lights(&self) -> Option<&HittableList> {
        self.lights.as_ref()
    }

    /// Texture looked up by direction for rays that escape the world.
    pub fn environment(&self) -> Option<&dyn Texture> {
        self.environment.as_deref()
    }

    /// Nearest hit against the world.
    pub fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rng: &mut dyn RngCore,
    ) -> Option<HitRecord<'a>> {
        self.world.hit(ray, ray_t, rng)
    }

    pub fn bounding_box(&self) -> Aabb {
        self.world.bounding_box()
    }
}

/// Collects scene objects and light-sampling shapes.
///
/// Lights are sampling targets only: a visible emitter must also be
/// added with [`SceneBuilder::add`], usually wrapped in a
/// [`FlipFace`](crate::FlipFace) so it faces the room.
#[derive(Default)]
pub struct SceneBuilder {
    objects: Vec<Arc<dyn Hittable>>,
    lights: HittableList,
    environment: Option<Arc<dyn Texture>>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visible object.
    pub fn add(&mut self, object: Arc<dyn Hittable>) -> &mut Self {
        self.objects.push(object);
        self
    }

    /// Register a shape the integrator samples directions toward.
    pub fn add_light(&mut self, light: Arc<dyn Hittable>) -> &mut Self {
        self.lights.add(light);
        self
    }

    /// Replace the flat background with a direction-keyed texture such
    /// as a [`CubeMap`](lux_core::CubeMap).
    pub fn environment(&mut self, texture: Arc<dyn Texture>) -> &mut Self {
        self.environment = Some(texture);
        self
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn build(self) -> Scene {
        log::info!(
            "Building scene: {} objects, {} lights",
            self.objects.len(),
            self.lights.len()
        );
        let lights = if self.lights.is_empty() {
            None
        } else {
            Some(self.lights)
        };
        Scene {
            world: BvhNode::new(self.objects),
            lights,
            environment: self.environment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisRect, DiffuseLight, FlipFace, Lambertian, Material, Sphere, TriangleMesh};
    use lux_core::{SolidColor, Winding};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scene_without_lights() {
        let mut builder = Scene::builder();
        builder.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -3.0),
            1.0,
            Arc::new(Lambertian::from_color(Vec3::ONE)),
        )));
        let scene = builder.build();

        assert!(scene.lights().is_none());
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_lights_are_not_in_world() {
        let emit: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Vec3::splat(4.0)));
        let light: Arc<dyn Hittable> = Arc::new(AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit));

        let mut only_sampled = Scene::builder();
        only_sampled.add_light(light.clone());
        let scene = only_sampled.build();
        assert_eq!(scene.lights().map(|l| l.len()), Some(1));

        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert!(scene.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).is_none());

        let mut visible = Scene::builder();
        visible.add(Arc::new(FlipFace::new(light.clone()))).add_light(light);
        let scene = visible.build();
        let rec = scene.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rng).unwrap();
        assert!(rec.front_face);
    }

    #[test]
    fn test_unreadable_mesh_leaves_world_bounds_finite() {
        let gray: Arc<dyn Material> = Arc::new(Lambertian::from_color(Vec3::splat(0.5)));
        let mut builder = Scene::builder();
        builder
            .add(Arc::new(TriangleMesh::load_obj("/missing/mesh.obj", Winding::CounterClockwise, gray.clone())))
            .add(Arc::new(Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, gray)));
        let scene = builder.build();

        let bounds = scene.bounding_box();
        assert!(bounds.min().is_finite() && bounds.max().is_finite());
        assert!((bounds.min() - Vec3::new(-1.0, -1.0, -4.0)).length() < 1e-3);
        assert_eq!(scene.world().node_count(), 1);
    }

    #[test]
    fn test_environment_is_optional() {
        assert!(Scene::builder().build().environment().is_none());

        let mut builder = Scene::builder();
        builder.environment(Arc::new(SolidColor::rgb(0.1, 0.2, 0.3)));
        let scene = builder.build();
        let env = scene.environment().unwrap();
        assert_eq!(env.value(0.0, 0.0, Vec3::Y), Vec3::new(0.1, 0.2, 0.3));
    }
}
