//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed depth cutoff
//! - Light sampling mixed 50/50 with the material's own lobe
//! - Stratified sub-pixel sampling

use std::fs;
use std::path::Path;
use std::time::Instant;

use lux_math::{Interval, Ray};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image_sink::{ImageSink, SinkResult};
use crate::material::ScatterKind;
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::{Camera, Color, Scene};

/// Closest hit distance accepted for secondary rays; avoids re-hitting
/// the surface a ray leaves from.
const T_MIN: f32 = 0.001;

/// Errors reading a [`RenderConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render configuration.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Samples per pixel, rounded down to a square number of strata
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Background color when ray doesn't hit anything
    pub background: Color,
    /// Seed for the per-bucket random streams
    pub seed: u64,
    /// Edge length of a render bucket in pixels
    pub bucket_size: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 100,
            max_depth: 50,
            background: Color::ZERO,
            seed: 0,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
        }
    }
}

impl RenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Strata per pixel side: `floor(sqrt(spp))`, at least 1.
    pub fn strata(&self) -> u32 {
        ((self.samples_per_pixel as f64).sqrt() as u32).max(1)
    }

    /// Paths actually traced per pixel.
    pub fn samples_traced(&self) -> u32 {
        let strata = self.strata();
        strata * strata
    }
}

/// Compute the radiance carried back along a ray.
///
/// This is the core path tracing function. Surfaces that sample a lobe
/// draw the next direction from a 50/50 mixture of the lobe and the
/// scene's lights and weight the result by `scattering_pdf / mixture_pdf`.
pub fn ray_color(
    ray: &Ray,
    scene: &Scene,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    // If we've exceeded max depth, return black (no light)
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = scene.hit(ray, Interval::new(T_MIN, f32::INFINITY), rng) else {
        return match scene.environment() {
            Some(environment) => environment.value(0.0, 0.0, ray.direction),
            None => config.background,
        };
    };

    let emitted = rec.material.emitted(ray, &rec);

    // Absorbed: only emission comes back
    let Some(srec) = rec.material.scatter(ray, &rec, rng) else {
        return emitted;
    };

    let surface_pdf = match srec.kind {
        ScatterKind::Specular(next) => {
            return emitted + srec.attenuation * ray_color(&next, scene, depth - 1, config, rng);
        }
        ScatterKind::Sampled(pdf) => pdf,
    };

    let (direction, pdf_value) = match scene.lights() {
        Some(lights) => {
            let light_pdf = HittablePdf::new(lights, rec.p);
            let mixture = MixturePdf::new(&light_pdf, &surface_pdf);
            let direction = mixture.generate(rng);
            (direction, mixture.value(direction))
        }
        None => {
            let direction = surface_pdf.generate(rng);
            (direction, surface_pdf.value(direction))
        }
    };

    if pdf_value.is_nan() || pdf_value <= 0.0 {
        return emitted;
    }

    let scattered = Ray::new(rec.p, direction, ray.time);
    let scattering_pdf = rec.material.scattering_pdf(ray, &rec, &scattered);
    let incoming = ray_color(&scattered, scene, depth - 1, config, rng);

    emitted + srec.attenuation * scattering_pdf * incoming / pdf_value
}

/// Render a single pixel with stratified multi-sampling.
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let strata = config.strata();
    let mut pixel_color = Color::ZERO;

    for sub_j in 0..strata {
        for sub_i in 0..strata {
            let ray = camera.get_ray(x, y, sub_i, sub_j, strata, rng);
            let sample = ray_color(&ray, scene, config.max_depth, config, rng);
            // One NaN path would poison the whole pixel
            pixel_color += Color::select(sample.is_nan_mask(), Color::ZERO, sample);
        }
    }

    // Average the samples
    pixel_color / (strata * strata) as f32
}

/// Linear radiance image, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// One row of pixels, `y = 0` being the top.
    pub fn row(&self, y: u32) -> &[Color] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Raw radiance as interleaved RGB floats.
    pub fn as_f32_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Mean radiance over the whole image.
    pub fn mean(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }

    /// Send the image to `sink`, top row first.
    pub fn write_to(&self, sink: &mut dyn ImageSink) -> SinkResult<()> {
        sink.begin(self.width, self.height)?;
        for y in 0..self.height {
            sink.write_row(self.row(y))?;
        }
        sink.finish()
    }
}

/// Render the entire scene to an image buffer.
///
/// This is a simple single-threaded renderer; see
/// [`render_parallel`](crate::render_parallel) for the bucketed one.
pub fn render(
    camera: &Camera,
    scene: &Scene,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> ImageBuffer {
    let start = Instant::now();
    log::info!(
        "Rendering {}x{} at {} spp, depth {}",
        camera.image_width,
        camera.image_height,
        config.samples_traced(),
        config.max_depth
    );

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for y in 0..camera.image_height {
        for x in 0..camera.image_width {
            let color = render_pixel(camera, scene, x, y, config, rng);
            image.set(x, y, color);
        }
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisRect, DiffuseLight, FlipFace, Hittable, Lambertian, Material, Metal, Sphere, Texture};
    use lux_core::{CubeMap, SolidColor};
    use lux_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn single_sphere_scene() -> Scene {
        let mut builder = Scene::builder();
        builder.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -1.0),
            0.5,
            Arc::new(Lambertian::from_color(Color::new(0.5, 0.5, 0.5))),
        )));
        builder.build()
    }

    #[test]
    fn test_config_defaults_and_strata() {
        let config = RenderConfig::default();
        assert_eq!(config.strata(), 10);
        assert_eq!(config.samples_traced(), 100);

        let config = RenderConfig {
            samples_per_pixel: 10,
            ..Default::default()
        };
        assert_eq!(config.strata(), 3);

        let config = RenderConfig {
            samples_per_pixel: 0,
            ..Default::default()
        };
        assert_eq!(config.strata(), 1);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config =
            RenderConfig::from_json_str(r#"{ "samples_per_pixel": 16, "background": [0.1, 0.2, 0.3] }"#)
                .unwrap();
        assert_eq!(config.samples_per_pixel, 16);
        assert_eq!(config.background, Color::new(0.1, 0.2, 0.3));
        assert_eq!(config.max_depth, 50);

        assert!(RenderConfig::from_json_str("{ not json").is_err());
        assert!(matches!(
            RenderConfig::from_json_file("no/such/config.json"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = RenderConfig {
            seed: 7,
            bucket_size: 16,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RenderConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = single_sphere_scene();
        let config = RenderConfig {
            background: Color::new(0.2, 0.3, 0.4),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z, 0.0);
        assert_eq!(ray_color(&ray, &scene, 5, &config, &mut rng), config.background);
        assert_eq!(ray_color(&ray, &scene, 0, &config, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_miss_reads_environment_by_direction() {
        let face = |c: f32| -> Arc<dyn Texture> { Arc::new(SolidColor::rgb(c, c, c)) };
        let sky = CubeMap::new([face(0.1), face(0.2), face(0.3), face(0.4), face(0.5), face(0.6)]);
        let mut builder = Scene::builder();
        builder.environment(Arc::new(sky));
        let scene = builder.build();

        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let up = Ray::new(Vec3::ZERO, Vec3::new(0.1, 2.0, -0.3), 0.0);
        assert_eq!(ray_color(&up, &scene, 5, &config, &mut rng), Color::splat(0.3));
        let back = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        assert_eq!(ray_color(&back, &scene, 5, &config, &mut rng), Color::splat(0.6));
    }

    #[test]
    fn test_emitter_seen_directly() {
        let emit: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(4.0)));
        let light: Arc<dyn Hittable> = Arc::new(AxisRect::xz(-1.0, 1.0, -1.0, 1.0, 2.0, emit));
        let mut builder = Scene::builder();
        builder.add(Arc::new(FlipFace::new(light.clone()))).add_light(light);
        let scene = builder.build();

        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(0);
        let up = Ray::new(Vec3::ZERO, Vec3::Y, 0.0);
        assert_eq!(ray_color(&up, &scene, 5, &config, &mut rng), Color::splat(4.0));
    }

    #[test]
    fn test_mirror_reflects_background() {
        let mut builder = Scene::builder();
        builder.add(Arc::new(Sphere::new(
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            Arc::new(Metal::new(Color::splat(0.5), 0.0)),
        )));
        let scene = builder.build();
        let config = RenderConfig {
            background: Color::ONE,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z, 0.0);
        let color = ray_color(&ray, &scene, 5, &config, &mut rng);
        assert!((color - Color::splat(0.5)).abs().max_element() < 1e-5);
    }

    #[test]
    fn test_render_pixel() {
        let scene = single_sphere_scene();

        // Create a camera
        let mut camera = Camera::new().with_resolution(10, 10);
        camera.initialize();

        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::new(0.5, 0.7, 1.0),
            ..Default::default()
        };

        let mut rng = StdRng::seed_from_u64(42);

        // Render center pixel (should hit the sphere)
        let color = render_pixel(&camera, &scene, 5, 5, &config, &mut rng);

        // Grey sphere under a bright sky: lit, but darker than the sky
        assert!(color.length() > 0.0);
        assert!(color.x < config.background.x);
    }

    #[test]
    fn test_image_buffer_layout() {
        let mut image = ImageBuffer::new(3, 2);
        image.set(2, 1, Color::new(1.0, 2.0, 3.0));
        assert_eq!(image.get(2, 1), Color::new(1.0, 2.0, 3.0));
        assert_eq!(image.row(1)[2], Color::new(1.0, 2.0, 3.0));

        let raw = image.as_f32_slice();
        assert_eq!(raw.len(), 18);
        assert_eq!(&raw[15..18], &[1.0, 2.0, 3.0]);
        assert!((image.mean().x - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let scene = single_sphere_scene();
        let mut camera = Camera::new().with_resolution(4, 4);
        camera.initialize();
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_depth: 4,
            background: Color::ONE,
            ..Default::default()
        };

        let a = render(&camera, &scene, &config, &mut StdRng::seed_from_u64(3));
        let b = render(&camera, &scene, &config, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
