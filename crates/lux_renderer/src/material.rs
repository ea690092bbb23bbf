//! Material trait for surface scattering.
//!
//! A material answers three questions at a hit: how the path continues
//! ([`Material::scatter`]), what light the surface emits, and the density
//! of its scattering lobe toward a given direction. Scattering either
//! hands the integrator a PDF to sample or, for mirror-like events, the
//! exact next ray.

use std::f32::consts::PI;
use std::sync::Arc;

use lux_core::{SolidColor, Texture};
use lux_math::{Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::pdf::{CosinePdf, SpherePdf, SurfacePdf};
use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::Color;

/// How a scattered path continues.
#[derive(Debug, Clone, Copy)]
pub enum ScatterKind {
    /// Sample the next direction from this lobe (mixed with light sampling).
    Sampled(SurfacePdf),
    /// Follow this ray as-is; no density weighting applies.
    Specular(Ray),
}

/// Outcome of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    pub attenuation: Color,
    pub kind: ScatterKind,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray. `None` means the path ends here.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore)
        -> Option<ScatterRecord>;

    /// Radiance emitted at the hit. Most materials return black.
    fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord) -> Color {
        Color::ZERO
    }

    /// Density of the scattering lobe toward `scattered`.
    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        0.0
    }
}

fn solid(color: Color) -> Arc<dyn Texture> {
    Arc::new(SolidColor::new(color))
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    /// Create a new Lambertian material with a constant albedo color.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(solid(albedo))
    }

    fn albedo_at(&self, rec: &HitRecord) -> Color {
        self.albedo.value(rec.u, rec.v, rec.p)
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            attenuation: self.albedo_at(rec),
            kind: ScatterKind::Sampled(SurfacePdf::Cosine(CosinePdf::new(rec.normal))),
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        let cosine = rec.normal.dot(scattered.direction.normalize_or_zero());
        cosine.max(0.0) / PI
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, capped at 1.0
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction.normalize(), rec.normal);
        let direction = reflected + self.fuzz * random_in_unit_sphere(rng);
        Some(ScatterRecord {
            attenuation: self.albedo,
            kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time)),
        })
    }
}

/// A diffuse base with a metallic coat.
///
/// Each scatter picks the coat with `specular_probability`, otherwise the
/// diffuse base. The attenuation is a blend of both albedos weighted by a
/// second, independent roll, whichever branch was taken.
#[derive(Debug, Clone)]
pub struct Glossy {
    diffuse: Lambertian,
    specular: Metal,
    specular_probability: f32,
}

impl Glossy {
    pub fn new(diffuse: Color, specular: Color, roughness: f32, specular_probability: f32) -> Self {
        Self::from_parts(
            Lambertian::from_color(diffuse),
            Metal::new(specular, roughness),
            specular_probability,
        )
    }

    pub fn from_parts(diffuse: Lambertian, specular: Metal, specular_probability: f32) -> Self {
        Self {
            diffuse,
            specular,
            specular_probability: specular_probability.clamp(0.0, 1.0),
        }
    }
}

impl Material for Glossy {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let specular_roll = gen_f32(rng);
        let mut srec = if gen_f32(rng) < self.specular_probability {
            self.specular.scatter(ray_in, rec, rng)?
        } else {
            self.diffuse.scatter(ray_in, rec, rng)?
        };

        srec.attenuation = self
            .diffuse
            .albedo_at(rec)
            .lerp(self.specular.albedo, specular_roll);
        Some(srec)
    }

    fn scattering_pdf(&self, ray_in: &Ray, rec: &HitRecord, scattered: &Ray) -> f32 {
        self.diffuse.scattering_pdf(ray_in, rec, scattered)
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
    /// Radius of the random perturbation applied to the outgoing direction
    roughness: f32,
    /// Transmission color
    tint: Color,
    /// Floor on the probability of reflecting
    specular_chance: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self {
            ior,
            roughness: 0.0,
            tint: Color::ONE,
            specular_chance: 0.0,
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.max(0.0);
        self
    }

    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_specular_chance(mut self, chance: f32) -> Self {
        self.specular_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ratio: f32) -> f32 {
        let r0 = ((1.0 - ratio) / (1.0 + ratio)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face {
            1.0 / self.ior
        } else {
            self.ior
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        let cannot_refract = refraction_ratio * sin_theta > 1.0;
        let reflect_probability = self.specular_chance
            + (1.0 - self.specular_chance) * Self::reflectance(cos_theta, refraction_ratio);

        let direction = if cannot_refract || reflect_probability > gen_f32(rng) {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };
        let direction = if self.roughness > 0.0 {
            direction + self.roughness * random_in_unit_sphere(rng)
        } else {
            direction
        };

        Some(ScatterRecord {
            attenuation: self.tint,
            kind: ScatterKind::Specular(Ray::new(rec.p, direction, ray_in.time)),
        })
    }
}

/// Diffuse light emitter. Only the front face emits.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(emit: Arc<dyn Texture>) -> Self {
        Self { emit }
    }

    /// Create a new diffuse light with the given emission color.
    pub fn from_color(emit: Color) -> Self {
        Self::new(solid(emit))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, _ray_in: &Ray, rec: &HitRecord) -> Color {
        if rec.front_face {
            self.emit.value(rec.u, rec.v, rec.p)
        } else {
            Color::ZERO
        }
    }
}

/// Phase function of a participating medium: scatters uniformly.
#[derive(Debug, Clone)]
pub struct Isotropic {
    albedo: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(solid(albedo))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<ScatterRecord> {
        Some(ScatterRecord {
            attenuation: self.albedo.value(rec.u, rec.v, rec.p),
            kind: ScatterKind::Sampled(SurfacePdf::Sphere(SpherePdf)),
        })
    }

    fn scattering_pdf(&self, _ray_in: &Ray, _rec: &HitRecord, _scattered: &Ray) -> f32 {
        1.0 / (4.0 * PI)
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
