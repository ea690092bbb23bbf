//! Sampleable direction distributions.
//!
//! A [`Pdf`] both draws directions and reports the density it draws them
//! with. The integrator mixes a light-directed PDF with the material's own
//! lobe through [`MixturePdf`].

use std::f32::consts::PI;

use lux_math::{Onb, Vec3};
use rand::RngCore;

use crate::sampling::{gen_f32, random_cosine_direction, random_unit_vector};
use crate::Hittable;

/// A probability density over directions.
pub trait Pdf {
    /// Solid-angle density of `direction`.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction distributed according to [`Pdf::value`].
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Cosine-weighted hemisphere about a normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    basis: Onb,
}

impl CosinePdf {
    pub fn new(normal: Vec3) -> Self {
        Self {
            basis: Onb::from_normal(normal),
        }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine = direction.normalize_or_zero().dot(self.basis.w);
        if cosine <= 0.0 {
            0.0
        } else {
            cosine / PI
        }
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.basis.local(random_cosine_direction(rng))
    }
}

/// Uniform over the whole sphere of directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f32 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        random_unit_vector(rng)
    }
}

/// Directions from `origin` toward a (light) object.
pub struct HittablePdf<'a> {
    objects: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(objects: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { objects, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.objects.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.objects.random(self.origin, rng)
    }
}

/// Equal-weight mixture of two PDFs.
pub struct MixturePdf<'a> {
    pdfs: [&'a dyn Pdf; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self { pdfs: [p0, p1] }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        0.5 * self.pdfs[0].value(direction) + 0.5 * self.pdfs[1].value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < 0.5 {
            self.pdfs[0].generate(rng)
        } else {
            self.pdfs[1].generate(rng)
        }
    }
}

/// The lobe a scattering material samples from.
#[derive(Debug, Clone, Copy)]
pub enum SurfacePdf {
    Cosine(CosinePdf),
    Sphere(SpherePdf),
}

impl Pdf for SurfacePdf {
    fn value(&self, direction: Vec3) -> f32 {
        match self {
            SurfacePdf::Cosine(pdf) => pdf.value(direction),
            SurfacePdf::Sphere(pdf) => pdf.value(direction),
        }
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self {
            SurfacePdf::Cosine(pdf) => pdf.generate(rng),
            SurfacePdf::Sphere(pdf) => pdf.generate(rng),
        }
    }
}
