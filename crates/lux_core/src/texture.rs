//! Texture samplers for materials.
//!
//! Every texture answers `value(u, v, p)`: a color for a surface point with
//! texture coordinates `(u, v)` and world position `p`. Image textures are
//! decoded once with the `image` crate into linear RGB and shared through a
//! [`TextureCache`].

use std::collections::HashMap;
use std::f32::consts::PI;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lux_math::Vec3;
use thiserror::Error;

use crate::perlin::Perlin;
use crate::Color;

/// Color returned for an image texture that failed to load.
pub const FALLBACK_COLOR: Color = Vec3::new(0.0, 1.0, 1.0);

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer of {len} bytes does not match a {width}x{height} RGB image")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A color lookup over surface coordinates.
pub trait Texture: Send + Sync + fmt::Debug {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color;
}

/// Constant color everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor {
    pub color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(Vec3::new(r, g, b))
    }
}

impl Texture for SolidColor {
    fn value(&self, _u: f32, _v: f32, _p: Vec3) -> Color {
        self.color
    }
}

/// 3D checker pattern driven by world position.
#[derive(Debug, Clone)]
pub struct CheckerTexture {
    pub even: Arc<dyn Texture>,
    pub odd: Arc<dyn Texture>,
    /// Spatial frequency of the sine lattice.
    pub frequency: f32,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>) -> Self {
        Self {
            even,
            odd,
            frequency: 10.0,
        }
    }

    pub fn from_colors(even: Color, odd: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)))
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }
}

impl Texture for CheckerTexture {
    fn value(&self, u: f32, v: f32, p: Vec3) -> Color {
        let f = self.frequency;
        let sines = (f * p.x).sin() * (f * p.y).sin() * (f * p.z).sin();
        if sines < 0.0 {
            self.odd.value(u, v, p)
        } else {
            self.even.value(u, v, p)
        }
    }
}

/// Look of a [`NoiseTexture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseStyle {
    /// White marble: soft bands along `x + z` bent by turbulence.
    #[default]
    Marble,
    /// Dark stone with thin bright veins across `x`.
    Veins,
}

/// Procedural marble from Perlin turbulence, driven by world position.
#[derive(Debug, Clone)]
pub struct NoiseTexture {
    noise: Perlin,
    scale: f32,
    style: NoiseStyle,
}

impl NoiseTexture {
    /// Band period along `x + z`, divided by `scale`.
    const MARBLE_PERIOD: f32 = 500.0;

    pub fn new(scale: f32, seed: u64) -> Self {
        Self {
            noise: Perlin::with_seed(seed),
            scale,
            style: NoiseStyle::Marble,
        }
    }

    pub fn with_style(mut self, style: NoiseStyle) -> Self {
        self.style = style;
        self
    }

    fn marble(&self, p: Vec3) -> f32 {
        let phase = self.scale * (p.z + p.x) / Self::MARBLE_PERIOD;
        0.55 * (1.0 + (phase + 3.0 * self.noise.turbulence(p, 4)).sin())
    }

    /// Raised sine whose peaks reach 0.8 and fall to 0.5 at the vein's
    /// half width; everything below the 0.2 floor is clamped.
    fn veins(&self, p: Vec3) -> f32 {
        const WIDTH: f32 = 0.4;
        const SEPARATION: f32 = 5.0;
        const PEAK: f32 = 0.8;
        const AT_WIDTH: f32 = 0.5;
        const FLOOR: f32 = 0.2;

        let k = PI / (SEPARATION + WIDTH);
        let alpha = (0.5 * PI / (WIDTH / SEPARATION + 1.0)).sin();
        let c = (PEAK * alpha - AT_WIDTH) / (1.0 - alpha);
        let a = c + PEAK;

        let wave = (k * p.x + 50.0 * self.noise.turbulence(0.2 * p, 10)).sin();
        (a * wave - c).max(FLOOR)
    }
}

impl Texture for NoiseTexture {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let intensity = match self.style {
            NoiseStyle::Marble => self.marble(p),
            NoiseStyle::Veins => self.veins(p),
        };
        Color::splat(intensity)
    }
}

/// Six face textures around the origin, looked up by direction.
///
/// `value` reads its point argument as a direction (it need not be
/// normalized), which makes a cube map usable as a scene environment.
/// Faces are ordered +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone)]
pub struct CubeMap {
    faces: [Arc<dyn Texture>; 6],
}

impl CubeMap {
    pub fn new(faces: [Arc<dyn Texture>; 6]) -> Self {
        Self { faces }
    }

    /// Face index and in-face `(u, v)` in [0, 1] for a direction.
    pub fn face_uv(dir: Vec3) -> (usize, f32, f32) {
        let a = dir.abs();
        let (face, major, u, v) = if a.x >= a.y && a.x >= a.z {
            if dir.x >= 0.0 {
                (0, a.x, -dir.z, dir.y)
            } else {
                (1, a.x, dir.z, dir.y)
            }
        } else if a.y >= a.z {
            if dir.y >= 0.0 {
                (2, a.y, dir.x, -dir.z)
            } else {
                (3, a.y, dir.x, dir.z)
            }
        } else if dir.z >= 0.0 {
            (4, a.z, dir.x, dir.y)
        } else {
            (5, a.z, -dir.x, dir.y)
        };

        if major <= 0.0 {
            return (face, 0.5, 0.5);
        }
        (face, 0.5 * (u / major + 1.0), 0.5 * (v / major + 1.0))
    }
}

impl Texture for CubeMap {
    fn value(&self, _u: f32, _v: f32, p: Vec3) -> Color {
        let (face, u, v) = Self::face_uv(p);
        self.faces[face].value(u, v, p)
    }
}

/// Blends three corner colors with the hit's barycentric `(u, v)`.
///
/// Corner 0 has weight `u`, corner 1 weight `v` and corner 2 the remainder,
/// which matches the default triangle UVs `(1,0)`, `(0,1)`, `(0,0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycentricTexture {
    pub corners: [Color; 3],
}

impl BarycentricTexture {
    pub fn new(c0: Color, c1: Color, c2: Color) -> Self {
        Self {
            corners: [c0, c1, c2],
        }
    }
}

impl Texture for BarycentricTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let mut u = u.max(0.0);
        let mut v = v.max(0.0);
        if u + v > 1.0 {
            let norm = 1.0 / (u + v);
            u *= norm;
            v *= norm;
        }
        let [c0, c1, c2] = self.corners;
        u * c0 + v * c1 + (1.0 - u - v) * c2
    }
}

/// A decoded image in linear RGB, sampled with nearest lookup.
///
/// Only the constructors build one, so both dimensions are at least 1.
#[derive(Clone)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    /// Row-major, top row first.
    pixels: Vec<Color>,
    path: String,
}

impl fmt::Debug for ImageTexture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("path", &self.path)
            .finish()
    }
}

impl ImageTexture {
    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        let texture = Self::from_rgb8(width, height, rgb.as_raw(), path.display().to_string())?;

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            texture.path,
            width,
            height,
            texture.size_bytes() as f32 / 1024.0
        );
        Ok(texture)
    }

    /// Decode an image file, or fall back to a solid [`FALLBACK_COLOR`].
    pub fn load_or_fallback(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("Could not load texture {}: {}", path.display(), e);
                Self::solid(FALLBACK_COLOR)
            }
        }
    }

    /// Build from tightly packed 8-bit sRGB triples.
    pub fn from_rgb8(
        width: u32,
        height: u32,
        data: &[u8],
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 || data.len() != width as usize * height as usize * 3 {
            return Err(TextureError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }

        let pixels = data
            .chunks_exact(3)
            .map(|p| Vec3::new(srgb_to_linear(p[0]), srgb_to_linear(p[1]), srgb_to_linear(p[2])))
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// A 1x1 image of one color.
    pub fn solid(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<solid>".to_string(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Color>()
    }

    fn pixel(&self, x: u32, y: u32) -> Color {
        self.pixels
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}

impl Texture for ImageTexture {
    fn value(&self, u: f32, v: f32, _p: Vec3) -> Color {
        let u = u.clamp(0.0, 1.0);
        // Image rows run top to bottom, v runs bottom to top.
        let v = 1.0 - v.clamp(0.0, 1.0);

        let x = ((u * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = ((v * self.height as f32) as u32).min(self.height.saturating_sub(1));
        self.pixel(x, y)
    }
}

/// Path-keyed cache so each image is decoded once per scene build.
#[derive(Debug, Default)]
pub struct TextureCache {
    textures: HashMap<PathBuf, Arc<ImageTexture>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using the cache if available.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TextureResult<Arc<ImageTexture>> {
        let full_path = self.resolve_path(path.as_ref());
        if let Some(texture) = self.textures.get(&full_path) {
            return Ok(texture.clone());
        }

        let texture = Arc::new(ImageTexture::load(&full_path)?);
        self.textures.insert(full_path, texture.clone());
        Ok(texture)
    }

    /// Like [`TextureCache::load`], but failures yield an uncached fallback.
    pub fn load_or_fallback(&mut self, path: impl AsRef<Path>) -> Arc<ImageTexture> {
        let path = path.as_ref();
        self.load(path).unwrap_or_else(|e| {
            log::warn!("Could not load texture {}: {}", path.display(), e);
            Arc::new(ImageTexture::solid(FALLBACK_COLOR))
        })
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Convert an sRGB byte value to linear float.
pub fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Color, b: Color) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_solid_color() {
        let tex = SolidColor::rgb(1.0, 0.5, 0.0);
        assert_eq!(tex.value(0.3, 0.7, Vec3::ONE), Vec3::new(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_checker_selects_by_sign() {
        let tex = CheckerTexture::from_colors(Vec3::ONE, Vec3::ZERO);
        // All three sines positive.
        let p = Vec3::splat(0.1);
        assert_eq!(tex.value(0.0, 0.0, p), Vec3::ONE);
        // Flip one sign.
        let q = Vec3::new(-0.1, 0.1, 0.1);
        assert_eq!(tex.value(0.0, 0.0, q), Vec3::ZERO);
    }

    #[test]
    fn test_noise_texture_is_deterministic_and_bounded() {
        let a = NoiseTexture::new(12.0, 5);
        let b = NoiseTexture::new(12.0, 5);
        let veins = NoiseTexture::new(12.0, 5).with_style(NoiseStyle::Veins);

        for i in 0..500 {
            let p = Vec3::new(i as f32 * 0.731, (i % 17) as f32 * -0.29, i as f32 * 0.113);
            let marble = a.value(0.0, 0.0, p);
            assert_eq!(marble, b.value(0.0, 0.0, p));
            assert!(marble.x >= 0.0 && marble.x <= 1.1 + 1e-5);
            assert_eq!(marble.x, marble.z);

            let dark = veins.value(0.0, 0.0, p);
            assert!(dark.x >= 0.2 && dark.x <= 0.8 + 1e-3, "vein intensity {}", dark.x);
        }
    }

    #[test]
    fn test_cube_map_face_selection() {
        let colors = [Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y, Vec3::Z, -Vec3::Z];
        let faces = colors.map(|c| Arc::new(SolidColor::new(c)) as Arc<dyn Texture>);
        let cube = CubeMap::new(faces);

        for (i, &dir) in colors.iter().enumerate() {
            assert_eq!(cube.value(0.0, 0.0, dir * 3.0), colors[i]);
            assert_eq!(CubeMap::face_uv(dir), (i, 0.5, 0.5));
        }
        // Tilted toward +Y but still mostly +Z
        let (face, u, v) = CubeMap::face_uv(Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(face, 4);
        assert!((u - 0.5).abs() < 1e-6 && (v - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_barycentric_corners() {
        let tex = BarycentricTexture::new(Vec3::X, Vec3::Y, Vec3::Z);
        assert!(approx(tex.value(1.0, 0.0, Vec3::ZERO), Vec3::X));
        assert!(approx(tex.value(0.0, 1.0, Vec3::ZERO), Vec3::Y));
        assert!(approx(tex.value(0.0, 0.0, Vec3::ZERO), Vec3::Z));
    }

    #[test]
    fn test_barycentric_out_of_range_is_clamped() {
        let tex = BarycentricTexture::new(Vec3::X, Vec3::Y, Vec3::Z);
        // Negative weights clamp to zero.
        assert!(approx(tex.value(-0.5, 0.0, Vec3::ZERO), Vec3::Z));
        // u + v > 1 renormalizes onto the 0-1 edge.
        assert!(approx(tex.value(1.0, 1.0, Vec3::ZERO), Vec3::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn test_image_texture_lookup_and_clamp() {
        // 2x2: top row red, green; bottom row blue, white.
        let data = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let tex = ImageTexture::from_rgb8(2, 2, &data, "test").unwrap();

        assert!(approx(tex.value(0.0, 1.0, Vec3::ZERO), Vec3::X));
        assert!(approx(tex.value(1.0, 1.0, Vec3::ZERO), Vec3::Y));
        assert!(approx(tex.value(0.0, 0.0, Vec3::ZERO), Vec3::Z));
        assert!(approx(tex.value(1.0, 0.0, Vec3::ZERO), Vec3::ONE));

        // Outside [0, 1] clamps to the edge.
        assert!(approx(tex.value(5.0, -3.0, Vec3::ZERO), Vec3::ONE));
    }

    #[test]
    fn test_image_texture_rejects_bad_buffer() {
        let err = ImageTexture::from_rgb8(2, 2, &[0; 5], "bad").unwrap_err();
        assert!(matches!(err, TextureError::InvalidDimensions { len: 5, .. }));
    }

    #[test]
    fn test_image_texture_never_has_zero_size() {
        assert!(ImageTexture::from_rgb8(0, 4, &[], "empty").is_err());
        assert!(ImageTexture::from_rgb8(4, 0, &[], "empty").is_err());

        let tex = ImageTexture::solid(Vec3::Y);
        assert_eq!((tex.width(), tex.height()), (1, 1));
        // Any coordinate lands on the single texel
        assert_eq!(tex.value(1.0, 0.0, Vec3::ZERO), Vec3::Y);
        assert_eq!(tex.value(-2.0, 7.0, Vec3::ZERO), Vec3::Y);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tex = ImageTexture::load_or_fallback("/definitely/not/here.png");
        assert_eq!(tex.value(0.5, 0.5, Vec3::ZERO), FALLBACK_COLOR);

        let mut cache = TextureCache::new();
        assert!(cache.load("/definitely/not/here.png").is_err());
        let fallback = cache.load_or_fallback("/definitely/not/here.png");
        assert_eq!(fallback.value(0.0, 0.0, Vec3::ZERO), FALLBACK_COLOR);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
