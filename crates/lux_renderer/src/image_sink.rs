//! Output of rendered images.
//!
//! The renderer produces linear radiance; a sink decides how it is
//! encoded. [`PpmSink`] writes gamma-corrected 8-bit plain-text PPM.

use std::io::{self, Write};

use crate::Color;

pub type SinkResult<T> = io::Result<T>;

/// Receives an image row by row, top row first.
pub trait ImageSink {
    fn begin(&mut self, width: u32, height: u32) -> SinkResult<()>;

    /// One row of linear radiance, left to right.
    fn write_row(&mut self, row: &[Color]) -> SinkResult<()>;

    fn finish(&mut self) -> SinkResult<()> {
        Ok(())
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Gamma-correct and quantize a color to 8 bits per channel.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let quantize = |c: f32| (256.0 * linear_to_gamma(c).clamp(0.0, 0.999)) as u8;
    [quantize(color.x), quantize(color.y), quantize(color.z)]
}

/// Plain-text `P3` PPM writer.
pub struct PpmSink<W: Write> {
    out: W,
}

impl<W: Write> PpmSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ImageSink for PpmSink<W> {
    fn begin(&mut self, width: u32, height: u32) -> SinkResult<()> {
        writeln!(self.out, "P3\n{} {}\n255", width, height)
    }

    fn write_row(&mut self, row: &[Color]) -> SinkResult<()> {
        for &color in row {
            let [r, g, b] = color_to_rgb8(color);
            writeln!(self.out, "{} {} {}", r, g, b)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.out.flush()
    }
}
