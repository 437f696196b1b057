//! Low-resolution RGBA frames fed to the estimator

use crate::error::FrameError;

/// Bytes per RGBA sample
const CHANNELS: usize = 4;

/// Immutable row-major RGBA frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, checking the length against the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty);
        }
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::BufferLength {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame of a single colour
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, FrameError> {
        let data = rgba.repeat(width as usize * height as usize);
        Self::from_rgba(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Samples as `[r, g, b, a]`, row-major
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.data)
    }

    /// One row of samples
    pub fn row(&self, y: u32) -> &[[u8; 4]] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels()[start..start + w]
    }

    /// Paint an axis-aligned rectangle (clipped to the frame), consuming self
    pub fn with_rect(mut self, x: u32, y: u32, w: u32, h: u32, rgba: [u8; 4]) -> Self {
        let x_end = x.saturating_add(w).min(self.width);
        let y_end = y.saturating_add(h).min(self.height);
        let width = self.width as usize;
        let pixels: &mut [[u8; 4]] = bytemuck::cast_slice_mut(&mut self.data);
        for py in y.min(y_end)..y_end {
            for px in x.min(x_end)..x_end {
                pixels[py as usize * width + px as usize] = rgba;
            }
        }
        self
    }
}

/// Mean of the colour channels (alpha ignored)
#[inline]
pub fn luma(px: [u8; 4]) -> f32 {
    (px[0] as f32 + px[1] as f32 + px[2] as f32) / 3.0
}
