//! Immutable, cheaply shared textures
//!
//! Every transform returns a new `Texture`; the pixel storage is an
//! `Arc<[Rgba]>` so clones are pointer copies.

use std::sync::Arc;

use glam::{Affine2, Vec2};

use super::affine::{Sampling, affine_into};
use super::kernel::{BorderPolicy, Kernel, convolve_into};
use super::pixel::{PixelFormat, Rgba};
use crate::error::RenderError;

/// Largest accepted edge length
const MAX_EDGE: u32 = 16384;

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    /// Layout the pixels were loaded from and are exported to by default
    format: PixelFormat,
    pixels: Arc<[Rgba]>,
}

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    Ok(())
}

impl Texture {
    pub fn new(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        let expected = (width * height) as usize;
        if pixels.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: pixels.into(),
        })
    }

    pub fn filled(width: u32, height: u32, color: Rgba) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        Self::new(width, height, vec![color; (width * height) as usize])
    }

    /// Decode raw bytes handed over by a resource loader
    pub fn from_bytes(
        width: u32,
        height: u32,
        format: PixelFormat,
        bytes: &[u8],
    ) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        let expected = (width * height) as usize * format.bytes_per_pixel();
        if bytes.len() != expected {
            return Err(RenderError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        let mut texture = Self::new(width, height, format.decode_all(bytes))?;
        texture.format = format;
        Ok(texture)
    }

    /// Encode in the texture's own format
    pub fn to_bytes(&self) -> Vec<u8> {
        self.format.encode_all(&self.pixels)
    }

    /// Zero-copy RGBA byte view
    pub fn as_rgba_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels[..])
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// Whether two textures share storage
    pub fn shares_pixels(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Build from pixels already known to match `width * height`
    pub(crate) fn from_raw(width: u32, height: u32, pixels: Vec<Rgba>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height) as usize);
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: pixels.into(),
        }
    }

    /// Rebuild with new pixels, keeping the format tag
    pub(crate) fn derive(&self, width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, RenderError> {
        let mut texture = Self::new(width, height, pixels)?;
        texture.format = self.format;
        Ok(texture)
    }

    /// Copy out a rectangular region
    pub fn sub_texture(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Texture, RenderError> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits || width == 0 || height == 0 {
            return Err(RenderError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for row in y..y + height {
            let start = (row * self.width + x) as usize;
            pixels.extend_from_slice(&self.pixels[start..start + width as usize]);
        }
        self.derive(width, height, pixels)
    }

    pub fn convolve(&self, kernel: &Kernel, border: BorderPolicy) -> Result<Texture, RenderError> {
        let mut out = Vec::new();
        let (w, h) = convolve_into(&self.pixels, self.width, self.height, kernel, border, &mut out)?;
        self.derive(w, h, out)
    }

    /// Resample through `matrix`; the result covers the transformed bounds
    pub fn affine_transform(&self, matrix: Affine2, sampling: Sampling) -> Result<Texture, RenderError> {
        let mut out = Vec::new();
        let (w, h) = affine_into(&self.pixels, self.width, self.height, matrix, sampling, &mut out)?;
        self.derive(w, h, out)
    }

    /// Rotate about the center (radians, counter-clockwise)
    pub fn rotate(&self, radians: f32, sampling: Sampling) -> Result<Texture, RenderError> {
        self.affine_transform(rotation_about_center(self.size(), radians), sampling)
    }

    /// Horizontal shear; `factor` is the x offset per row
    pub fn shear(&self, factor: f32, sampling: Sampling) -> Result<Texture, RenderError> {
        let matrix = Affine2::from_cols(Vec2::X, Vec2::new(factor, 1.0), Vec2::ZERO);
        self.affine_transform(matrix, sampling)
    }
}

/// Rotation that pivots on the texture center
pub(crate) fn rotation_about_center((width, height): (u32, u32), radians: f32) -> Affine2 {
    let center = Vec2::new(width as f32, height as f32) * 0.5;
    Affine2::from_translation(center)
        * Affine2::from_angle(radians)
        * Affine2::from_translation(-center)
}
