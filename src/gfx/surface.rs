//! Raw drawing surfaces backing the frame buffer

use super::pixel::{PixelFormat, Rgba};
use super::texture::{Texture, check_dimensions};
use crate::error::RenderError;

/// Destination rectangle in surface pixels; may extend past the edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Texture-sized rectangle at (x, y)
    pub fn at(x: i32, y: i32, texture: &Texture) -> Self {
        Self::new(x, y, texture.width(), texture.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel storage in a concrete byte format
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, format: PixelFormat, fill: Rgba) -> Result<Self, RenderError> {
        check_dimensions(width, height)?;
        let mut surface = Self {
            width,
            height,
            format,
            data: vec![0; (width * height) as usize * format.bytes_per_pixel()],
        };
        surface.clear(fill);
        Ok(surface)
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

    /// Encoded bytes, row-major without padding
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Byte size of a surface with these parameters
    pub fn byte_len(width: u32, height: u32, format: PixelFormat) -> usize {
        (width as usize) * (height as usize) * format.bytes_per_pixel()
    }

    pub fn clear(&mut self, color: Rgba) {
        let bpp = self.format.bytes_per_pixel();
        let mut encoded = [0u8; 4];
        self.format.encode(color, &mut encoded);
        for chunk in self.data.chunks_exact_mut(bpp) {
            chunk.copy_from_slice(&encoded[..bpp]);
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.bytes_per_pixel()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(self.format.decode(&self.data[i..]))
    }

    pub fn put(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.format.encode(color, &mut self.data[i..]);
        }
    }

    /// All pixels decoded to RGBA
    pub fn pixels(&self) -> Vec<Rgba> {
        self.format.decode_all(&self.data)
    }

    /// Draw `texture` scaled into `dest` with source-over blending.
    ///
    /// Parts of `dest` outside the surface are clipped.
    pub fn blit(&mut self, texture: &Texture, dest: Rect) {
        if dest.is_empty() {
            return;
        }
        let x0 = dest.x.max(0) as i64;
        let y0 = dest.y.max(0) as i64;
        let x1 = (dest.x as i64 + dest.width as i64).min(self.width as i64);
        let y1 = (dest.y as i64 + dest.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let (tw, th) = texture.size();
        let opaque_target = !self.format.has_alpha();
        for y in y0..y1 {
            // Nearest source row for this destination row
            let sy = ((y - dest.y as i64) * th as i64 / dest.height as i64) as u32;
            for x in x0..x1 {
                let sx = ((x - dest.x as i64) * tw as i64 / dest.width as i64) as u32;
                let Some(src) = texture.get(sx, sy) else {
                    continue;
                };
                let (x, y) = (x as u32, y as u32);
                let blended = match src.a {
                    255 => src,
                    0 => continue,
                    _ => {
                        let mut out = src.over(self.get(x, y).unwrap_or_default());
                        if opaque_target {
                            out.a = 255;
                        }
                        out
                    }
                };
                self.put(x, y, blended);
            }
        }
    }

    /// Overwrite with another surface of the same size and format
    pub fn copy_from(&mut self, other: &Surface) -> Result<(), RenderError> {
        if self.size() != other.size() || self.format != other.format {
            return Err(RenderError::BufferSize {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// Whether every pixel survives conversion to `format`
    pub fn converts_losslessly(&self, format: PixelFormat) -> bool {
        format.has_alpha() || !self.format.has_alpha() || self.pixels().iter().all(|p| format.represents(*p))
    }

    /// Re-encode in `format`, or clear to `background` when pixels would be lost.
    ///
    /// Returns the new surface and whether the contents were kept.
    pub fn converted(&self, format: PixelFormat, background: Rgba) -> (Surface, bool) {
        if format == self.format {
            return (self.clone(), true);
        }
        if self.converts_losslessly(format) {
            let data = format.encode_all(&self.pixels());
            let surface = Surface {
                width: self.width,
                height: self.height,
                format,
                data,
            };
            return (surface, true);
        }
        let mut surface = Surface {
            width: self.width,
            height: self.height,
            format,
            data: vec![0; Self::byte_len(self.width, self.height, format)],
        };
        surface.clear(background);
        (surface, false)
    }
}
