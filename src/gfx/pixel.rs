//! Pixel type and surface byte formats

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA color, 8 bits per channel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);
    /// Marker color of the missing-texture checkerboard
    pub const MISSING: Rgba = Rgba::opaque(163, 73, 164);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_f32(self) -> [f32; 4] {
        [self.r as f32, self.g as f32, self.b as f32, self.a as f32]
    }

    /// Round and saturate float channels back to bytes
    #[inline]
    pub fn from_f32(c: [f32; 4]) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(c[0]), q(c[1]), q(c[2]), q(c[3]))
    }

    /// Source-over compositing onto `dst`
    #[inline]
    pub fn over(self, dst: Rgba) -> Rgba {
        match self.a {
            255 => self,
            0 => dst,
            a => {
                let alpha = a as u16;
                Rgba::new(
                    blend_channel(self.r, dst.r, alpha),
                    blend_channel(self.g, dst.g, alpha),
                    blend_channel(self.b, dst.b, alpha),
                    blend_channel(255, dst.a, alpha),
                )
            }
        }
    }
}

/// Alpha blend one channel: (src * a + dst * (255 - a)) / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Byte layout of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    /// Typical VRAM layout
    Bgra8,
    /// Opaque 24-bit
    Rgb8,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }

    #[inline]
    pub const fn has_alpha(self) -> bool {
        !matches!(self, PixelFormat::Rgb8)
    }

    /// Whether `pixel` survives a round trip through this format
    #[inline]
    pub fn represents(self, pixel: Rgba) -> bool {
        self.has_alpha() || pixel.a == 255
    }

    #[inline]
    pub fn encode(self, pixel: Rgba, out: &mut [u8]) {
        match self {
            PixelFormat::Rgba8 => out[..4].copy_from_slice(&pixel.to_array()),
            PixelFormat::Bgra8 => out[..4].copy_from_slice(&[pixel.b, pixel.g, pixel.r, pixel.a]),
            PixelFormat::Rgb8 => out[..3].copy_from_slice(&[pixel.r, pixel.g, pixel.b]),
        }
    }

    #[inline]
    pub fn decode(self, bytes: &[u8]) -> Rgba {
        match self {
            PixelFormat::Rgba8 => Rgba::new(bytes[0], bytes[1], bytes[2], bytes[3]),
            PixelFormat::Bgra8 => Rgba::new(bytes[2], bytes[1], bytes[0], bytes[3]),
            PixelFormat::Rgb8 => Rgba::opaque(bytes[0], bytes[1], bytes[2]),
        }
    }

    /// Encode a pixel slice into a new byte buffer
    pub fn encode_all(self, pixels: &[Rgba]) -> Vec<u8> {
        if self == PixelFormat::Rgba8 {
            return bytemuck::cast_slice(pixels).to_vec();
        }
        let bpp = self.bytes_per_pixel();
        let mut out = vec![0; pixels.len() * bpp];
        for (chunk, p) in out.chunks_exact_mut(bpp).zip(pixels) {
            self.encode(*p, chunk);
        }
        out
    }

    /// Decode a byte buffer; trailing partial pixels are ignored
    pub fn decode_all(self, bytes: &[u8]) -> Vec<Rgba> {
        bytes
            .chunks_exact(self.bytes_per_pixel())
            .map(|chunk| self.decode(chunk))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_round_trip() {
        let p = Rgba::new(10, 20, 30, 40);
        for format in [PixelFormat::Rgba8, PixelFormat::Bgra8] {
            let bytes = format.encode_all(&[p, Rgba::WHITE]);
            assert_eq!(format.decode_all(&bytes), vec![p, Rgba::WHITE]);
        }
        let mut bgra = [0; 4];
        PixelFormat::Bgra8.encode(p, &mut bgra);
        assert_eq!(bgra, [30, 20, 10, 40]);
    }

    #[test]
    fn test_rgb8_drops_alpha() {
        let translucent = Rgba::new(10, 20, 30, 40);
        assert!(!PixelFormat::Rgb8.represents(translucent));
        assert!(PixelFormat::Rgb8.represents(Rgba::MISSING));
        let bytes = PixelFormat::Rgb8.encode_all(&[translucent]);
        assert_eq!(bytes.len(), 3);
        assert_eq!(PixelFormat::Rgb8.decode_all(&bytes), vec![Rgba::opaque(10, 20, 30)]);
    }

    #[test]
    fn test_over_blending() {
        assert_eq!(Rgba::WHITE.over(Rgba::BLACK), Rgba::WHITE);
        assert_eq!(Rgba::TRANSPARENT.over(Rgba::MISSING), Rgba::MISSING);
        let half = Rgba::new(255, 255, 255, 128).over(Rgba::BLACK);
        assert!((127..=129).contains(&half.r));
        assert_eq!(half.a, 255);
    }

    #[test]
    fn test_from_f32_saturates() {
        assert_eq!(Rgba::from_f32([-4.0, 300.0, 127.5, 0.4]), Rgba::new(0, 255, 128, 0));
    }
}
