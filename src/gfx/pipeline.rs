//! Chained texture operations with reusable scratch buffers

use glam::Affine2;

use super::affine::{Sampling, affine_into};
use super::kernel::{BorderPolicy, Kernel, convolve_into};
use super::pixel::Rgba;
use super::texture::{Texture, rotation_about_center};
use crate::error::RenderError;

/// One step of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum TextureOp {
    Convolve { kernel: Kernel, border: BorderPolicy },
    Affine { matrix: Affine2, sampling: Sampling },
    Rotate { radians: f32, sampling: Sampling },
}

/// Ordered list of texture ops.
///
/// Intermediate results ping-pong between two scratch buffers that persist
/// across calls; only the final result is allocated as a new texture.
#[derive(Debug, Clone, Default)]
pub struct TexturePipeline {
    ops: Vec<TextureOp>,
    front: Vec<Rgba>,
    back: Vec<Rgba>,
}

impl TexturePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convolve(mut self, kernel: Kernel, border: BorderPolicy) -> Self {
        self.ops.push(TextureOp::Convolve { kernel, border });
        self
    }

    pub fn affine(mut self, matrix: Affine2, sampling: Sampling) -> Self {
        self.ops.push(TextureOp::Affine { matrix, sampling });
        self
    }

    pub fn rotate(mut self, radians: f32, sampling: Sampling) -> Self {
        self.ops.push(TextureOp::Rotate { radians, sampling });
        self
    }

    pub fn push(&mut self, op: TextureOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[TextureOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Run every op in order; the input texture is left untouched
    pub fn apply(&mut self, texture: &Texture) -> Result<Texture, RenderError> {
        if self.ops.is_empty() {
            return Ok(texture.clone());
        }

        self.front.clear();
        self.front.extend_from_slice(texture.pixels());
        let (mut w, mut h) = texture.size();
        for op in &self.ops {
            let dims = match op {
                TextureOp::Convolve { kernel, border } => {
                    convolve_into(&self.front, w, h, kernel, *border, &mut self.back)?
                }
                TextureOp::Affine { matrix, sampling } => {
                    affine_into(&self.front, w, h, *matrix, *sampling, &mut self.back)?
                }
                TextureOp::Rotate { radians, sampling } => affine_into(
                    &self.front,
                    w,
                    h,
                    rotation_about_center((w, h), *radians),
                    *sampling,
                    &mut self.back,
                )?,
            };
            (w, h) = dims;
            std::mem::swap(&mut self.front, &mut self.back);
        }
        texture.derive(w, h, self.front.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::f32::consts::FRAC_PI_2;

    fn sprite() -> Texture {
        let pixels = (0..30u8)
            .map(|i| Rgba::new(i * 8, 100, 255 - i * 8, if i % 3 == 0 { 128 } else { 255 }))
            .collect();
        Texture::new(6, 5, pixels).unwrap()
    }

    #[test]
    fn test_matches_individual_ops() {
        let tex = sprite();
        let kernel = Kernel::gaussian(3, 0.8).unwrap();
        let mut pipeline = TexturePipeline::new()
            .convolve(kernel.clone(), BorderPolicy::Clamp)
            .rotate(FRAC_PI_2, Sampling::Nearest)
            .affine(Affine2::from_scale(Vec2::splat(2.0)), Sampling::Bilinear);

        let expected = tex
            .convolve(&kernel, BorderPolicy::Clamp)
            .and_then(|t| t.rotate(FRAC_PI_2, Sampling::Nearest))
            .and_then(|t| t.affine_transform(Affine2::from_scale(Vec2::splat(2.0)), Sampling::Bilinear))
            .unwrap();
        let first = pipeline.apply(&tex).unwrap();
        assert_eq!(first, expected);
        assert_eq!(first.size(), (10, 12));

        // Scratch reuse does not leak into the next run
        assert_eq!(pipeline.apply(&tex).unwrap(), expected);
        assert_eq!(tex, sprite());
    }

    #[test]
    fn test_empty_pipeline_shares_input() {
        let tex = sprite();
        let out = TexturePipeline::new().apply(&tex).unwrap();
        assert!(out.shares_pixels(&tex));
    }

    #[test]
    fn test_error_stops_the_chain() {
        let tex = sprite();
        let mut pipeline = TexturePipeline::new()
            .convolve(Kernel::identity(7).unwrap(), BorderPolicy::Crop)
            .rotate(1.0, Sampling::Bilinear);
        assert!(matches!(pipeline.apply(&tex), Err(RenderError::InvalidKernel(_))));
    }
}
