//! Convolution kernels and border handling

use serde::{Deserialize, Serialize};

use super::pixel::Rgba;
use crate::error::RenderError;

/// How samples outside the texture are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderPolicy {
    /// Repeat the nearest edge pixel
    #[default]
    Clamp,
    /// Tile the texture
    Wrap,
    /// Missing samples contribute nothing
    Transparent,
    /// Only emit pixels whose whole window is inside; shrinks the output
    Crop,
}

/// Square convolution kernel with odd edge length, row-major weights
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, RenderError> {
        if size == 0 || size % 2 == 0 {
            return Err(RenderError::InvalidKernel(format!(
                "edge length must be odd, got {size}"
            )));
        }
        if weights.len() != size * size {
            return Err(RenderError::InvalidKernel(format!(
                "{size}x{size} kernel needs {} weights, got {}",
                size * size,
                weights.len()
            )));
        }
        if !weights.iter().all(|w| w.is_finite()) {
            return Err(RenderError::InvalidKernel("non-finite weight".into()));
        }
        Ok(Self { size, weights })
    }

    fn filled(size: usize, value: f32) -> Result<Self, RenderError> {
        Self::new(size, vec![value; size.saturating_mul(size)])
    }

    /// Center weight 1, everything else 0
    pub fn identity(size: usize) -> Result<Self, RenderError> {
        let mut kernel = Self::filled(size, 0.0)?;
        let center = kernel.weights.len() / 2;
        kernel.weights[center] = 1.0;
        Ok(kernel)
    }

    /// Box blur scaled by `factor` (1.0 keeps brightness)
    pub fn average(size: usize, factor: f32) -> Result<Self, RenderError> {
        Self::filled(size, factor / (size * size) as f32)
    }

    /// Normalized 2D gaussian blur
    pub fn gaussian(size: usize, sigma: f32) -> Result<Self, RenderError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(RenderError::InvalidKernel(format!(
                "gaussian sigma must be positive, got {sigma}"
            )));
        }
        let mut kernel = Self::filled(size, 0.0)?;
        let r = (size / 2) as i32;
        let two_sigma_sq = 2.0 * sigma * sigma;
        for y in -r..=r {
            for x in -r..=r {
                let i = ((y + r) as usize) * size + (x + r) as usize;
                kernel.weights[i] = (-((x * x + y * y) as f32) / two_sigma_sq).exp();
            }
        }
        let total: f32 = kernel.weights.iter().sum();
        kernel.weights.iter_mut().for_each(|w| *w /= total);
        Ok(kernel)
    }

    /// Every neighbor weighs -1, the center weighs `factor`
    pub fn sharpen(size: usize, factor: f32) -> Result<Self, RenderError> {
        let mut kernel = Self::filled(size, -1.0)?;
        let center = kernel.weights.len() / 2;
        kernel.weights[center] = factor;
        Ok(kernel)
    }

    /// Edge detection: sharpen whose weights sum to zero
    pub fn stroke(size: usize) -> Result<Self, RenderError> {
        Self::sharpen(size, (size * size) as f32 - 1.0)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

/// Convolve `src` (`width` x `height`) into `out`, returning the output size
pub(crate) fn convolve_into(
    src: &[Rgba],
    width: u32,
    height: u32,
    kernel: &Kernel,
    border: BorderPolicy,
    out: &mut Vec<Rgba>,
) -> Result<(u32, u32), RenderError> {
    let size = kernel.size as i64;
    let r = kernel.radius() as i64;
    let (w, h) = (width as i64, height as i64);

    let (out_w, out_h, offset) = match border {
        BorderPolicy::Crop => {
            if w < size || h < size {
                return Err(RenderError::InvalidKernel(format!(
                    "{size}x{size} kernel does not fit a {width}x{height} texture"
                )));
            }
            (w - size + 1, h - size + 1, r)
        }
        _ => (w, h, 0),
    };

    out.clear();
    out.reserve((out_w * out_h) as usize);
    for oy in 0..out_h {
        for ox in 0..out_w {
            let (cx, cy) = (ox + offset, oy + offset);
            let mut acc = [0.0f32; 4];
            for ky in 0..size {
                for kx in 0..size {
                    let weight = kernel.weights[(ky * size + kx) as usize];
                    if weight == 0.0 {
                        continue;
                    }
                    let Some(p) = sample(src, w, h, cx + kx - r, cy + ky - r, border) else {
                        continue;
                    };
                    for (a, c) in acc.iter_mut().zip(p.to_f32()) {
                        *a += weight * c;
                    }
                }
            }
            out.push(Rgba::from_f32(acc));
        }
    }
    Ok((out_w as u32, out_h as u32))
}

#[inline]
fn sample(src: &[Rgba], w: i64, h: i64, x: i64, y: i64, border: BorderPolicy) -> Option<Rgba> {
    let (x, y) = if (0..w).contains(&x) && (0..h).contains(&y) {
        (x, y)
    } else {
        match border {
            BorderPolicy::Clamp => (x.clamp(0, w - 1), y.clamp(0, h - 1)),
            BorderPolicy::Wrap => (x.rem_euclid(w), y.rem_euclid(h)),
            // Crop never reads outside
            BorderPolicy::Transparent | BorderPolicy::Crop => return None,
        }
    };
    src.get((y * w + x) as usize).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> Vec<Rgba> {
        (0..w * h)
            .map(|i| Rgba::new((i * 7 % 256) as u8, (i * 13 % 256) as u8, (i % 256) as u8, 255))
            .collect()
    }

    #[test]
    fn test_kernel_validation() {
        assert!(Kernel::new(2, vec![0.0; 4]).is_err());
        assert!(Kernel::new(3, vec![0.0; 8]).is_err());
        assert!(Kernel::new(1, vec![f32::NAN]).is_err());
        assert!(Kernel::gaussian(3, 0.0).is_err());
        assert!(Kernel::identity(0).is_err());
    }

    #[test]
    fn test_constructors() {
        let g = Kernel::gaussian(5, 1.2).unwrap();
        assert!((g.weights().iter().sum::<f32>() - 1.0).abs() < 1e-5);
        // Center is the largest weight
        let center = g.weights()[12];
        assert!(g.weights().iter().all(|w| *w <= center));

        let stroke = Kernel::stroke(3).unwrap();
        assert_eq!(stroke.weights().iter().sum::<f32>(), 0.0);
        assert_eq!(stroke.weights()[4], 8.0);

        let avg = Kernel::average(3, 1.0).unwrap();
        assert!((avg.weights()[0] - 1.0 / 9.0).abs() < 1e-7);
    }

    #[test]
    fn test_identity_reproduces_input() {
        let src = gradient(7, 5);
        let mut out = Vec::new();
        for border in [BorderPolicy::Clamp, BorderPolicy::Wrap, BorderPolicy::Transparent] {
            let dims = convolve_into(&src, 7, 5, &Kernel::identity(3).unwrap(), border, &mut out)
                .unwrap();
            assert_eq!(dims, (7, 5));
            assert_eq!(out, src);
        }
    }

    #[test]
    fn test_crop_shrinks_output() {
        let src = gradient(7, 5);
        let mut out = Vec::new();
        let dims = convolve_into(
            &src,
            7,
            5,
            &Kernel::identity(3).unwrap(),
            BorderPolicy::Crop,
            &mut out,
        )
        .unwrap();
        assert_eq!(dims, (5, 3));
        // Top-left output pixel is the source pixel at (1, 1)
        assert_eq!(out[0], src[7 + 1]);

        let big = Kernel::identity(7).unwrap();
        assert!(convolve_into(&src, 7, 5, &big, BorderPolicy::Crop, &mut out).is_err());
    }

    #[test]
    fn test_border_policies_differ_at_edges() {
        // 3x1 strip: black, black, white
        let src = vec![Rgba::BLACK, Rgba::BLACK, Rgba::WHITE];
        let blur = Kernel::new(3, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let mut out = Vec::new();

        // Kernel samples the left neighbor
        convolve_into(&src, 3, 1, &blur, BorderPolicy::Clamp, &mut out).unwrap();
        assert_eq!(out[0], Rgba::BLACK);
        convolve_into(&src, 3, 1, &blur, BorderPolicy::Wrap, &mut out).unwrap();
        assert_eq!(out[0], Rgba::WHITE);
        convolve_into(&src, 3, 1, &blur, BorderPolicy::Transparent, &mut out).unwrap();
        assert_eq!(out[0], Rgba::TRANSPARENT);
        assert_eq!(out[1], Rgba::BLACK);
    }
}
