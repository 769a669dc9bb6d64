//! Affine resampling by inverse mapping

use glam::{Affine2, Vec2};
use serde::{Deserialize, Serialize};

use super::pixel::Rgba;
use super::texture::check_dimensions;
use crate::error::RenderError;

/// Resampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sampling {
    Nearest,
    #[default]
    Bilinear,
}

/// Determinants below this are treated as singular
const MIN_DETERMINANT: f32 = 1e-8;

/// Output extents snap down when within this much of a whole pixel
const EXTENT_SLACK: f32 = 1e-3;

/// Map `src` through `matrix` into `out`, returning the output size.
///
/// The output covers the bounding box of the transformed source rectangle;
/// each output pixel center is mapped back through the inverse and sampled.
pub(crate) fn affine_into(
    src: &[Rgba],
    width: u32,
    height: u32,
    matrix: Affine2,
    sampling: Sampling,
    out: &mut Vec<Rgba>,
) -> Result<(u32, u32), RenderError> {
    let det = matrix.matrix2.determinant();
    if !det.is_finite() || det.abs() < MIN_DETERMINANT || !matrix.translation.is_finite() {
        return Err(RenderError::SingularTransform(det));
    }
    let inverse = matrix.inverse();

    let (w, h) = (width as f32, height as f32);
    let corners = [Vec2::ZERO, Vec2::new(w, 0.0), Vec2::new(w, h), Vec2::new(0.0, h)]
        .map(|c| matrix.transform_point2(c));
    let min = corners.iter().copied().fold(Vec2::splat(f32::MAX), Vec2::min);
    let max = corners.iter().copied().fold(Vec2::splat(f32::MIN), Vec2::max);
    let extent = ((max - min) - EXTENT_SLACK).ceil().max(Vec2::ONE);
    let (out_w, out_h) = (extent.x as u32, extent.y as u32);
    check_dimensions(out_w, out_h)?;

    out.clear();
    out.reserve((out_w * out_h) as usize);
    for y in 0..out_h {
        for x in 0..out_w {
            let center = min + Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let p = inverse.transform_point2(center);
            out.push(match sampling {
                Sampling::Nearest => nearest(src, width, height, p),
                Sampling::Bilinear => bilinear(src, width, height, p),
            });
        }
    }
    Ok((out_w, out_h))
}

#[inline]
fn inside(width: u32, height: u32, p: Vec2) -> bool {
    p.x >= 0.0 && p.y >= 0.0 && p.x < width as f32 && p.y < height as f32
}

#[inline]
fn at(src: &[Rgba], width: u32, x: u32, y: u32) -> Rgba {
    src.get((y * width + x) as usize).copied().unwrap_or_default()
}

fn nearest(src: &[Rgba], width: u32, height: u32, p: Vec2) -> Rgba {
    if !inside(width, height, p) {
        return Rgba::TRANSPARENT;
    }
    at(src, width, p.x as u32, p.y as u32)
}

fn bilinear(src: &[Rgba], width: u32, height: u32, p: Vec2) -> Rgba {
    if !inside(width, height, p) {
        return Rgba::TRANSPARENT;
    }
    // Sample grid is at pixel centers; neighbors clamp to the edge
    let q = (p - 0.5).max(Vec2::ZERO);
    let (x0, y0) = (q.x.floor() as u32, q.y.floor() as u32);
    let (fx, fy) = (q.x - x0 as f32, q.y - y0 as f32);
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);

    let taps = [
        (at(src, width, x0, y0), (1.0 - fx) * (1.0 - fy)),
        (at(src, width, x1, y0), fx * (1.0 - fy)),
        (at(src, width, x0, y1), (1.0 - fx) * fy),
        (at(src, width, x1, y1), fx * fy),
    ];
    let mut acc = [0.0f32; 4];
    for (pixel, weight) in taps {
        for (a, c) in acc.iter_mut().zip(pixel.to_f32()) {
            *a += weight * c;
        }
    }
    Rgba::from_f32(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::Texture;
    use std::f32::consts::FRAC_PI_2;

    fn checker(w: u32, h: u32) -> Vec<Rgba> {
        (0..h)
            .flat_map(|y| (0..w).map(move |x| if (x + y) % 2 == 0 { Rgba::WHITE } else { Rgba::MISSING }))
            .collect()
    }

    #[test]
    fn test_identity_reproduces_input() {
        let src = checker(6, 4);
        let mut out = Vec::new();
        for sampling in [Sampling::Nearest, Sampling::Bilinear] {
            let dims = affine_into(&src, 6, 4, Affine2::IDENTITY, sampling, &mut out).unwrap();
            assert_eq!(dims, (6, 4));
            assert_eq!(out, src);
        }
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions() {
        let a = Rgba::opaque(255, 0, 0);
        let b = Rgba::opaque(0, 0, 255);
        let mut out = Vec::new();
        let dims = affine_into(
            &[a, b],
            2,
            1,
            Affine2::from_angle(FRAC_PI_2),
            Sampling::Nearest,
            &mut out,
        )
        .unwrap();
        assert_eq!(dims, (1, 2));
        assert_eq!(out, vec![a, b]);
    }

    #[test]
    fn test_scale_doubles_size() {
        let src = checker(3, 2);
        let mut out = Vec::new();
        let dims = affine_into(
            &src,
            3,
            2,
            Affine2::from_scale(Vec2::splat(2.0)),
            Sampling::Nearest,
            &mut out,
        )
        .unwrap();
        assert_eq!(dims, (6, 4));
        assert_eq!(out[0], src[0]);
        assert_eq!(out[1], src[0]);
        assert_eq!(out[2], src[1]);
    }

    #[test]
    fn test_oversized_output_rejected_before_allocating() {
        let mut out = Vec::new();
        let huge = Affine2::from_scale(Vec2::splat(40000.0));
        assert!(matches!(
            affine_into(&checker(1, 1), 1, 1, huge, Sampling::Nearest, &mut out),
            Err(RenderError::InvalidDimensions { width: 40000, height: 40000 })
        ));
        assert_eq!(out.capacity(), 0);

        let tex = Texture::filled(1, 1, Rgba::WHITE).unwrap();
        assert!(matches!(
            tex.affine_transform(huge, Sampling::Nearest),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let flat = Affine2::from_scale(Vec2::new(1.0, 0.0));
        let mut out = Vec::new();
        assert!(matches!(
            affine_into(&checker(2, 2), 2, 2, flat, Sampling::Bilinear, &mut out),
            Err(RenderError::SingularTransform(_))
        ));
    }
}
