//! Closed-form intersection tests
//!
//! Cheap exact tests for the common bullet-hell pairs: circles against
//! circles, rectangles and convex polygons, plus box-box interval overlap.
//! Boundary contact counts as a hit in all of them.

use glam::Vec2;

use super::shape::{Aabb, polygon_contains};
use crate::rotate;

/// Contact manifold of an intersecting pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from shape A toward shape B
    pub normal: Vec2,
    /// Penetration depth along `normal` (0 when touching)
    pub depth: f32,
}

impl Contact {
    pub fn new(normal: Vec2, depth: f32) -> Self {
        Self { normal, depth }
    }

    /// Same contact seen from the other shape
    #[inline]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Circle vs circle: hit iff squared center distance ≤ (r1 + r2)²
pub fn circle_circle(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> Option<Contact> {
    let delta = c2 - c1;
    let radii = r1 + r2;
    let dist_sq = delta.length_squared();
    if dist_sq > radii * radii {
        return None;
    }
    let dist = dist_sq.sqrt();
    // Concentric circles have no preferred direction
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::X };
    Some(Contact::new(normal, radii - dist))
}

/// Axis-aligned box vs box interval overlap
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    let overlap_x = a.max.x.min(b.max.x) - a.min.x.max(b.min.x);
    let overlap_y = a.max.y.min(b.max.y) - a.min.y.max(b.min.y);
    if overlap_x < 0.0 || overlap_y < 0.0 {
        return None;
    }
    let delta = b.center() - a.center();
    let contact = if overlap_x <= overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        Contact::new(Vec2::new(sign, 0.0), overlap_x)
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        Contact::new(Vec2::new(0.0, sign), overlap_y)
    };
    Some(contact)
}

/// Circle (A) vs oriented rectangle (B), solved in the rectangle's frame
pub fn circle_rect(
    center: Vec2,
    radius: f32,
    rect_center: Vec2,
    half_extents: Vec2,
    rotation: f32,
) -> Option<Contact> {
    let local = rotate(center - rect_center, -rotation);
    let closest = local.clamp(-half_extents, half_extents);
    let diff = local - closest;
    let dist_sq = diff.length_squared();
    if dist_sq > radius * radius {
        return None;
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        // diff points from the rectangle to the circle
        let normal = rotate(-diff / dist, rotation);
        return Some(Contact::new(normal, radius - dist));
    }

    // Center inside the rectangle: push out through the nearest face
    let gap = half_extents - local.abs();
    let face = if gap.x <= gap.y {
        Vec2::new(local.x.signum(), 0.0)
    } else {
        Vec2::new(0.0, local.y.signum())
    };
    Some(Contact::new(rotate(-face, rotation), radius + gap.x.min(gap.y)))
}

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Circle (A) vs convex CCW polygon (B)
pub fn circle_polygon(center: Vec2, radius: f32, vertices: &[Vec2]) -> Option<Contact> {
    let n = vertices.len();

    if polygon_contains(vertices, center) {
        // Deepest-resolving face is the nearest edge line
        let mut best_gap = f32::MAX;
        let mut best_outward = Vec2::X;
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            let Some(outward) = (b - a).perp().try_normalize().map(|p| -p) else {
                continue;
            };
            let gap = (a - center).dot(outward);
            if gap < best_gap {
                best_gap = gap;
                best_outward = outward;
            }
        }
        return Some(Contact::new(-best_outward, radius + best_gap.max(0.0)));
    }

    let mut best = vertices[0];
    let mut best_dist_sq = f32::MAX;
    for i in 0..n {
        let p = closest_point_on_segment(vertices[i], vertices[(i + 1) % n], center);
        let d = p.distance_squared(center);
        if d < best_dist_sq {
            best_dist_sq = d;
            best = p;
        }
    }
    if best_dist_sq > radius * radius {
        return None;
    }
    let dist = best_dist_sq.sqrt();
    let normal = (best - center).try_normalize().unwrap_or(Vec2::X);
    Some(Contact::new(normal, radius - dist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn unit_square(size: f32) -> Vec<Vec2> {
        vec![
            Vec2::ZERO,
            Vec2::new(size, 0.0),
            Vec2::new(size, size),
            Vec2::new(0.0, size),
        ]
    }

    #[test]
    fn test_circle_circle_exactness() {
        assert!(circle_circle(Vec2::ZERO, 5.0, Vec2::new(8.0, 0.0), 4.0).is_some());
        assert!(circle_circle(Vec2::ZERO, 5.0, Vec2::new(11.0, 0.0), 4.0).is_none());
    }

    #[test]
    fn test_circle_circle_touching_counts() {
        let hit = circle_circle(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 4.0).unwrap();
        assert_eq!(hit.depth, 0.0);
        assert_eq!(hit.normal, Vec2::X);
    }

    #[test]
    fn test_concentric_circles() {
        let hit = circle_circle(Vec2::ONE, 2.0, Vec2::ONE, 1.0).unwrap();
        assert_eq!(hit.depth, 3.0);
        assert!((hit.normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_aabb_aabb_overlap_and_normal() {
        let a = Aabb::new(Vec2::ZERO, Vec2::new(4.0, 4.0));
        let b = Aabb::new(Vec2::new(3.0, 1.0), Vec2::new(7.0, 3.0));
        let hit = aabb_aabb(&a, &b).unwrap();
        assert_eq!(hit.normal, Vec2::X);
        assert_eq!(hit.depth, 1.0);

        let far = Aabb::new(Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0));
        assert!(aabb_aabb(&a, &far).is_none());

        let touching = Aabb::new(Vec2::new(4.0, 0.0), Vec2::new(5.0, 1.0));
        assert_eq!(aabb_aabb(&a, &touching).unwrap().depth, 0.0);
    }

    #[test]
    fn test_circle_rect_outside_and_corner() {
        // Circle to the right of the box
        let hit = circle_rect(Vec2::new(5.0, 0.0), 2.0, Vec2::ZERO, Vec2::new(4.0, 1.0), 0.0)
            .unwrap();
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-6);
        assert!((hit.depth - 1.0).abs() < 1e-6);

        // Near a corner but outside the radius
        assert!(
            circle_rect(Vec2::new(5.5, 2.5), 2.0, Vec2::ZERO, Vec2::new(4.0, 1.0), 0.0).is_none()
        );
    }

    #[test]
    fn test_circle_rect_rotated() {
        // Box rotated 90°: long axis is now vertical
        let hit = circle_rect(Vec2::new(0.0, 4.5), 1.0, Vec2::ZERO, Vec2::new(4.0, 1.0), PI / 2.0);
        assert!(hit.is_some());
        let miss = circle_rect(Vec2::new(2.5, 0.0), 1.0, Vec2::ZERO, Vec2::new(4.0, 1.0), PI / 2.0);
        assert!(miss.is_none());
    }

    #[test]
    fn test_circle_center_inside_rect() {
        let hit = circle_rect(Vec2::new(3.5, 0.0), 1.0, Vec2::ZERO, Vec2::new(4.0, 2.0), 0.0)
            .unwrap();
        // Nearest face is +x; B lies toward -x from the circle's point of view
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-6);
        assert!((hit.depth - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_circle_tangent_to_polygon_edge() {
        let sq = unit_square(4.0);
        let hit = circle_polygon(Vec2::new(6.0, 2.0), 2.0, &sq).unwrap();
        assert_eq!(hit.depth, 0.0);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < 1e-6);
        assert!(circle_polygon(Vec2::new(6.01, 2.0), 2.0, &sq).is_none());
    }

    #[test]
    fn test_circle_inside_polygon() {
        let sq = unit_square(4.0);
        let hit = circle_polygon(Vec2::new(2.0, 0.5), 1.0, &sq).unwrap();
        // Nearest edge is the bottom one; B lies "up" from the escaping circle
        assert!((hit.normal - Vec2::Y).length() < 1e-6);
        assert!((hit.depth - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_closest_point_on_degenerate_segment() {
        assert_eq!(closest_point_on_segment(Vec2::ONE, Vec2::ONE, Vec2::ZERO), Vec2::ONE);
    }
}
