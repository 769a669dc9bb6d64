//! Shape model: immutable primitives with a uniform support function
//!
//! Every convex shape can answer "which of your points lies farthest along
//! this direction". That single query drives GJK; SAT and the closed forms
//! use the concrete geometry.

use std::borrow::Cow;
use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CollideError;
use crate::{is_finite, normalize_angle, rotate};

/// Variant tag of a shape, used as the key of the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    ConvexPolygon,
    /// User-defined shape, keyed by its tag
    Custom(u32),
}

/// Axis-aligned bounding box (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Smallest box holding all points (None for an empty iterator)
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Interval overlap on both axes; touching boxes overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True if `other` lies entirely inside this box
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// World placement of a collidable: scale, then rotate, then translate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec2,
    /// Radians, counter-clockwise
    pub rotation: f32,
    /// Uniform scale (keeps circles circular)
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec2::ZERO,
        rotation: 0.0,
        scale: 1.0,
    };

    pub fn new(translation: Vec2, rotation: f32) -> Self {
        Self {
            translation,
            rotation,
            scale: 1.0,
        }
    }

    /// Pure translation
    pub fn at(translation: Vec2) -> Self {
        Self::new(translation, 0.0)
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    #[inline]
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.translation + self.apply_vector(p)
    }

    /// Apply rotation and scale only
    #[inline]
    pub fn apply_vector(&self, v: Vec2) -> Vec2 {
        if self.rotation == 0.0 {
            v * self.scale
        } else {
            rotate(v * self.scale, self.rotation)
        }
    }

    pub fn validate(&self) -> Result<(), CollideError> {
        if !is_finite(self.translation) || !self.rotation.is_finite() {
            return Err(CollideError::DegenerateShape(format!(
                "non-finite transform {:?}",
                self
            )));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CollideError::DegenerateShape(format!(
                "transform scale must be positive, got {}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Convex polygon with counter-clockwise winding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvexPolygon {
    vertices: Vec<Vec2>,
}

impl ConvexPolygon {
    /// Build a polygon; clockwise input is reversed to CCW
    ///
    /// Convexity is not checked here (see [`ConvexPolygon::is_convex`]).
    pub fn new(mut vertices: Vec<Vec2>) -> Result<Self, CollideError> {
        if vertices.len() < 3 {
            return Err(CollideError::DegenerateShape(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if !vertices.iter().all(|v| is_finite(*v)) {
            return Err(CollideError::DegenerateShape(
                "polygon has non-finite vertices".into(),
            ));
        }
        let area = signed_area(&vertices);
        if area.abs() <= f32::EPSILON {
            return Err(CollideError::DegenerateShape("polygon has zero area".into()));
        }
        if area < 0.0 {
            vertices.reverse();
        }
        Ok(Self { vertices })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Debug check: every turn is a left turn (collinear runs allowed)
    pub fn is_convex(&self) -> bool {
        let n = self.vertices.len();
        (0..n).all(|i| {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let c = self.vertices[(i + 2) % n];
            (b - a).perp_dot(c - b) >= -1e-4
        })
    }

    /// Area-weighted centroid
    pub fn centroid(&self) -> Vec2 {
        let n = self.vertices.len();
        let mut area = 0.0;
        let mut acc = Vec2::ZERO;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            let cross = p.perp_dot(q);
            area += cross;
            acc += (p + q) * cross;
        }
        if area.abs() <= f32::EPSILON {
            // Fall back to the vertex average
            return self.vertices.iter().copied().sum::<Vec2>() / n as f32;
        }
        acc / (3.0 * area)
    }

    fn transformed(&self, t: &Transform) -> ConvexPolygon {
        ConvexPolygon {
            vertices: self.vertices.iter().map(|v| t.apply(*v)).collect(),
        }
    }
}

/// Twice the signed area; positive for CCW loops
fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    (0..n)
        .map(|i| vertices[i].perp_dot(vertices[(i + 1) % n]))
        .sum::<f32>()
}

/// Opaque user shape: a tag plus free-form points (e.g. a laser polyline)
///
/// Custom shapes expose no support function; pairs involving them are only
/// resolved by a registered pair handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomShape {
    pub tag: u32,
    pub points: Vec<Vec2>,
    bounds: Aabb,
}

impl CustomShape {
    pub fn new(tag: u32, points: Vec<Vec2>) -> Result<Self, CollideError> {
        if !points.iter().all(|p| is_finite(*p)) {
            return Err(CollideError::DegenerateShape(
                "custom shape has non-finite points".into(),
            ));
        }
        let bounds = Aabb::from_points(points.iter().copied()).ok_or_else(|| {
            CollideError::DegenerateShape("custom shape needs at least one point".into())
        })?;
        Ok(Self {
            tag,
            points,
            bounds,
        })
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }
}

/// Closed set of collision shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        center: Vec2,
        radius: f32,
    },
    /// Oriented rectangle; `rotation == 0` is the axis-aligned fast path
    Rectangle {
        center: Vec2,
        half_extents: Vec2,
        rotation: f32,
    },
    ConvexPolygon(ConvexPolygon),
    Custom(CustomShape),
}

impl Shape {
    pub fn circle(center: Vec2, radius: f32) -> Result<Self, CollideError> {
        let shape = Shape::Circle { center, radius };
        shape.validate()?;
        Ok(shape)
    }

    pub fn rect(center: Vec2, half_extents: Vec2, rotation: f32) -> Result<Self, CollideError> {
        let shape = Shape::Rectangle {
            center,
            half_extents,
            rotation,
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Axis-aligned rectangle from its corners
    pub fn from_corners(min: Vec2, max: Vec2) -> Result<Self, CollideError> {
        let b = Aabb::new(min, max);
        Self::rect(b.center(), b.half_extents(), 0.0)
    }

    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, CollideError> {
        Ok(Shape::ConvexPolygon(ConvexPolygon::new(vertices)?))
    }

    pub fn custom(tag: u32, points: Vec<Vec2>) -> Result<Self, CollideError> {
        Ok(Shape::Custom(CustomShape::new(tag, points)?))
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::ConvexPolygon(_) => ShapeKind::ConvexPolygon,
            Shape::Custom(c) => ShapeKind::Custom(c.tag),
        }
    }

    /// Reject shapes that cannot take part in collision
    pub fn validate(&self) -> Result<(), CollideError> {
        match self {
            Shape::Circle { center, radius } => {
                if !is_finite(*center) || !(radius.is_finite() && *radius > 0.0) {
                    return Err(CollideError::DegenerateShape(format!(
                        "circle radius must be positive and finite, got {radius}"
                    )));
                }
            }
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => {
                if !is_finite(*center) || !rotation.is_finite() {
                    return Err(CollideError::DegenerateShape(
                        "rectangle has non-finite placement".into(),
                    ));
                }
                if !(is_finite(*half_extents) && half_extents.x > 0.0 && half_extents.y > 0.0) {
                    return Err(CollideError::DegenerateShape(format!(
                        "rectangle half extents must be positive, got {half_extents}"
                    )));
                }
            }
            // Both validate on construction; re-check the vertex count for hand-built values
            Shape::ConvexPolygon(p) => {
                if p.vertices.len() < 3 {
                    return Err(CollideError::DegenerateShape(format!(
                        "polygon needs at least 3 vertices, got {}",
                        p.vertices.len()
                    )));
                }
            }
            Shape::Custom(c) => {
                if c.points.is_empty() {
                    return Err(CollideError::DegenerateShape(
                        "custom shape needs at least one point".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Rectangle with no effective rotation (multiples of 90°)
    pub fn is_axis_aligned(&self) -> bool {
        match self {
            Shape::Rectangle { rotation, .. } => {
                let r = rotation.rem_euclid(FRAC_PI_2);
                r < 1e-6 || FRAC_PI_2 - r < 1e-6
            }
            _ => false,
        }
    }

    /// Whether the shape can answer support queries (required by GJK/SAT)
    pub fn has_support(&self) -> bool {
        !matches!(self, Shape::Custom(_))
    }

    /// Farthest point along `direction`, or None for custom shapes
    pub fn support(&self, direction: Vec2) -> Option<Vec2> {
        match self {
            Shape::Circle { center, radius } => {
                let dir = direction.try_normalize().unwrap_or(Vec2::X);
                Some(*center + dir * *radius)
            }
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => {
                let local = rotate(direction, -*rotation);
                let corner = Vec2::new(
                    if local.x >= 0.0 { half_extents.x } else { -half_extents.x },
                    if local.y >= 0.0 { half_extents.y } else { -half_extents.y },
                );
                Some(*center + rotate(corner, *rotation))
            }
            Shape::ConvexPolygon(p) => Some(polygon_support(p.vertices(), direction)),
            Shape::Custom(_) => None,
        }
    }

    pub fn centroid(&self) -> Vec2 {
        match self {
            Shape::Circle { center, .. } | Shape::Rectangle { center, .. } => *center,
            Shape::ConvexPolygon(p) => p.centroid(),
            Shape::Custom(c) => c.bounds.center(),
        }
    }

    /// Cheap bounding box for broad-phase rejection
    pub fn aabb(&self) -> Aabb {
        match self {
            Shape::Circle { center, radius } => {
                Aabb::from_center_half_extents(*center, Vec2::splat(*radius))
            }
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => {
                let (sin, cos) = rotation.sin_cos();
                let extent = Vec2::new(
                    half_extents.x * cos.abs() + half_extents.y * sin.abs(),
                    half_extents.x * sin.abs() + half_extents.y * cos.abs(),
                );
                Aabb::from_center_half_extents(*center, extent)
            }
            Shape::ConvexPolygon(p) => Aabb::from_points(p.vertices().iter().copied())
                .unwrap_or_else(|| Aabb::new(Vec2::ZERO, Vec2::ZERO)),
            Shape::Custom(c) => c.bounds,
        }
    }

    /// Bounding circle as (center, radius)
    pub fn bounding_circle(&self) -> (Vec2, f32) {
        match self {
            Shape::Circle { center, radius } => (*center, *radius),
            Shape::Rectangle {
                center,
                half_extents,
                ..
            } => (*center, half_extents.length()),
            Shape::ConvexPolygon(p) => {
                let c = p.centroid();
                let r = p
                    .vertices()
                    .iter()
                    .map(|v| v.distance(c))
                    .fold(0.0, f32::max);
                (c, r)
            }
            Shape::Custom(c) => (c.bounds.center(), c.bounds.half_extents().length()),
        }
    }

    /// Point containment (boundary included); None for custom shapes
    pub fn contains_point(&self, p: Vec2) -> Option<bool> {
        match self {
            Shape::Circle { center, radius } => Some(p.distance_squared(*center) <= radius * radius),
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => {
                let local = rotate(p - *center, -*rotation).abs();
                Some(local.x <= half_extents.x && local.y <= half_extents.y)
            }
            Shape::ConvexPolygon(poly) => Some(polygon_contains(poly.vertices(), p)),
            Shape::Custom(_) => None,
        }
    }

    /// Vertex loop (CCW) for polygon-like shapes
    pub fn polygon_vertices(&self) -> Option<Cow<'_, [Vec2]>> {
        match self {
            Shape::Rectangle { .. } => self.rect_corners().map(|c| Cow::Owned(c.to_vec())),
            Shape::ConvexPolygon(p) => Some(Cow::Borrowed(p.vertices())),
            Shape::Circle { .. } | Shape::Custom(_) => None,
        }
    }

    /// Rectangle corners, CCW starting at the local (-x, -y) corner
    pub fn rect_corners(&self) -> Option<[Vec2; 4]> {
        match self {
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => {
                let h = *half_extents;
                Some(
                    [
                        Vec2::new(-h.x, -h.y),
                        Vec2::new(h.x, -h.y),
                        Vec2::new(h.x, h.y),
                        Vec2::new(-h.x, h.y),
                    ]
                    .map(|c| *center + rotate(c, *rotation)),
                )
            }
            _ => None,
        }
    }

    /// Map a local-space shape into world space
    pub fn transformed(&self, t: &Transform) -> Shape {
        match self {
            Shape::Circle { center, radius } => Shape::Circle {
                center: t.apply(*center),
                radius: radius * t.scale,
            },
            Shape::Rectangle {
                center,
                half_extents,
                rotation,
            } => Shape::Rectangle {
                center: t.apply(*center),
                half_extents: *half_extents * t.scale,
                rotation: normalize_angle(rotation + t.rotation),
            },
            Shape::ConvexPolygon(p) => Shape::ConvexPolygon(p.transformed(t)),
            Shape::Custom(c) => {
                let points: Vec<Vec2> = c.points.iter().map(|p| t.apply(*p)).collect();
                let bounds = Aabb::from_points(points.iter().copied()).unwrap_or(c.bounds);
                Shape::Custom(CustomShape {
                    tag: c.tag,
                    points,
                    bounds,
                })
            }
        }
    }
}

/// Vertex with the largest projection on `direction` (first wins ties)
pub(crate) fn polygon_support(vertices: &[Vec2], direction: Vec2) -> Vec2 {
    let mut best = vertices[0];
    let mut best_dot = best.dot(direction);
    for v in &vertices[1..] {
        let d = v.dot(direction);
        if d > best_dot {
            best_dot = d;
            best = *v;
        }
    }
    best
}

/// Inclusive point-in-convex-polygon test for CCW loops
pub(crate) fn polygon_contains(vertices: &[Vec2], p: Vec2) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        (b - a).perp_dot(p - a) >= 0.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn square(min: Vec2, size: f32) -> Shape {
        Shape::polygon(vec![
            min,
            min + Vec2::new(size, 0.0),
            min + Vec2::new(size, size),
            min + Vec2::new(0.0, size),
        ])
        .unwrap()
    }

    #[test]
    fn test_degenerate_shapes_rejected() {
        assert!(Shape::circle(Vec2::ZERO, 0.0).is_err());
        assert!(Shape::circle(Vec2::ZERO, -1.0).is_err());
        assert!(Shape::circle(Vec2::ZERO, f32::NAN).is_err());
        assert!(Shape::rect(Vec2::ZERO, Vec2::new(1.0, 0.0), 0.0).is_err());
        assert!(Shape::polygon(vec![Vec2::ZERO, Vec2::X]).is_err());
        // Collinear points have no area
        assert!(Shape::polygon(vec![Vec2::ZERO, Vec2::X, Vec2::new(2.0, 0.0)]).is_err());
        assert!(Shape::custom(7, vec![]).is_err());
    }

    #[test]
    fn test_clockwise_polygon_is_reversed() {
        let cw = ConvexPolygon::new(vec![
            Vec2::ZERO,
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
        ])
        .unwrap();
        assert!(signed_area(cw.vertices()) > 0.0);
        assert!(cw.is_convex());
    }

    #[test]
    fn test_concave_polygon_detected() {
        let arrow = ConvexPolygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ])
        .unwrap();
        assert!(!arrow.is_convex());
    }

    #[test]
    fn test_circle_support() {
        let c = Shape::circle(Vec2::new(1.0, 1.0), 2.0).unwrap();
        let s = c.support(Vec2::new(0.0, 5.0)).unwrap();
        assert!((s - Vec2::new(1.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_polygon_support_picks_extreme_vertex() {
        let sq = square(Vec2::ZERO, 4.0);
        assert_eq!(sq.support(Vec2::new(1.0, 1.0)), Some(Vec2::new(4.0, 4.0)));
        assert_eq!(sq.support(Vec2::new(-1.0, -0.1)), Some(Vec2::ZERO));
    }

    #[test]
    fn test_rotated_rect_support_matches_corners() {
        let rect = Shape::rect(Vec2::new(3.0, -2.0), Vec2::new(2.0, 1.0), 0.6).unwrap();
        let corners = rect.rect_corners().unwrap();
        for dir in [Vec2::X, Vec2::Y, Vec2::new(-1.0, 0.3), Vec2::new(0.2, -1.0)] {
            let s = rect.support(dir).unwrap();
            let best = polygon_support(&corners, dir);
            assert!((s.dot(dir) - best.dot(dir)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_custom_shape_has_no_support() {
        let laser = Shape::custom(3, vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]).unwrap();
        assert!(!laser.has_support());
        assert_eq!(laser.support(Vec2::X), None);
        assert_eq!(laser.kind(), ShapeKind::Custom(3));
        assert_eq!(laser.aabb().width(), 100.0);
    }

    #[test]
    fn test_rotated_rect_aabb() {
        let rect = Shape::rect(Vec2::ZERO, Vec2::new(2.0, 1.0), PI / 2.0).unwrap();
        let aabb = rect.aabb();
        assert!((aabb.half_extents() - Vec2::new(1.0, 2.0)).length() < 1e-5);
        assert!(rect.is_axis_aligned());
        assert!(!Shape::rect(Vec2::ZERO, Vec2::ONE, 0.3).unwrap().is_axis_aligned());
    }

    #[test]
    fn test_from_corners_is_axis_aligned_rect() {
        let rect = Shape::from_corners(Vec2::new(-1.0, 2.0), Vec2::new(3.0, 4.0)).unwrap();
        assert!(rect.is_axis_aligned());
        let aabb = rect.aabb();
        assert!((aabb.center() - Vec2::new(1.0, 3.0)).length() < 1e-6);
        assert!((aabb.half_extents() - Vec2::new(2.0, 1.0)).length() < 1e-6);
        assert!(Shape::from_corners(Vec2::ONE, Vec2::new(1.0, 5.0)).is_err());
    }

    #[test]
    fn test_contains_point_includes_boundary() {
        let sq = square(Vec2::ZERO, 4.0);
        assert_eq!(sq.contains_point(Vec2::new(4.0, 2.0)), Some(true));
        assert_eq!(sq.contains_point(Vec2::new(4.1, 2.0)), Some(false));

        let c = Shape::circle(Vec2::ZERO, 5.0).unwrap();
        assert_eq!(c.contains_point(Vec2::new(3.0, 4.0)), Some(true));

        let rect = Shape::rect(Vec2::ZERO, Vec2::new(2.0, 1.0), PI / 4.0).unwrap();
        assert_eq!(rect.contains_point(Vec2::new(0.5, 0.5)), Some(true));
        assert_eq!(rect.contains_point(Vec2::new(1.5, -1.5)), Some(false));
    }

    #[test]
    fn test_polygon_centroid() {
        let sq = square(Vec2::new(2.0, 2.0), 4.0);
        assert!((sq.centroid() - Vec2::new(4.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_transform_applies_scale_rotation_translation() {
        let t = Transform::new(Vec2::new(10.0, 0.0), PI / 2.0).with_scale(2.0);
        let c = Shape::circle(Vec2::new(1.0, 0.0), 1.0).unwrap().transformed(&t);
        match c {
            Shape::Circle { center, radius } => {
                assert!((center - Vec2::new(10.0, 2.0)).length() < 1e-5);
                assert_eq!(radius, 2.0);
            }
            _ => unreachable!(),
        }
        assert!(Transform::IDENTITY.with_scale(0.0).validate().is_err());
    }

    #[test]
    fn test_aabb_overlap_is_inclusive() {
        let a = Aabb::new(Vec2::ZERO, Vec2::ONE);
        let b = Aabb::new(Vec2::ONE, Vec2::splat(2.0));
        let c = Aabb::new(Vec2::splat(1.01), Vec2::splat(2.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.union(&c).contains(&b));
    }
}
