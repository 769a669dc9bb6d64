//! Separating Axis Theorem with contact manifold
//!
//! Candidate axes are the edge normals of A, then of B, then (for circles)
//! the axis from the circle center to the nearest vertex of the other shape.
//! The first axis whose projections do not overlap proves separation.

use std::borrow::Cow;

use glam::Vec2;

use super::closed_form::Contact;
use super::shape::Shape;
use crate::error::CollideError;

/// Shape geometry as seen by SAT
enum Projectable<'a> {
    Polygon(Cow<'a, [Vec2]>),
    Circle { center: Vec2, radius: f32 },
}

impl<'a> Projectable<'a> {
    fn from_shape(shape: &'a Shape) -> Option<Self> {
        match shape {
            Shape::Circle { center, radius } => Some(Projectable::Circle {
                center: *center,
                radius: *radius,
            }),
            _ => shape.polygon_vertices().map(Projectable::Polygon),
        }
    }

    /// Interval covered on a unit axis
    fn project(&self, axis: Vec2) -> (f32, f32) {
        match self {
            Projectable::Polygon(vertices) => vertices.iter().fold(
                (f32::MAX, f32::MIN),
                |(lo, hi), v| {
                    let d = v.dot(axis);
                    (lo.min(d), hi.max(d))
                },
            ),
            Projectable::Circle { center, radius } => {
                let c = center.dot(axis);
                (c - radius, c + radius)
            }
        }
    }

    /// Unit edge normals; edge i runs from vertex i-1 to vertex i
    fn push_edge_axes(&self, axes: &mut Vec<Vec2>) {
        if let Projectable::Polygon(vertices) = self {
            let n = vertices.len();
            let mut prev = vertices[n - 1];
            for &cur in vertices.iter() {
                // Outward normal of a CCW edge
                if let Some(axis) = (cur - prev).perp().try_normalize() {
                    axes.push(-axis);
                }
                prev = cur;
            }
        }
    }

    fn center(&self) -> Vec2 {
        match self {
            Projectable::Polygon(vertices) => {
                vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32
            }
            Projectable::Circle { center, .. } => *center,
        }
    }
}

/// Axis from a circle center toward the closest feature of `other`
fn circle_axis(center: Vec2, other: &Projectable) -> Option<Vec2> {
    let target = match other {
        Projectable::Polygon(vertices) => vertices
            .iter()
            .copied()
            .min_by(|p, q| p.distance_squared(center).total_cmp(&q.distance_squared(center)))?,
        Projectable::Circle { center: c, .. } => *c,
    };
    (target - center).try_normalize()
}

/// Run SAT on two shapes.
///
/// Returns `Ok(None)` when separated and the minimum-overlap contact
/// otherwise. Shapes without SAT geometry (custom shapes) are rejected.
pub fn sat(a: &Shape, b: &Shape) -> Result<Option<Contact>, CollideError> {
    let unsupported = || CollideError::UnsupportedShapePair {
        a: a.kind(),
        b: b.kind(),
    };
    let pa = Projectable::from_shape(a).ok_or_else(unsupported)?;
    let pb = Projectable::from_shape(b).ok_or_else(unsupported)?;

    let mut axes = Vec::with_capacity(16);
    pa.push_edge_axes(&mut axes);
    pb.push_edge_axes(&mut axes);
    if let Projectable::Circle { center, .. } = pa {
        axes.extend(circle_axis(center, &pb));
    }
    if let Projectable::Circle { center, .. } = pb {
        axes.extend(circle_axis(center, &pa));
    }
    if axes.is_empty() {
        // Concentric circles
        axes.push(Vec2::X);
    }

    let mut best: Option<Contact> = None;
    for axis in axes {
        let (min_a, max_a) = pa.project(axis);
        let (min_b, max_b) = pb.project(axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return Ok(None);
        }
        // Strict comparison keeps the first axis on ties
        if best.is_none_or(|c| overlap < c.depth) {
            best = Some(Contact::new(axis, overlap));
        }
    }

    Ok(best.map(|mut contact| {
        if contact.normal.dot(pb.center() - pa.center()) < 0.0 {
            contact.normal = -contact.normal;
        }
        contact
    }))
}

/// Boolean SAT
pub fn intersects(a: &Shape, b: &Shape) -> Result<bool, CollideError> {
    Ok(sat(a, b)?.is_some())
}
