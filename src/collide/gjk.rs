//! GJK boolean intersection test in 2D
//!
//! Works purely on support points of the Minkowski difference A − B: the
//! shapes intersect iff that set contains the origin. The simplex never holds
//! more than three points.

use glam::Vec2;

use super::shape::Shape;
use crate::consts::{GJK_EPSILON, GJK_MAX_ITERATIONS};

/// Squared distance, relative to the squared support scale, under which the
/// origin counts as lying on the simplex
const ORIGIN_TOLERANCE: f32 = 1e-10;

/// Tuning for the GJK loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GjkConfig {
    /// Minimum progress of a new support point along the search direction
    pub epsilon: f32,
    /// Iteration cap; exceeding it is reported as divergence
    pub max_iterations: u32,
}

impl Default for GjkConfig {
    fn default() -> Self {
        Self {
            epsilon: GJK_EPSILON,
            max_iterations: GJK_MAX_ITERATIONS,
        }
    }
}

/// Result of a GJK run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GjkOutcome {
    /// The simplex enclosed the origin
    Intersecting,
    /// A support point failed to make progress toward the origin
    Separated,
    /// Iteration cap hit without a verdict (treated as separated by callers)
    Diverged { iterations: u32 },
}

impl GjkOutcome {
    #[inline]
    pub fn is_intersecting(&self) -> bool {
        matches!(self, GjkOutcome::Intersecting)
    }
}

/// Up to three Minkowski-difference points; the newest is last
#[derive(Debug, Clone, Default)]
struct Simplex {
    points: [Vec2; 3],
    len: usize,
}

impl Simplex {
    fn push(&mut self, p: Vec2) {
        debug_assert!(self.len < 3);
        self.points[self.len] = p;
        self.len += 1;
    }

    fn set(&mut self, points: &[Vec2]) {
        self.points[..points.len()].copy_from_slice(points);
        self.len = points.len();
    }
}

/// Minkowski-difference support point `sA(d) − sB(−d)`
#[inline]
fn support(a: &Shape, b: &Shape, d: Vec2) -> Option<Vec2> {
    Some(a.support(d)? - b.support(-d)?)
}

/// Run GJK on two shapes. Returns None if either shape lacks a support function.
pub fn gjk(a: &Shape, b: &Shape, config: &GjkConfig) -> Option<GjkOutcome> {
    let mut direction = b.centroid() - a.centroid();
    if direction.length_squared() <= f32::EPSILON {
        direction = Vec2::X;
    }

    let mut simplex = Simplex::default();
    let first = support(a, b, direction)?;
    simplex.push(first);
    // Closest point of the current simplex to the origin
    let mut closest = first;
    // Largest squared support distance seen, for scale-relative tolerances
    let mut scale = first.length_squared().max(1.0);

    for _ in 0..config.max_iterations {
        if closest.length_squared() <= ORIGIN_TOLERANCE * scale {
            return origin_on_simplex(a, b, &simplex, scale, config);
        }
        let dir_n = (-closest).normalize();

        let p = support(a, b, dir_n)?;
        let p_proj = p.dot(dir_n);
        if p_proj < 0.0 {
            // Support plane lies before the origin
            return Some(GjkOutcome::Separated);
        }
        // The simplex's projection onto the search direction is -|closest|
        let simplex_proj = closest.dot(dir_n);
        if p_proj - simplex_proj <= config.epsilon {
            return Some(GjkOutcome::Separated);
        }
        // A repeated vertex cannot move the simplex any closer
        if simplex.points[..simplex.len].contains(&p) {
            return Some(GjkOutcome::Separated);
        }

        scale = scale.max(p.length_squared());
        simplex.push(p);
        match evolve(&mut simplex, scale) {
            Some(c) => closest = c,
            None => return Some(GjkOutcome::Intersecting),
        }
    }

    Some(GjkOutcome::Diverged {
        iterations: config.max_iterations,
    })
}

/// Boolean convenience: divergence counts as separated
pub fn intersects(a: &Shape, b: &Shape, config: &GjkConfig) -> Option<bool> {
    gjk(a, b, config).map(|o| o.is_intersecting())
}

/// Decide a run whose simplex passes through the origin.
///
/// A vertex, or an edge with the difference set on one side only, puts the
/// origin on the boundary: that is touching, which counts as separated (as
/// in SAT). An edge with support beyond it on both sides means overlap.
fn origin_on_simplex(
    a: &Shape,
    b: &Shape,
    simplex: &Simplex,
    scale: f32,
    config: &GjkConfig,
) -> Option<GjkOutcome> {
    if simplex.len != 2 {
        return Some(GjkOutcome::Separated);
    }
    let Some(normal) = (simplex.points[1] - simplex.points[0]).perp().try_normalize() else {
        return Some(GjkOutcome::Separated);
    };
    let tolerance = config.epsilon * scale.sqrt();
    for dir in [normal, -normal] {
        if support(a, b, dir)?.dot(dir) <= tolerance {
            return Some(GjkOutcome::Separated);
        }
    }
    Some(GjkOutcome::Intersecting)
}

/// Reduce the simplex to the feature closest to the origin.
///
/// Returns the closest point, or None if the triangle encloses the origin.
fn evolve(simplex: &mut Simplex, scale: f32) -> Option<Vec2> {
    match simplex.len {
        2 => {
            let (b, a) = (simplex.points[0], simplex.points[1]);
            Some(reduce_segment(simplex, b, a))
        }
        3 => {
            let (c, b, a) = (simplex.points[0], simplex.points[1], simplex.points[2]);
            let area = (b - a).perp_dot(c - a);
            if area.abs() > 1e-9 && triangle_contains_origin(a, b, c, scale) {
                return None;
            }
            // Closest edge wins; the newest point is in two of them
            let candidates = [(b, a), (c, a), (c, b)];
            let mut best: Option<(f32, Vec2, Vec2)> = None;
            for (p, q) in candidates {
                let point = closest_on_segment_to_origin(p, q);
                let dist = point.length_squared();
                if best.is_none_or(|(d, _, _)| dist < d) {
                    best = Some((dist, p, q));
                }
            }
            let (_, p, q) = best?;
            Some(reduce_segment(simplex, p, q))
        }
        _ => Some(simplex.points[0]),
    }
}

/// Keep the minimal sub-feature of segment `p`-`q` closest to the origin
fn reduce_segment(simplex: &mut Simplex, p: Vec2, q: Vec2) -> Vec2 {
    let pq = q - p;
    let len_sq = pq.length_squared();
    if len_sq < 1e-12 {
        simplex.set(&[q]);
        return q;
    }
    let t = (-p).dot(pq) / len_sq;
    if t <= 0.0 {
        simplex.set(&[p]);
        p
    } else if t >= 1.0 {
        simplex.set(&[q]);
        q
    } else {
        simplex.set(&[p, q]);
        p + pq * t
    }
}

fn closest_on_segment_to_origin(p: Vec2, q: Vec2) -> Vec2 {
    let pq = q - p;
    let len_sq = pq.length_squared();
    if len_sq < 1e-12 {
        return p;
    }
    p + pq * ((-p).dot(pq) / len_sq).clamp(0.0, 1.0)
}

/// Strict origin-in-triangle test for either winding.
///
/// The origin must sit farther than the origin tolerance from every edge;
/// an origin on an edge is left to `origin_on_simplex`.
fn triangle_contains_origin(a: Vec2, b: Vec2, c: Vec2, scale: f32) -> bool {
    let margin = 0.5 * (ORIGIN_TOLERANCE * scale).sqrt();
    let side = |p: Vec2, q: Vec2| {
        let edge = q - p;
        let len = edge.length();
        if len <= f32::EPSILON {
            0.0
        } else {
            edge.perp_dot(-p) / len
        }
    };
    let (d1, d2, d3) = (side(a, b), side(b, c), side(c, a));
    (d1 > margin && d2 > margin && d3 > margin) || (d1 < -margin && d2 < -margin && d3 < -margin)
}
