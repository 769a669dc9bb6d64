//! Narrow-phase dispatch
//!
//! Order of resolution for a pair:
//! 1. closed form for the (kind, kind) pair, either argument order
//! 2. registered custom predicate, either argument order
//! 3. generic convex path (SAT, GJK or bounding pretest), needs support on both shapes
//! 4. `UnsupportedShapePair`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::closed_form::{self, Contact};
use super::gjk::{GjkConfig, GjkOutcome, gjk};
use super::sat;
use super::shape::{Shape, ShapeKind};
use crate::error::CollideError;
use crate::settings::CollideSettings;

/// Algorithm for convex pairs that have no closed form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolygonMethod {
    /// Separating axes; hits carry a contact manifold
    #[default]
    Sat,
    /// Boolean GJK; hits carry no contact
    Gjk,
    /// Accept bounding-box overlap as a hit (debug aid)
    PretestOnly,
}

/// User predicate deciding whether two shapes intersect
pub type PairPredicate = Arc<dyn Fn(&Shape, &Shape) -> bool + Send + Sync>;

/// Confirmed intersection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Normal (A→B) and depth, when the resolving test computes one
    pub contact: Option<Contact>,
}

impl Hit {
    fn boolean() -> Self {
        Self { contact: None }
    }

    pub fn normal(&self) -> Option<Vec2> {
        self.contact.map(|c| c.normal)
    }

    pub fn depth(&self) -> Option<f32> {
        self.contact.map(|c| c.depth)
    }
}

impl From<Contact> for Hit {
    fn from(contact: Contact) -> Self {
        Self {
            contact: Some(contact),
        }
    }
}

/// Exact pairwise tests plus the custom-pair registry
#[derive(Clone, Default)]
pub struct NarrowPhase {
    method: PolygonMethod,
    gjk: GjkConfig,
    handlers: HashMap<(ShapeKind, ShapeKind), PairPredicate>,
}

impl fmt::Debug for NarrowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrowPhase")
            .field("method", &self.method)
            .field("gjk", &self.gjk)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NarrowPhase {
    pub fn new(method: PolygonMethod, gjk: GjkConfig) -> Self {
        Self {
            method,
            gjk,
            handlers: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &CollideSettings) -> Self {
        Self::new(
            settings.polygon_method,
            GjkConfig {
                epsilon: settings.gjk_epsilon,
                max_iterations: settings.gjk_max_iterations,
            },
        )
    }

    #[inline]
    pub fn method(&self) -> PolygonMethod {
        self.method
    }

    pub fn set_method(&mut self, method: PolygonMethod) {
        self.method = method;
    }

    /// Register a predicate for a kind pair; it also serves the swapped pair.
    ///
    /// Returns the predicate it replaced, if any.
    pub fn register_handler(
        &mut self,
        a: ShapeKind,
        b: ShapeKind,
        predicate: PairPredicate,
    ) -> Option<PairPredicate> {
        // One entry per unordered pair
        let replaced = self.handlers.remove(&(b, a));
        self.handlers.insert((a, b), predicate).or(replaced)
    }

    pub fn has_handler(&self, a: ShapeKind, b: ShapeKind) -> bool {
        self.handlers.contains_key(&(a, b)) || self.handlers.contains_key(&(b, a))
    }

    /// Test one pair of world-space shapes
    ///
    /// `Ok(None)` is a miss. GJK divergence surfaces as `NumericDivergence`
    /// so the caller can log it; it must be treated as a miss.
    pub fn test(&self, a: &Shape, b: &Shape) -> Result<Option<Hit>, CollideError> {
        if let Some(result) = closed_form_test(a, b) {
            return Ok(result.map(Hit::from));
        }

        let (ka, kb) = (a.kind(), b.kind());
        if let Some(predicate) = self.handlers.get(&(ka, kb)) {
            return Ok(predicate(a, b).then(Hit::boolean));
        }
        if let Some(predicate) = self.handlers.get(&(kb, ka)) {
            return Ok(predicate(b, a).then(Hit::boolean));
        }

        if !(a.has_support() && b.has_support()) {
            return Err(CollideError::UnsupportedShapePair { a: ka, b: kb });
        }
        match self.method {
            PolygonMethod::Sat => Ok(sat::sat(a, b)?.map(Hit::from)),
            PolygonMethod::Gjk => match gjk(a, b, &self.gjk) {
                Some(GjkOutcome::Intersecting) => Ok(Some(Hit::boolean())),
                Some(GjkOutcome::Separated) => Ok(None),
                Some(GjkOutcome::Diverged { iterations }) => {
                    Err(CollideError::NumericDivergence { iterations })
                }
                None => Err(CollideError::UnsupportedShapePair { a: ka, b: kb }),
            },
            PolygonMethod::PretestOnly => Ok(a.aabb().overlaps(&b.aabb()).then(Hit::boolean)),
        }
    }
}

/// Closed-form result, or None when the pair has no closed form
fn closed_form_test(a: &Shape, b: &Shape) -> Option<Option<Contact>> {
    use Shape::*;
    match (a, b) {
        (Circle { center: c1, radius: r1 }, Circle { center: c2, radius: r2 }) => {
            Some(closed_form::circle_circle(*c1, *r1, *c2, *r2))
        }
        (
            Circle { center, radius },
            Rectangle {
                center: rc,
                half_extents,
                rotation,
            },
        ) => Some(closed_form::circle_rect(*center, *radius, *rc, *half_extents, *rotation)),
        (
            Rectangle {
                center: rc,
                half_extents,
                rotation,
            },
            Circle { center, radius },
        ) => Some(
            closed_form::circle_rect(*center, *radius, *rc, *half_extents, *rotation)
                .map(Contact::flipped),
        ),
        (Rectangle { .. }, Rectangle { .. }) if a.is_axis_aligned() && b.is_axis_aligned() => {
            Some(closed_form::aabb_aabb(&a.aabb(), &b.aabb()))
        }
        (Circle { center, radius }, ConvexPolygon(poly)) => Some(closed_form::circle_polygon(
            *center,
            *radius,
            poly.vertices(),
        )),
        (ConvexPolygon(poly), Circle { center, radius }) => Some(
            closed_form::circle_polygon(*center, *radius, poly.vertices()).map(Contact::flipped),
        ),
        _ => None,
    }
}
