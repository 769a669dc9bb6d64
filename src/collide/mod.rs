//! Collision detection
//!
//! Shapes, exact pairwise tests (closed forms, GJK, SAT) and the per-tick
//! `CollideSystem` that filters, dispatches and reports hits.

pub mod broad;
pub mod closed_form;
pub mod dispatch;
pub mod gjk;
pub mod sat;
pub mod shape;
pub mod system;

pub use closed_form::Contact;
pub use dispatch::{Hit, NarrowPhase, PairPredicate, PolygonMethod};
pub use gjk::{GjkConfig, GjkOutcome};
pub use shape::{Aabb, ConvexPolygon, CustomShape, Shape, ShapeKind, Transform};
pub use system::{
    ColliderHandle, CollideSystem, CollisionEvent, EntityId, Insets, Playfield, TickStats,
};
