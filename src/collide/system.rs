//! Per-tick collision registry
//!
//! Owns every active collidable, runs broad and narrow phase once per tick
//! and reports confirmed hits as `CollisionEvent`s in canonical order.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::broad::{self, BroadEntry, SpatialGrid};
use super::dispatch::{NarrowPhase, PolygonMethod};
use super::shape::{Aabb, Shape, ShapeKind, Transform};
use crate::consts::{GRID_CELL_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::CollideError;
use crate::settings::CollideSettings;

/// Game entity that owns a collidable
pub type EntityId = u64;

/// Stable id of a registered collidable; never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle(u32);

impl ColliderHandle {
    #[inline]
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A confirmed intersection; `a` always has the lower handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
    pub owner_a: Option<EntityId>,
    pub owner_b: Option<EntityId>,
    /// Contact normal pointing from `a` toward `b`
    pub normal: Option<Vec2>,
    pub depth: Option<f32>,
}

impl CollisionEvent {
    /// The other collider of the pair, if `handle` takes part in it
    pub fn other(&self, handle: ColliderHandle) -> Option<ColliderHandle> {
        if handle == self.a {
            Some(self.b)
        } else if handle == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// UI margins around the play field
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

/// Visible play area used for out-of-bounds culling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    pub insets: Insets,
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32)
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            insets: Insets::default(),
        }
    }

    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Area inside the UI insets
    pub fn inner(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.insets.left, self.insets.top),
            Vec2::new(self.width - self.insets.right, self.height - self.insets.bottom),
        )
    }

    /// Strictly outside the inner area; the border itself is inside
    pub fn is_outside(&self, p: Vec2) -> bool {
        !self.inner().contains_point(p)
    }
}

/// Counters from the latest tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub active: usize,
    pub candidates: usize,
    pub events: usize,
    /// Pairs dropped because no handler resolves them
    pub skipped: usize,
    /// GJK runs that hit the iteration cap
    pub diverged: usize,
    pub used_grid: bool,
}

#[derive(Debug, Clone)]
struct Collidable {
    handle: ColliderHandle,
    owner: Option<EntityId>,
    /// Local-space shape
    shape: Shape,
    transform: Transform,
    group: u32,
    mask: u32,
    /// Cached world-space shape and bounds
    world: Shape,
    aabb: Aabb,
}

impl Collidable {
    fn refresh(&mut self) {
        self.world = self.shape.transformed(&self.transform);
        self.aabb = self.world.aabb();
    }
}

/// Collision registry and per-tick detector
#[derive(Debug)]
pub struct CollideSystem {
    /// Sorted by handle (handles are allocated in increasing order)
    colliders: Vec<Collidable>,
    next_id: u32,
    narrow: NarrowPhase,
    grid: SpatialGrid,
    grid_threshold: usize,
    validate_convexity: bool,
    stats: TickStats,
    /// Kind pairs already reported as unsupported
    reported: HashSet<(ShapeKind, ShapeKind)>,
}

impl Default for CollideSystem {
    fn default() -> Self {
        Self::new(&CollideSettings::default())
    }
}

impl CollideSystem {
    pub fn new(settings: &CollideSettings) -> Self {
        log::info!(
            "Collide system: {:?}, grid past {} colliders",
            settings.polygon_method,
            settings.grid_threshold
        );
        Self {
            colliders: Vec::new(),
            next_id: 1,
            narrow: NarrowPhase::from_settings(settings),
            grid: SpatialGrid::new(if settings.grid_cell_size > 0.0 {
                settings.grid_cell_size
            } else {
                GRID_CELL_SIZE
            }),
            grid_threshold: settings.grid_threshold,
            validate_convexity: settings.validate_convexity,
            stats: TickStats::default(),
            reported: HashSet::new(),
        }
    }

    /// Register a collidable with no owning entity
    pub fn register(
        &mut self,
        shape: Shape,
        transform: Transform,
        group: u32,
        mask: u32,
    ) -> Result<ColliderHandle, CollideError> {
        self.insert(None, shape, transform, group, mask)
    }

    /// Register a collidable owned by a game entity
    pub fn register_owned(
        &mut self,
        owner: EntityId,
        shape: Shape,
        transform: Transform,
        group: u32,
        mask: u32,
    ) -> Result<ColliderHandle, CollideError> {
        self.insert(Some(owner), shape, transform, group, mask)
    }

    fn insert(
        &mut self,
        owner: Option<EntityId>,
        shape: Shape,
        transform: Transform,
        group: u32,
        mask: u32,
    ) -> Result<ColliderHandle, CollideError> {
        if group == 0 {
            return Err(CollideError::InvalidGroupMask { group, mask });
        }
        shape.validate()?;
        transform.validate()?;
        if let Shape::ConvexPolygon(poly) = &shape {
            if self.validate_convexity && !poly.is_convex() {
                return Err(CollideError::DegenerateShape("polygon is not convex".into()));
            }
        }

        let next = self.next_id.checked_add(1).ok_or(CollideError::HandlesExhausted)?;
        let handle = ColliderHandle(std::mem::replace(&mut self.next_id, next));
        let world = shape.transformed(&transform);
        let aabb = world.aabb();
        self.colliders.push(Collidable {
            handle,
            owner,
            shape,
            transform,
            group,
            mask,
            world,
            aabb,
        });
        log::debug!("Registered collider {handle} (group {group:#x}, mask {mask:#x})");
        Ok(handle)
    }

    fn index_of(&self, handle: ColliderHandle) -> Result<usize, CollideError> {
        self.colliders
            .binary_search_by_key(&handle, |c| c.handle)
            .map_err(|_| CollideError::UnknownHandle(handle.0))
    }

    pub fn remove(&mut self, handle: ColliderHandle) -> Result<(), CollideError> {
        let index = self.index_of(handle)?;
        self.colliders.remove(index);
        Ok(())
    }

    /// Move a collidable; the world shape is rebuilt immediately
    pub fn set_transform(
        &mut self,
        handle: ColliderHandle,
        transform: Transform,
    ) -> Result<(), CollideError> {
        transform.validate()?;
        let index = self.index_of(handle)?;
        let collider = &mut self.colliders[index];
        collider.transform = transform;
        collider.refresh();
        Ok(())
    }

    pub fn contains(&self, handle: ColliderHandle) -> bool {
        self.index_of(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Active handles in canonical order
    pub fn handles(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.colliders.iter().map(|c| c.handle)
    }

    pub fn transform(&self, handle: ColliderHandle) -> Result<Transform, CollideError> {
        Ok(self.colliders[self.index_of(handle)?].transform)
    }

    pub fn world_shape(&self, handle: ColliderHandle) -> Result<&Shape, CollideError> {
        Ok(&self.colliders[self.index_of(handle)?].world)
    }

    pub fn owner(&self, handle: ColliderHandle) -> Result<Option<EntityId>, CollideError> {
        Ok(self.colliders[self.index_of(handle)?].owner)
    }

    /// Resolve a kind pair the built-in tests cannot (or override the generic path)
    pub fn register_shape_pair_handler<F>(&mut self, a: ShapeKind, b: ShapeKind, predicate: F)
    where
        F: Fn(&Shape, &Shape) -> bool + Send + Sync + 'static,
    {
        if self.narrow.register_handler(a, b, Arc::new(predicate)).is_some() {
            log::info!("Replaced shape pair handler {a:?} / {b:?}");
        }
        self.reported.remove(&(a, b));
        self.reported.remove(&(b, a));
    }

    pub fn polygon_method(&self) -> PolygonMethod {
        self.narrow.method()
    }

    pub fn set_polygon_method(&mut self, method: PolygonMethod) {
        log::info!("Polygon method: {method:?}");
        self.narrow.set_method(method);
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Detect all collisions among the active collidables.
    ///
    /// Events are sorted by (a, b) and each unordered pair appears at most
    /// once. Ticking twice without changes yields the same events.
    pub fn tick(&mut self) -> Vec<CollisionEvent> {
        let entries: Vec<BroadEntry> = self
            .colliders
            .iter()
            .map(|c| BroadEntry {
                group: c.group,
                mask: c.mask,
                aabb: c.aabb,
            })
            .collect();

        let used_grid = entries.len() > self.grid_threshold;
        let pairs = if used_grid {
            self.grid.candidate_pairs(&entries)
        } else {
            broad::candidate_pairs(&entries)
        };

        let mut stats = TickStats {
            active: entries.len(),
            candidates: pairs.len(),
            used_grid,
            ..Default::default()
        };
        let mut events = Vec::new();
        for (i, j) in pairs {
            let (a, b) = (&self.colliders[i], &self.colliders[j]);
            match self.narrow.test(&a.world, &b.world) {
                Ok(Some(hit)) => events.push(CollisionEvent {
                    a: a.handle,
                    b: b.handle,
                    owner_a: a.owner,
                    owner_b: b.owner,
                    normal: hit.normal(),
                    depth: hit.depth(),
                }),
                Ok(None) => {}
                Err(CollideError::NumericDivergence { iterations }) => {
                    stats.diverged += 1;
                    log::warn!(
                        "GJK gave up on {} / {} after {iterations} iterations, treating as miss",
                        a.handle,
                        b.handle
                    );
                }
                Err(e) => {
                    stats.skipped += 1;
                    if self.reported.insert((a.world.kind(), b.world.kind())) {
                        log::warn!("Skipping pair {} / {}: {e}", a.handle, b.handle);
                    } else {
                        log::debug!("Skipping pair {} / {}: {e}", a.handle, b.handle);
                    }
                }
            }
        }

        stats.events = events.len();
        log::debug!(
            "Collide tick: {} active, {} candidates, {} events{}",
            stats.active,
            stats.candidates,
            stats.events,
            if used_grid { " (grid)" } else { "" }
        );
        self.stats = stats;
        events
    }

    /// Colliders whose world shape contains `p`, in canonical order.
    ///
    /// Custom shapes are matched by their bounding box.
    pub fn query_point(&self, p: Vec2) -> Vec<ColliderHandle> {
        self.colliders
            .iter()
            .filter(|c| c.aabb.contains_point(p) && c.world.contains_point(p).unwrap_or(true))
            .map(|c| c.handle)
            .collect()
    }

    /// Whether the collider's position has left the play field
    pub fn is_outside(&self, handle: ColliderHandle, field: &Playfield) -> Result<bool, CollideError> {
        let collider = &self.colliders[self.index_of(handle)?];
        Ok(field.is_outside(collider.transform.translation))
    }

    /// Remove every collider outside the play field and return their handles
    pub fn cull_outside(&mut self, field: &Playfield) -> Vec<ColliderHandle> {
        let mut removed = Vec::new();
        self.colliders.retain(|c| {
            let outside = field.is_outside(c.transform.translation);
            if outside {
                removed.push(c.handle);
            }
            !outside
        });
        if !removed.is_empty() {
            log::debug!("Culled {} colliders outside the play field", removed.len());
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    const PLAYER: u32 = 0b01;
    const BULLET: u32 = 0b10;

    fn ball(radius: f32) -> Shape {
        Shape::circle(Vec2::ZERO, radius).unwrap()
    }

    fn at(x: f32, y: f32) -> Transform {
        Transform::at(Vec2::new(x, y))
    }

    #[test]
    fn test_rejects_bad_registrations() {
        let mut sys = CollideSystem::default();
        assert!(matches!(
            sys.register(ball(1.0), at(0.0, 0.0), 0, BULLET),
            Err(CollideError::InvalidGroupMask { group: 0, .. })
        ));
        let bad = Shape::Circle {
            center: Vec2::ZERO,
            radius: -1.0,
        };
        assert!(matches!(
            sys.register(bad, at(0.0, 0.0), PLAYER, BULLET),
            Err(CollideError::DegenerateShape(_))
        ));
        assert!(matches!(
            sys.register(ball(1.0), at(0.0, 0.0).with_scale(0.0), PLAYER, BULLET),
            Err(CollideError::DegenerateShape(_))
        ));
        assert!(sys.is_empty());
    }

    #[test]
    fn test_rejects_concave_polygon_when_validating() {
        let settings = CollideSettings {
            validate_convexity: true,
            ..Default::default()
        };
        let mut sys = CollideSystem::new(&settings);
        let arrow = Shape::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(2.0, 1.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
        ])
        .unwrap();
        assert!(matches!(
            sys.register(arrow, Transform::IDENTITY, PLAYER, BULLET),
            Err(CollideError::DegenerateShape(_))
        ));
    }

    #[test]
    fn test_player_hit_by_bullet() {
        let mut sys = CollideSystem::default();
        let player = sys
            .register_owned(10, ball(5.0), at(0.0, 0.0), PLAYER, BULLET)
            .unwrap();
        let bullet = sys
            .register_owned(20, ball(4.0), at(8.0, 0.0), BULLET, 0)
            .unwrap();
        let _missed = sys.register(ball(4.0), at(11.0, 0.0), BULLET, 0).unwrap();

        let events = sys.tick();
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!((event.a, event.b), (player, bullet));
        assert_eq!((event.owner_a, event.owner_b), (Some(10), Some(20)));
        assert_eq!(event.normal, Some(Vec2::X));
        assert_eq!(event.depth, Some(1.0));
        assert_eq!(event.other(bullet), Some(player));
    }

    #[test]
    fn test_bullets_ignore_each_other() {
        let mut sys = CollideSystem::default();
        sys.register(ball(4.0), at(0.0, 0.0), BULLET, 0).unwrap();
        sys.register(ball(4.0), at(1.0, 0.0), BULLET, 0).unwrap();
        assert!(sys.tick().is_empty());
    }

    #[test]
    fn test_tick_is_idempotent() {
        let mut sys = CollideSystem::default();
        sys.register(ball(5.0), at(0.0, 0.0), PLAYER, BULLET).unwrap();
        for x in [3.0, 6.0, 9.0, 30.0] {
            sys.register(ball(2.0), at(x, 0.0), BULLET, PLAYER).unwrap();
        }
        let first = sys.tick();
        let second = sys.tick();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_pair_reported_once_regardless_of_order() {
        for flip in [false, true] {
            let mut sys = CollideSystem::default();
            let (first, second) = if flip { (BULLET, PLAYER) } else { (PLAYER, BULLET) };
            // Both masks accept the other side
            let a = sys.register(ball(3.0), at(0.0, 0.0), first, PLAYER | BULLET).unwrap();
            let b = sys.register(ball(3.0), at(2.0, 0.0), second, PLAYER | BULLET).unwrap();
            let events = sys.tick();
            assert_eq!(events.len(), 1);
            assert_eq!((events[0].a, events[0].b), (a, b));
        }
    }

    #[test]
    fn test_remove_and_unknown_handle() {
        let mut sys = CollideSystem::default();
        let a = sys.register(ball(5.0), at(0.0, 0.0), PLAYER, BULLET).unwrap();
        let b = sys.register(ball(5.0), at(1.0, 0.0), BULLET, 0).unwrap();
        assert_eq!(sys.tick().len(), 1);

        sys.remove(b).unwrap();
        assert!(sys.tick().is_empty());
        assert_eq!(sys.remove(b), Err(CollideError::UnknownHandle(b.id())));
        assert!(sys.set_transform(b, at(0.0, 0.0)).is_err());

        // Handles are never reused
        let c = sys.register(ball(5.0), at(1.0, 0.0), BULLET, 0).unwrap();
        assert!(c > b && c > a);
    }

    #[test]
    fn test_register_fails_once_handles_run_out() {
        let mut sys = CollideSystem::default();
        sys.next_id = u32::MAX - 1;
        let last = sys.register(ball(1.0), at(0.0, 0.0), PLAYER, BULLET).unwrap();
        assert_eq!(last.id(), u32::MAX - 1);
        assert_eq!(
            sys.register(ball(1.0), at(0.0, 0.0), PLAYER, BULLET),
            Err(CollideError::HandlesExhausted)
        );
        assert_eq!(sys.len(), 1);
        assert!(sys.contains(last));
    }

    #[test]
    fn test_set_transform_moves_collider() {
        let mut sys = CollideSystem::default();
        sys.register(ball(5.0), at(0.0, 0.0), PLAYER, BULLET).unwrap();
        let bullet = sys.register(ball(2.0), at(100.0, 0.0), BULLET, 0).unwrap();
        assert!(sys.tick().is_empty());

        sys.set_transform(bullet, at(6.0, 0.0)).unwrap();
        assert_eq!(sys.tick().len(), 1);
        assert!(matches!(
            sys.set_transform(bullet, at(f32::NAN, 0.0)),
            Err(CollideError::DegenerateShape(_))
        ));
        assert_eq!(sys.transform(bullet).unwrap().translation, Vec2::new(6.0, 0.0));
    }

    #[test]
    fn test_unsupported_pair_skipped_without_aborting_tick() {
        let mut sys = CollideSystem::default();
        let laser = Shape::custom(9, vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]).unwrap();
        sys.register(laser, Transform::IDENTITY, BULLET, 0).unwrap();
        sys.register(ball(5.0), at(50.0, 0.0), PLAYER, BULLET).unwrap();
        sys.register(ball(2.0), at(55.0, 0.0), BULLET, 0).unwrap();

        let events = sys.tick();
        assert_eq!(events.len(), 1);
        assert_eq!(sys.stats().skipped, 1);

        // A registered predicate makes the laser pair resolvable
        sys.register_shape_pair_handler(ShapeKind::Circle, ShapeKind::Custom(9), |circle, laser| {
            match (circle, laser) {
                (Shape::Circle { center, radius }, Shape::Custom(l)) => {
                    (center.y - l.points[0].y).abs() <= *radius
                }
                _ => false,
            }
        });
        let events = sys.tick();
        assert_eq!(events.len(), 2);
        assert_eq!(sys.stats().skipped, 0);
        // Custom pairs carry no contact
        assert!(events.iter().any(|e| e.normal.is_none()));
    }

    #[test]
    fn test_gjk_method_events_have_no_contact() {
        let mut sys = CollideSystem::default();
        let square = Shape::from_corners(Vec2::new(-2.0, -2.0), Vec2::new(2.0, 2.0)).unwrap();
        sys.register(square.clone(), Transform::new(Vec2::ZERO, 0.3), PLAYER, BULLET)
            .unwrap();
        sys.register(square, Transform::new(Vec2::new(3.0, 0.0), 0.7), BULLET, 0)
            .unwrap();

        let sat = sys.tick();
        assert!(sat[0].normal.is_some());

        sys.set_polygon_method(PolygonMethod::Gjk);
        let gjk = sys.tick();
        assert_eq!(gjk.len(), 1);
        assert_eq!(gjk[0].normal, None);
        assert_eq!(gjk[0].depth, None);
    }

    #[test]
    fn test_grid_and_quadratic_ticks_agree() {
        let mut rng = Pcg32::seed_from_u64(7);
        let quadratic_settings = CollideSettings {
            grid_threshold: usize::MAX,
            ..Default::default()
        };
        let grid_settings = CollideSettings {
            grid_threshold: 0,
            grid_cell_size: 24.0,
            ..Default::default()
        };
        let mut quadratic = CollideSystem::new(&quadratic_settings);
        let mut grid = CollideSystem::new(&grid_settings);

        for _ in 0..300 {
            let pos = at(rng.random_range(0.0f32..640.0), rng.random_range(0.0f32..480.0));
            let shape = if rng.random_bool(0.5) {
                ball(rng.random_range(2.0f32..12.0))
            } else {
                Shape::rect(
                    Vec2::ZERO,
                    Vec2::new(rng.random_range(2.0f32..10.0), rng.random_range(2.0f32..10.0)),
                    rng.random_range(0.0f32..3.0),
                )
                .unwrap()
            };
            let (group, mask) = if rng.random_bool(0.1) { (PLAYER, BULLET) } else { (BULLET, PLAYER) };
            quadratic.register(shape.clone(), pos, group, mask).unwrap();
            grid.register(shape, pos, group, mask).unwrap();
        }

        let expected = quadratic.tick();
        let actual = grid.tick();
        assert!(grid.stats().used_grid);
        assert!(!quadratic.stats().used_grid);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_query_point() {
        let mut sys = CollideSystem::default();
        let a = sys.register(ball(5.0), at(0.0, 0.0), PLAYER, BULLET).unwrap();
        let b = sys
            .register(Shape::rect(Vec2::ZERO, Vec2::new(1.0, 1.0), 0.0).unwrap(), at(4.5, 0.0), BULLET, 0)
            .unwrap();
        assert_eq!(sys.query_point(Vec2::new(4.0, 0.0)), vec![a, b]);
        assert_eq!(sys.query_point(Vec2::new(4.0, 4.0)), vec![]);
    }

    #[test]
    fn test_cull_outside_honors_insets() {
        let mut sys = CollideSystem::default();
        let field = Playfield::new(640.0, 480.0).with_insets(Insets {
            top: 16.0,
            left: 36.0,
            bottom: 16.0,
            right: 220.0,
        });
        let inside = sys.register(ball(2.0), at(100.0, 100.0), BULLET, 0).unwrap();
        let under_ui = sys.register(ball(2.0), at(500.0, 100.0), BULLET, 0).unwrap();
        let above = sys.register(ball(2.0), at(100.0, 10.0), BULLET, 0).unwrap();
        let edge = sys.register(ball(2.0), at(36.0, 16.0), BULLET, 0).unwrap();

        assert_eq!(sys.is_outside(under_ui, &field), Ok(true));
        assert_eq!(sys.is_outside(edge, &field), Ok(false));
        assert_eq!(sys.cull_outside(&field), vec![under_ui, above]);
        assert_eq!(sys.handles().collect::<Vec<_>>(), vec![inside, edge]);
    }
}
