//! Danmaku headless demo
//!
//! Spawns seeded bullet patterns against a player ship and a row of turrets,
//! runs the fixed-timestep loop for a few seconds and logs collision and
//! presentation stats. A separate display thread consumes presented frames.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use danmaku_core::Settings;
use danmaku_core::collide::{
    ColliderHandle, CollideSystem, CollisionEvent, Playfield, Shape, ShapeKind, Transform,
};
use danmaku_core::engine::{Engine, GameLogic};
use danmaku_core::gfx::{
    BorderPolicy, FrameBuffer, Kernel, Rect, Rgba, Texture, TexturePipeline, TextureRegistry,
};

const SETTINGS_PATH: &str = "danmaku.json";
const SEED: u64 = 0x5eed_da_6a;
const FRAMES: u32 = 600;
const FRAME_DT: f32 = 1.0 / 60.0;

const GROUP_PLAYER: u32 = 1 << 0;
const GROUP_ENEMY: u32 = 1 << 1;
const GROUP_PLAYER_SHOT: u32 = 1 << 2;
const GROUP_ENEMY_SHOT: u32 = 1 << 3;

const LASER_TAG: u32 = 1;

const BULLET_SPEED: f32 = 180.0;
const BULLET_RADIUS: f32 = 3.0;

struct Bullet {
    handle: ColliderHandle,
    pos: Vec2,
    vel: Vec2,
}

struct Demo {
    rng: Pcg32,
    field: Playfield,
    player: ColliderHandle,
    player_pos: Vec2,
    turrets: Vec<(ColliderHandle, Vec2)>,
    bullets: Vec<Bullet>,
    player_hits: u32,
    turret_hits: u32,
    culled: usize,
}

impl Demo {
    fn new(collide: &mut CollideSystem, field: Playfield) -> Result<Self, danmaku_core::CollideError> {
        let player_pos = Vec2::new(field.width * 0.5, field.height - 60.0);
        let hull = Shape::polygon(vec![
            Vec2::new(0.0, -12.0),
            Vec2::new(-9.0, 8.0),
            Vec2::new(9.0, 8.0),
        ])?;
        let player = collide.register_owned(
            1,
            hull,
            Transform::at(player_pos),
            GROUP_PLAYER,
            GROUP_ENEMY | GROUP_ENEMY_SHOT,
        )?;

        let mut turrets = Vec::new();
        for i in 0..4 {
            let pos = Vec2::new(80.0 + i as f32 * 130.0, 70.0);
            let body = Shape::rect(Vec2::ZERO, Vec2::new(14.0, 10.0), 0.3 * i as f32)?;
            let handle = collide.register_owned(
                100 + i,
                body,
                Transform::at(pos),
                GROUP_ENEMY,
                GROUP_PLAYER | GROUP_PLAYER_SHOT,
            )?;
            turrets.push((handle, pos));
        }

        // Sweeping laser: a custom polyline resolved by its own handler
        let beam = Shape::custom(LASER_TAG, vec![Vec2::ZERO, Vec2::new(0.0, 240.0)])?;
        collide.register(
            beam,
            Transform::at(Vec2::new(field.width * 0.5, 90.0)),
            GROUP_ENEMY_SHOT,
            GROUP_PLAYER,
        )?;
        collide.register_shape_pair_handler(
            ShapeKind::Custom(LASER_TAG),
            ShapeKind::ConvexPolygon,
            |beam: &Shape, ship: &Shape| beam.aabb().overlaps(&ship.aabb()),
        );

        Ok(Self {
            rng: Pcg32::seed_from_u64(SEED),
            field,
            player,
            player_pos,
            turrets,
            bullets: Vec::new(),
            player_hits: 0,
            turret_hits: 0,
            culled: 0,
        })
    }

    fn spawn(&mut self, collide: &mut CollideSystem, pos: Vec2, vel: Vec2, group: u32, mask: u32) {
        let shape = match Shape::circle(Vec2::ZERO, BULLET_RADIUS) {
            Ok(shape) => shape,
            Err(e) => {
                log::error!("Bullet shape rejected: {e}");
                return;
            }
        };
        match collide.register(shape, Transform::at(pos), group, mask) {
            Ok(handle) => self.bullets.push(Bullet { handle, pos, vel }),
            Err(e) => log::warn!("Bullet not spawned: {e}"),
        }
    }

    fn handle_event(&mut self, collide: &mut CollideSystem, event: &CollisionEvent) {
        for handle in [event.a, event.b] {
            if handle == self.player {
                self.player_hits += 1;
            } else if self.turrets.iter().any(|(t, _)| *t == handle) {
                self.turret_hits += 1;
            } else if let Some(i) = self.bullets.iter().position(|b| b.handle == handle) {
                let bullet = self.bullets.swap_remove(i);
                if let Err(e) = collide.remove(bullet.handle) {
                    log::debug!("Bullet {} not removed: {e}", bullet.handle);
                }
            }
        }
    }
}

impl GameLogic for Demo {
    fn update(&mut self, collide: &mut CollideSystem, events: &[CollisionEvent], dt: f32) {
        for event in events {
            self.handle_event(collide, event);
        }

        // Player strafes and fires straight up
        let t = (self.rng.random_range(-1.0f32..1.0) * 40.0 * dt).clamp(-2.0, 2.0);
        self.player_pos.x = (self.player_pos.x + t).clamp(40.0, self.field.width - 40.0);
        if let Err(e) = collide.set_transform(self.player, Transform::at(self.player_pos)) {
            log::warn!("Player transform rejected: {e}");
        }
        if self.rng.random_bool(0.15) {
            let muzzle = self.player_pos - Vec2::new(0.0, 14.0);
            self.spawn(
                collide,
                muzzle,
                Vec2::new(0.0, -BULLET_SPEED * 2.0),
                GROUP_PLAYER_SHOT,
                GROUP_ENEMY,
            );
        }

        // Turrets fire aimed bursts with some spread
        for i in 0..self.turrets.len() {
            if !self.rng.random_bool(0.05) {
                continue;
            }
            let origin = self.turrets[i].1 + Vec2::new(0.0, 14.0);
            let spread = self.rng.random_range(-0.4f32..0.4);
            let aim = (self.player_pos - origin).normalize_or(Vec2::Y);
            let vel = danmaku_core::rotate(aim, spread) * BULLET_SPEED;
            self.spawn(collide, origin, vel, GROUP_ENEMY_SHOT, GROUP_PLAYER);
        }

        for bullet in &mut self.bullets {
            bullet.pos += bullet.vel * dt;
            if let Err(e) = collide.set_transform(bullet.handle, Transform::at(bullet.pos)) {
                log::debug!("Bullet {} not moved: {e}", bullet.handle);
            }
        }

        let removed = collide.cull_outside(&self.field);
        if !removed.is_empty() {
            self.bullets.retain(|b| !removed.contains(&b.handle));
            self.culled += removed.len();
        }
    }

    fn render(&mut self, frame: &mut FrameBuffer, textures: &TextureRegistry) {
        let ship = textures.get("ship");
        let turret = textures.get("turret");
        let shot = textures.get("shot");

        let centered = |tex: &Texture, pos: Vec2| {
            let x = pos.x as i32 - tex.width() as i32 / 2;
            let y = pos.y as i32 - tex.height() as i32 / 2;
            Rect::at(x, y, tex)
        };
        for (_, pos) in &self.turrets {
            frame.submit(&turret, centered(&turret, *pos));
        }
        for bullet in &self.bullets {
            frame.submit(&shot, centered(&shot, bullet.pos));
        }
        frame.submit(&ship, centered(&ship, self.player_pos));
    }
}

/// Build sprite textures in place of the resource loader
fn load_textures(engine: &mut Engine) -> Result<(), danmaku_core::RenderError> {
    let quality = engine.settings().quality;

    let glow = Kernel::gaussian(quality.blur_kernel_size(), 1.2)?;
    let shot = TexturePipeline::new()
        .convolve(glow, BorderPolicy::Transparent)
        .apply(&Texture::filled(8, 8, Rgba::new(255, 80, 200, 255))?)?;

    let hull = Texture::filled(18, 20, Rgba::opaque(80, 200, 255))?;
    let ship = TexturePipeline::new()
        .convolve(Kernel::stroke(3)?, BorderPolicy::Clamp)
        .apply(&hull)?;

    let turret = Texture::filled(28, 20, Rgba::opaque(200, 60, 40))?
        .rotate(0.3, quality.sampling())?;

    let textures = engine.textures_mut();
    textures.insert("shot", shot);
    textures.insert("ship", ship);
    textures.insert("turret", turret);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Danmaku demo starting...");

    let settings = Settings::load_or_default(SETTINGS_PATH);
    let mut engine = match Engine::new(settings) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Failed to start engine: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = load_textures(&mut engine) {
        log::warn!("Sprite generation failed, using placeholders: {e}");
    }

    let field = engine.playfield();
    let mut demo = match Demo::new(engine.collide_mut(), field) {
        Ok(demo) => demo,
        Err(e) => {
            log::error!("Failed to set up scene: {e}");
            std::process::exit(1);
        }
    };

    // Display side: wait for each frame and sample it
    let display = engine.frame_buffer().display_handle();
    let running = Arc::new(AtomicBool::new(true));
    let consumer = {
        let running = Arc::clone(&running);
        thread::spawn(move || {
            let mut last = 0;
            let mut shown = 0u32;
            while running.load(Ordering::Acquire) {
                if let Some(frame) = display.wait_for_frame(last, Duration::from_millis(50)) {
                    let lit = display.with_front(|front, _| {
                        front.pixels().iter().filter(|p| **p != Rgba::BLACK).count()
                    });
                    if frame % 120 == 0 {
                        log::info!("Displayed frame {frame}: {lit} lit pixels");
                    }
                    last = frame;
                    shown += 1;
                }
            }
            shown
        })
    };

    let mut events = 0;
    for _ in 0..FRAMES {
        let report = engine.frame(FRAME_DT, &mut demo);
        events += report.events;
    }
    running.store(false, Ordering::Release);

    let shown = consumer.join().unwrap_or_else(|_| {
        log::error!("Display thread panicked");
        0
    });
    let stats = engine.collide().stats();
    log::info!(
        "Ran {} ticks over {FRAMES} frames ({shown} displayed), buffering {:?}",
        engine.ticks(),
        engine.frame_buffer().mode()
    );
    log::info!(
        "{events} collision events: player hit {} times, turrets hit {} times, {} bullets culled",
        demo.player_hits,
        demo.turret_hits,
        demo.culled
    );
    log::info!(
        "Last tick: {} active, {} candidates, grid {}",
        stats.active,
        stats.candidates,
        stats.used_grid
    );
}
