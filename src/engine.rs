//! Fixed-timestep frame loop
//!
//! Each frame runs zero or more simulation ticks (collide, then game logic)
//! followed by one render + present. Collision for a tick always completes
//! before logic sees its events.

use crate::collide::{CollideSystem, CollisionEvent, Playfield};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::RenderError;
use crate::gfx::{EmulatedVram, FrameBuffer, TextureRegistry, VramDevice};
use crate::settings::Settings;

/// Largest frame delta fed into the accumulator (seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// Converts variable frame time into fixed simulation steps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` seconds and return how many ticks to run (at most `MAX_SUBSTEPS`)
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt.min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= SIM_DT {
            log::debug!("Frame clock behind by {:.1} ms, dropping backlog", self.accumulator * 1000.0);
            self.accumulator %= SIM_DT;
        }
        substeps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }
}

/// Game-side hooks called by the engine
pub trait GameLogic {
    /// React to this tick's collisions and move entities
    fn update(&mut self, collide: &mut CollideSystem, events: &[CollisionEvent], dt: f32);

    /// Draw the frame into the back buffer
    fn render(&mut self, frame: &mut FrameBuffer, textures: &TextureRegistry);
}

/// Summary of one `Engine::frame` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub substeps: u32,
    pub events: usize,
    /// Frame number returned by `present`
    pub presented: u64,
}

#[derive(Debug)]
pub struct Engine {
    settings: Settings,
    collide: CollideSystem,
    frame_buffer: FrameBuffer,
    textures: TextureRegistry,
    clock: FrameClock,
    ticks: u64,
}

impl Engine {
    /// Engine backed by an emulated VRAM device sized from the settings
    pub fn new(settings: Settings) -> Result<Self, RenderError> {
        let vram = EmulatedVram::new(settings.render.vram_budget);
        Self::with_device(settings, Box::new(vram))
    }

    pub fn with_device(settings: Settings, device: Box<dyn VramDevice>) -> Result<Self, RenderError> {
        let collide = CollideSystem::new(&settings.collide);
        let frame_buffer = FrameBuffer::new(&settings.render, device)?;
        log::info!(
            "Engine ready: {}x{}, quality {}",
            settings.render.width,
            settings.render.height,
            settings.quality.as_str()
        );
        Ok(Self {
            settings,
            collide,
            frame_buffer,
            textures: TextureRegistry::new(),
            clock: FrameClock::new(),
            ticks: 0,
        })
    }

    /// Run a single fixed tick: collide, then logic
    pub fn step(&mut self, logic: &mut impl GameLogic) -> usize {
        let events = self.collide.tick();
        logic.update(&mut self.collide, &events, SIM_DT);
        self.ticks += 1;
        events.len()
    }

    /// Advance by `dt` seconds of wall time and present one frame
    pub fn frame(&mut self, dt: f32, logic: &mut impl GameLogic) -> FrameReport {
        let substeps = self.clock.advance(dt);
        let mut events = 0;
        for _ in 0..substeps {
            events += self.step(&mut *logic);
        }

        self.frame_buffer.clear();
        logic.render(&mut self.frame_buffer, &self.textures);
        let presented = self.frame_buffer.present();
        FrameReport {
            substeps,
            events,
            presented,
        }
    }

    /// Play field covering the whole frame buffer
    pub fn playfield(&self) -> Playfield {
        let (width, height) = self.frame_buffer.size();
        Playfield::new(width as f32, height as f32)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn collide(&self) -> &CollideSystem {
        &self.collide
    }

    pub fn collide_mut(&mut self) -> &mut CollideSystem {
        &mut self.collide
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.frame_buffer
    }

    pub fn frame_buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame_buffer
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    /// Simulation ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
