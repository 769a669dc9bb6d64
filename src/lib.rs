//! Danmaku Core - collision and frame-buffer core of a 2D shoot-em-up engine
//!
//! Core modules:
//! - `collide`: Shape model, narrow phase (closed forms, GJK, SAT) and the per-tick `CollideSystem`
//! - `gfx`: Textures, convolution/affine transforms and the double-buffered `FrameBuffer`
//! - `engine`: Fixed-timestep loop gluing collision, game logic and presentation
//! - `settings`: Serializable tuning for both subsystems

pub mod collide;
pub mod engine;
pub mod error;
pub mod gfx;
pub mod settings;

pub use error::{CollideError, RenderError, SettingsError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz, matching the logic thread of the game)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default GJK progress epsilon
    pub const GJK_EPSILON: f32 = 1e-6;
    /// Default GJK iteration cap
    pub const GJK_MAX_ITERATIONS: u32 = 32;

    /// Active collidable count past which the spatial grid is used
    pub const GRID_THRESHOLD: usize = 256;
    /// Spatial grid cell edge length (pixels)
    pub const GRID_CELL_SIZE: f32 = 64.0;

    /// Default play field size
    pub const SCREEN_WIDTH: u32 = 640;
    pub const SCREEN_HEIGHT: u32 = 480;

    /// Times a lost VRAM surface is restored before giving up on it
    pub const VRAM_MAX_RESTORE_ATTEMPTS: u32 = 32;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

/// Rotate a vector by an angle (radians, counter-clockwise)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// True if every component of the vector is finite
#[inline]
pub fn is_finite(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
