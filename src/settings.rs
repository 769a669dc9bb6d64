//! Engine settings and tuning
//!
//! Persisted as JSON next to the game's other config files.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::collide::PolygonMethod;
use crate::consts::*;
use crate::error::SettingsError;
use crate::gfx::{BufferMode, Sampling};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Resampling used for rotated/scaled sprites
    pub fn sampling(&self) -> Sampling {
        match self {
            QualityPreset::Low => Sampling::Nearest,
            QualityPreset::Medium | QualityPreset::High => Sampling::Bilinear,
        }
    }

    /// Edge length of blur kernels (always odd)
    pub fn blur_kernel_size(&self) -> usize {
        match self {
            QualityPreset::Low => 3,
            QualityPreset::Medium => 5,
            QualityPreset::High => 7,
        }
    }

    /// Whether VRAM double buffering is requested
    pub fn hardware_buffering(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Collision tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollideSettings {
    /// Algorithm for convex pairs without a closed form
    pub polygon_method: PolygonMethod,
    /// GJK progress epsilon
    pub gjk_epsilon: f32,
    /// GJK iteration cap
    pub gjk_max_iterations: u32,
    /// Active count past which the spatial grid is engaged
    pub grid_threshold: usize,
    /// Spatial grid cell size
    pub grid_cell_size: f32,
    /// Re-check polygon convexity on registration (debug aid)
    pub validate_convexity: bool,
}

impl Default for CollideSettings {
    fn default() -> Self {
        Self {
            polygon_method: PolygonMethod::Sat,
            gjk_epsilon: GJK_EPSILON,
            gjk_max_iterations: GJK_MAX_ITERATIONS,
            grid_threshold: GRID_THRESHOLD,
            grid_cell_size: GRID_CELL_SIZE,
            validate_convexity: cfg!(debug_assertions),
        }
    }
}

/// Frame buffer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Requested buffering mode (may degrade to software at runtime)
    pub mode: BufferMode,
    /// Clear color as RGBA
    pub background: [u8; 4],
    /// Budget of the emulated VRAM device in bytes
    pub vram_budget: usize,
    /// Restore attempts for a lost VRAM surface
    pub max_restore_attempts: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            mode: BufferMode::Hardware,
            background: [0, 0, 0, 255],
            vram_budget: 64 * 1024 * 1024,
            max_restore_attempts: VRAM_MAX_RESTORE_ATTEMPTS,
        }
    }
}

/// All engine settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    pub collide: CollideSettings,
    pub render: RenderSettings,
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.render.mode = if preset.hardware_buffering() {
            BufferMode::Hardware
        } else {
            BufferMode::Software
        };
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::info!("Using default settings ({e})");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        let c = &self.collide;
        if !(c.gjk_epsilon.is_finite() && c.gjk_epsilon > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "gjk_epsilon must be positive, got {}",
                c.gjk_epsilon
            )));
        }
        if c.gjk_max_iterations == 0 {
            return Err(SettingsError::Invalid("gjk_max_iterations must be > 0".into()));
        }
        if !(c.grid_cell_size.is_finite() && c.grid_cell_size > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "grid_cell_size must be positive, got {}",
                c.grid_cell_size
            )));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(SettingsError::Invalid(format!(
                "render size {}x{} is empty",
                self.render.width, self.render.height
            )));
        }
        Ok(())
    }
}
