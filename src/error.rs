//! Error types for collision, rendering and settings

use thiserror::Error;

use crate::collide::ShapeKind;

/// Collision subsystem errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollideError {
    /// No closed-form, custom or generic handler resolves the pair
    #[error("unsupported shape pair: {a:?} vs {b:?}")]
    UnsupportedShapePair { a: ShapeKind, b: ShapeKind },

    /// Shape or transform rejected at registration
    #[error("degenerate shape: {0}")]
    DegenerateShape(String),

    /// GJK hit its iteration cap without resolving
    #[error("GJK did not converge within {iterations} iterations")]
    NumericDivergence { iterations: u32 },

    /// Group bitmask is empty
    #[error("invalid collision group {group:#010x} (mask {mask:#010x})")]
    InvalidGroupMask { group: u32, mask: u32 },

    /// Handle does not name an active collidable
    #[error("unknown collider handle {0}")]
    UnknownHandle(u32),

    /// Every handle id has been issued
    #[error("collider handles exhausted")]
    HandlesExhausted,
}

/// Render subsystem errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The VRAM device could not provide a surface
    #[error("hardware surface unavailable: {0}")]
    HardwareUnavailable(String),

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid convolution kernel: {0}")]
    InvalidKernel(String),

    /// Affine matrix cannot be inverted
    #[error("affine transform is singular (determinant {0})")]
    SingularTransform(f32),

    #[error("region {x},{y} {width}x{height} is outside the texture")]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Pixel data length does not match the declared size
    #[error("pixel buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Settings loading errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Settings parsed but hold out-of-range values
    #[error("invalid setting: {0}")]
    Invalid(String),
}
