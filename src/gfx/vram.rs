//! Video memory devices
//!
//! The frame buffer only needs three things from VRAM: reserve space for a
//! surface, give it back, and report whether a surface's contents survived
//! since the last check. `EmulatedVram` models a device with a fixed budget
//! whose surfaces can be lost (e.g. on a display mode change).

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::RenderError;

/// Identifier of a VRAM allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VramId(u64);

/// Result of validating a VRAM surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    /// Contents intact
    Ok,
    /// Contents were lost; memory is back and must be repainted
    Restored,
    /// Contents lost and the device could not restore the surface yet
    Lost,
}

pub trait VramDevice: Send + fmt::Debug {
    fn name(&self) -> &str;

    fn allocate(&mut self, bytes: usize) -> Result<VramId, RenderError>;

    fn release(&mut self, id: VramId);

    fn validate(&mut self, id: VramId) -> SurfaceStatus;
}

/// Device with no video memory; hardware mode always degrades
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVram;

impl VramDevice for NoVram {
    fn name(&self) -> &str {
        "none"
    }

    fn allocate(&mut self, _bytes: usize) -> Result<VramId, RenderError> {
        Err(RenderError::HardwareUnavailable("no video memory".into()))
    }

    fn release(&mut self, _id: VramId) {}

    fn validate(&mut self, _id: VramId) -> SurfaceStatus {
        SurfaceStatus::Lost
    }
}

#[derive(Debug, Default)]
struct VramState {
    budget: usize,
    used: usize,
    next_id: u64,
    allocations: HashMap<VramId, usize>,
    /// Validations left that report lost-then-restored contents
    pending_losses: u32,
    /// While set, lost surfaces cannot be restored
    unrecoverable: bool,
}

/// Budgeted in-process VRAM; clones share the same device state
#[derive(Debug, Clone)]
pub struct EmulatedVram {
    state: Arc<Mutex<VramState>>,
}

impl EmulatedVram {
    pub fn new(budget: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(VramState {
                budget,
                ..Default::default()
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut VramState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub fn used(&self) -> usize {
        self.with_state(|s| s.used)
    }

    pub fn budget(&self) -> usize {
        self.with_state(|s| s.budget)
    }

    /// Make the next `count` validations report lost contents
    pub fn lose_contents(&self, count: u32) {
        self.with_state(|s| s.pending_losses += count);
    }

    /// Lose all contents and refuse to restore them until cleared
    pub fn set_unrecoverable(&self, unrecoverable: bool) {
        self.with_state(|s| s.unrecoverable = unrecoverable);
    }
}

impl VramDevice for EmulatedVram {
    fn name(&self) -> &str {
        "emulated"
    }

    fn allocate(&mut self, bytes: usize) -> Result<VramId, RenderError> {
        self.with_state(|s| {
            if s.used.saturating_add(bytes) > s.budget {
                return Err(RenderError::HardwareUnavailable(format!(
                    "{bytes} bytes requested, {} of {} free",
                    s.budget - s.used,
                    s.budget
                )));
            }
            let id = VramId(s.next_id);
            s.next_id += 1;
            s.used += bytes;
            s.allocations.insert(id, bytes);
            Ok(id)
        })
    }

    fn release(&mut self, id: VramId) {
        self.with_state(|s| {
            if let Some(bytes) = s.allocations.remove(&id) {
                s.used -= bytes;
            }
        });
    }

    fn validate(&mut self, id: VramId) -> SurfaceStatus {
        self.with_state(|s| {
            if !s.allocations.contains_key(&id) || s.unrecoverable {
                return SurfaceStatus::Lost;
            }
            if s.pending_losses > 0 {
                s.pending_losses -= 1;
                return SurfaceStatus::Restored;
            }
            SurfaceStatus::Ok
        })
    }
}
