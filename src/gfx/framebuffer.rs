//! Double-buffered frame output
//!
//! The game draws into the back surface with `submit` and publishes it with
//! `present`. In hardware mode both surfaces live in VRAM and `present` swaps
//! them; in software mode the back surface is copied into the front. Either
//! way the handoff happens under the display lock, so a `DisplayHandle` on
//! another thread never sees a half-drawn frame.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::pixel::{PixelFormat, Rgba};
use super::surface::{Rect, Surface};
use super::texture::Texture;
use super::vram::{SurfaceStatus, VramDevice, VramId};
use crate::error::RenderError;
use crate::settings::RenderSettings;

/// Where the frame surfaces live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BufferMode {
    /// VRAM-backed page flipping
    #[default]
    Hardware,
    /// System-memory surfaces with a copy on present
    Software,
}

/// Surface layout used for VRAM surfaces
const HARDWARE_FORMAT: PixelFormat = PixelFormat::Bgra8;

#[derive(Debug)]
struct Display {
    front: Surface,
    frame: u64,
}

#[derive(Debug)]
struct DisplayShared {
    display: Mutex<Display>,
    presented: Condvar,
}

impl DisplayShared {
    fn lock(&self) -> MutexGuard<'_, Display> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read side of the frame buffer, usable from any thread
#[derive(Debug, Clone)]
pub struct DisplayHandle {
    shared: Arc<DisplayShared>,
}

impl DisplayHandle {
    /// Number of frames presented so far
    pub fn frame(&self) -> u64 {
        self.shared.lock().frame
    }

    /// Inspect the front surface while holding the display lock
    pub fn with_front<R>(&self, f: impl FnOnce(&Surface, u64) -> R) -> R {
        let display = self.shared.lock();
        f(&display.front, display.frame)
    }

    /// Copy of the front surface and its frame number
    pub fn snapshot(&self) -> (Surface, u64) {
        self.with_front(|front, frame| (front.clone(), frame))
    }

    /// Block until a frame newer than `after` is presented
    pub fn wait_for_frame(&self, after: u64, timeout: Duration) -> Option<u64> {
        let display = self.shared.lock();
        let (display, _) = self
            .shared
            .presented
            .wait_timeout_while(display, timeout, |d| d.frame <= after)
            .unwrap_or_else(PoisonError::into_inner);
        (display.frame > after).then_some(display.frame)
    }
}

pub struct FrameBuffer {
    width: u32,
    height: u32,
    background: Rgba,
    requested: BufferMode,
    mode: BufferMode,
    software_format: PixelFormat,
    back: Surface,
    shared: Arc<DisplayShared>,
    device: Box<dyn VramDevice>,
    /// VRAM for [back, front] while in hardware mode
    vram: Option<[VramId; 2]>,
    /// Hardware-mode draw calls since the last clear/present, replayed after VRAM loss
    drawn: Vec<(Texture, Rect)>,
    max_restore_attempts: u32,
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("size", &(self.width, self.height))
            .field("requested", &self.requested)
            .field("mode", &self.mode)
            .field("format", &self.back.format())
            .field("device", &self.device.name())
            .finish()
    }
}

impl FrameBuffer {
    pub fn new(settings: &RenderSettings, device: Box<dyn VramDevice>) -> Result<Self, RenderError> {
        Self::with_format(settings, device, PixelFormat::Rgba8)
    }

    /// Frame buffer whose software surfaces use `software_format`
    pub fn with_format(
        settings: &RenderSettings,
        device: Box<dyn VramDevice>,
        software_format: PixelFormat,
    ) -> Result<Self, RenderError> {
        let background = Rgba::from_array(settings.background);
        let back = Surface::new(settings.width, settings.height, software_format, background)?;
        let front = back.clone();
        let mut fb = Self {
            width: settings.width,
            height: settings.height,
            background,
            requested: BufferMode::Software,
            mode: BufferMode::Software,
            software_format,
            back,
            shared: Arc::new(DisplayShared {
                display: Mutex::new(Display { front, frame: 0 }),
                presented: Condvar::new(),
            }),
            device,
            vram: None,
            drawn: Vec::new(),
            max_restore_attempts: settings.max_restore_attempts.max(1),
        };
        fb.configure(settings.mode);
        Ok(fb)
    }

    /// Switch buffering mode; returns the mode actually in effect.
    ///
    /// Both surfaces are reallocated at the same size. Pixels carry over when
    /// the new format holds them exactly, otherwise the surfaces are cleared.
    pub fn configure(&mut self, mode: BufferMode) -> BufferMode {
        self.requested = mode;
        if mode == self.mode {
            return self.mode;
        }

        let active = match mode {
            BufferMode::Hardware => match self.allocate_vram() {
                Ok(ids) => {
                    self.vram = Some(ids);
                    BufferMode::Hardware
                }
                Err(e) => {
                    log::warn!("Hardware buffering unavailable, using software: {e}");
                    BufferMode::Software
                }
            },
            BufferMode::Software => {
                self.release_vram();
                BufferMode::Software
            }
        };
        if active != self.mode {
            self.switch_surfaces(active);
        }
        self.mode = active;
        log::info!(
            "Frame buffer {}x{}: {:?} ({:?})",
            self.width,
            self.height,
            self.mode,
            self.back.format()
        );
        active
    }

    fn allocate_vram(&mut self) -> Result<[VramId; 2], RenderError> {
        let bytes = Surface::byte_len(self.width, self.height, HARDWARE_FORMAT);
        let back = self.device.allocate(bytes)?;
        match self.device.allocate(bytes) {
            Ok(front) => Ok([back, front]),
            Err(e) => {
                self.device.release(back);
                Err(e)
            }
        }
    }

    fn release_vram(&mut self) {
        if let Some(ids) = self.vram.take() {
            for id in ids {
                self.device.release(id);
            }
        }
    }

    fn format_for(&self, mode: BufferMode) -> PixelFormat {
        match mode {
            BufferMode::Hardware => HARDWARE_FORMAT,
            BufferMode::Software => self.software_format,
        }
    }

    /// Re-encode both surfaces for `mode`
    fn switch_surfaces(&mut self, mode: BufferMode) {
        let format = self.format_for(mode);
        let (back, kept_back) = self.back.converted(format, self.background);
        self.back = back;

        let mut display = self.shared.lock();
        let (front, kept_front) = display.front.converted(format, self.background);
        display.front = front;
        drop(display);

        if !(kept_back && kept_front) {
            log::info!("{format:?} cannot hold the current frame exactly, surfaces cleared");
        }
    }

    /// Draw a texture into the back surface
    pub fn submit(&mut self, texture: &Texture, dest: Rect) {
        self.back.blit(texture, dest);
        // Only VRAM surfaces can lose contents and need a replay
        if self.mode == BufferMode::Hardware {
            self.drawn.push((texture.clone(), dest));
        }
    }

    /// Reset the back surface to the background color
    pub fn clear(&mut self) {
        self.back.clear(self.background);
        self.drawn.clear();
    }

    /// Publish the back surface; returns the new frame number
    pub fn present(&mut self) -> u64 {
        if self.mode == BufferMode::Hardware {
            self.ensure_back_valid();
        }

        let mut display = self.shared.lock();
        match self.mode {
            BufferMode::Hardware => {
                std::mem::swap(&mut display.front, &mut self.back);
                if let Some(ids) = self.vram.as_mut() {
                    ids.swap(0, 1);
                }
            }
            BufferMode::Software => {
                if let Err(e) = display.front.copy_from(&self.back) {
                    log::error!("Front surface out of sync, replacing it: {e}");
                    display.front = self.back.clone();
                }
            }
        }
        display.frame += 1;
        let frame = display.frame;
        drop(display);

        self.shared.presented.notify_all();
        self.drawn.clear();
        frame
    }

    /// Validate the VRAM back surface, repainting after losses
    fn ensure_back_valid(&mut self) {
        let Some([back_id, _]) = self.vram else {
            return;
        };
        for _ in 0..self.max_restore_attempts {
            match self.device.validate(back_id) {
                SurfaceStatus::Ok => return,
                SurfaceStatus::Restored => {
                    log::debug!("VRAM back surface restored, repainting");
                    self.repaint();
                }
                SurfaceStatus::Lost => {}
            }
        }

        log::warn!(
            "VRAM surface still lost after {} attempts, degrading to software",
            self.max_restore_attempts
        );
        self.release_vram();
        self.switch_surfaces(BufferMode::Software);
        self.mode = BufferMode::Software;
        self.repaint();
    }

    fn repaint(&mut self) {
        self.back.clear(self.background);
        for (texture, dest) in &self.drawn {
            self.back.blit(texture, *dest);
        }
    }

    pub fn display_handle(&self) -> DisplayHandle {
        DisplayHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Mode currently in effect
    #[inline]
    pub fn mode(&self) -> BufferMode {
        self.mode
    }

    /// Mode last asked for via `configure`
    #[inline]
    pub fn requested_mode(&self) -> BufferMode {
        self.requested
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.back.format()
    }

    pub fn back(&self) -> &Surface {
        &self.back
    }

    pub fn background(&self) -> Rgba {
        self.background
    }
}

impl Drop for FrameBuffer {
    fn drop(&mut self) {
        self.release_vram();
    }
}
