//! Frame output and texture processing
//!
//! Textures are immutable and `Arc`-shared. Transforms (convolution, affine
//! resampling) always produce new textures. The `FrameBuffer` composes them
//! into a back surface and hands finished frames to the display thread.

pub mod affine;
pub mod framebuffer;
pub mod kernel;
pub mod pipeline;
pub mod pixel;
pub mod registry;
pub mod surface;
pub mod texture;
pub mod vram;

pub use affine::Sampling;
pub use framebuffer::{BufferMode, DisplayHandle, FrameBuffer};
pub use kernel::{BorderPolicy, Kernel};
pub use pipeline::{TextureOp, TexturePipeline};
pub use pixel::{PixelFormat, Rgba};
pub use registry::{TextureRegistry, not_found_texture};
pub use surface::{Rect, Surface};
pub use texture::Texture;
pub use vram::{EmulatedVram, NoVram, SurfaceStatus, VramDevice, VramId};
