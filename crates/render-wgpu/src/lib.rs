//! wgpu render backend for the town viewer.
//!
//! Draws each item of a [`townview_render::ComposedFrame`] as an indexed,
//! textured triangle list with depth testing against a black clear.
//!
//! # Invariants
//! - The renderer never reads or mutates the camera; matrices arrive in the frame.
//! - GPU buffers and textures are released when their owner is dropped.
//! - Mesh and texture uploads happen once, before the first frame.

mod error;
mod gpu;
mod resources;
mod shaders;

pub use error::GpuError;
pub use gpu::{FrameTarget, RenderStats, WgpuRenderer};
pub use resources::{GpuMesh, GpuTexture, mip_chain};
