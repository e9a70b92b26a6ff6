//! Frame composition and the renderer-agnostic draw interface.
//!
//! # Invariants
//! - View and projection are read from the camera once per frame and shared
//!   by every draw item of that frame.
//! - Draw items come out in the order objects went in.
//! - Renderers consume composed frames; they never touch camera state.

mod composer;
mod renderer;

pub use composer::{ComposedFrame, DrawItem, FrameComposer};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "townview-render v0.1.0"
}
