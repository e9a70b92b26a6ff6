//! Frame loop state for the viewer.
//!
//! One [`AppState`] owns the camera, pending input and scene objects and is
//! passed explicitly to whatever drives frames; there is no global state.
//!
//! # Invariants
//! - Each frame applies all pending input before the camera is read.
//! - The camera is only mutated from inside [`AppState::frame`].

mod clock;
mod config;
mod state;

pub use clock::{Clock, FixedClock, MAX_FRAME_DELTA, SystemClock};
pub use config::{ConfigError, ViewerConfig};
pub use state::{AppState, run_frames};
