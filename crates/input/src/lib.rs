//! Input sampling: platform key and pointer events mapped to viewer actions.
//!
//! # Invariants
//! - Everything queued for a frame is applied to the camera before the frame
//!   reads it; nothing is applied halfway.
//! - Pointer events are applied in arrival order.
//! - A projection toggle fires once per key press, not once per frame held.

pub mod action;
pub mod state;

pub use action::{Action, ParseActionError};
pub use state::{FrameInput, InputState};
