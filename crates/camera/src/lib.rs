//! First-person camera for the townview viewer.
//!
//! Accumulates unbounded mouse and keyboard input into a bounded orientation
//! and exposes the view and projection matrices derived from it.
//!
//! # Invariants
//! - `pitch` stays strictly inside (-89°, 89°) after every mutating call.
//! - `zoom` stays inside [1°, 45°] after every mutating call.
//! - `front`, `right` and `up` are rebuilt from yaw/pitch together and always
//!   form an orthonormal basis.
//! - `world_up` is fixed at +Y.

mod camera;
mod projection;

pub use camera::{
    Camera, CameraConfig, CameraConfigError, CameraMovement, MAX_PITCH, PITCH_LIMIT, ZOOM_MAX,
    ZOOM_MIN,
};
pub use projection::ProjectionMode;
