//! Shared types used across the townview crates.
//!
//! # Invariants
//! - Handles are opaque; only the library that issued them interprets them.
//! - Model transforms are fixed at design time and never mutated by a frame.

pub mod types;

pub use types::{
    MeshHandle, SceneObject, TextureHandle, Transform, Viewport, WINDOW_HEIGHT, WINDOW_TITLE,
    WINDOW_WIDTH,
};
