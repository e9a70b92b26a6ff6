use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Title of the viewer window.
pub const WINDOW_TITLE: &str = "Townview";
/// Initial window width in physical pixels.
pub const WINDOW_WIDTH: u32 = 800;
/// Initial window height in physical pixels.
pub const WINDOW_HEIGHT: u32 = 600;

/// Opaque reference to a mesh loaded into a mesh library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Opaque reference to a texture loaded into a texture library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Scale, then rotate about `axis` by `degrees`, then translate.
    pub fn from_scale_rotation_translation(
        scale: Vec3,
        axis: Vec3,
        degrees: f32,
        position: Vec3,
    ) -> Self {
        Self {
            position,
            rotation: Quat::from_axis_angle(axis.normalize_or(Vec3::Y), degrees.to_radians()),
            scale,
        }
    }

    /// Model matrix `T * R * S`.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Drawable size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A minimized window reports a zero dimension, so both
    /// sides are floored at one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

/// One drawable object: a fixed model transform plus the resources it draws with.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub model: Mat4,
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
}

impl SceneObject {
    pub fn new(
        name: impl Into<String>,
        transform: Transform,
        mesh: MeshHandle,
        texture: TextureHandle,
    ) -> Self {
        Self {
            name: name.into(),
            model: transform.model_matrix(),
            mesh,
            texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn model_matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Vec3::Y,
            90.0,
            Vec3::new(0.0, 0.0, -14.0),
        );
        let expected = Mat4::from_translation(Vec3::new(0.0, 0.0, -14.0))
            * Mat4::from_rotation_y(90.0_f32.to_radians())
            * Mat4::from_scale(Vec3::splat(2.0));
        assert!(t.model_matrix().abs_diff_eq(expected, 1e-5));

        // +X scaled to 2, rotated onto -Z, pushed back 14.
        let p = t.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, -16.0), 1e-5));
    }

    #[test]
    fn viewport_aspect_guards_zero_height() {
        assert_eq!(Viewport::new(800, 600).aspect_ratio(), 800.0 / 600.0);
        assert_eq!(Viewport::new(800, 0).aspect_ratio(), 800.0);
    }

    #[test]
    fn handles_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&MeshHandle(3)).unwrap();
        assert_eq!(json, "3");
        let back: TextureHandle = serde_json::from_str("7").unwrap();
        assert_eq!(back, TextureHandle(7));
    }
}
