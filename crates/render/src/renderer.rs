use crate::composer::ComposedFrame;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer receives a fully composed frame and turns it into output. It
/// binds mesh and texture handles by identity only and never reaches back
/// into the camera.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one composed frame.
    fn render(&mut self, frame: &ComposedFrame) -> Self::Output;
}

/// Text renderer for headless runs and tests.
///
/// Produces a human-readable description of each draw in submission order.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames_rendered: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &ComposedFrame) -> String {
        self.frames_rendered += 1;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} ({}, aspect={:.3}) ===",
            frame.index, frame.mode, frame.aspect
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2})",
            frame.eye.x, frame.eye.y, frame.eye.z
        );
        let _ = writeln!(out, "Draws: {}", frame.items.len());

        for (i, item) in frame.items.iter().enumerate() {
            let origin = item.model_view_projection() * glam::Vec4::W;
            let _ = writeln!(
                out,
                "  [{i}] mesh={} texture={} clip=({:.3}, {:.3}, {:.3}, {:.3})",
                item.mesh.0, item.texture.0, origin.x, origin.y, origin.z, origin.w
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::FrameComposer;
    use glam::Vec3;
    use townview_camera::{Camera, ProjectionMode};
    use townview_common::{MeshHandle, SceneObject, TextureHandle, Transform};

    #[test]
    fn debug_renderer_empty_frame() {
        let frame =
            FrameComposer::new().compose(&Camera::default(), 1.0, ProjectionMode::Perspective, &[]);
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&frame);

        assert!(output.contains("Frame 0 (perspective"));
        assert!(output.contains("Draws: 0"));
        assert!(output.contains("eye=(0.00, 0.00, 3.00)"));
    }

    #[test]
    fn debug_renderer_lists_draws_in_order() {
        let objects = vec![
            SceneObject::new("a", Transform::default(), MeshHandle(4), TextureHandle(1)),
            SceneObject::new(
                "b",
                Transform {
                    position: Vec3::new(0.0, 0.0, -5.0),
                    ..Transform::default()
                },
                MeshHandle(2),
                TextureHandle(3),
            ),
        ];
        let frame = FrameComposer::new().compose(
            &Camera::default(),
            1.0,
            ProjectionMode::Orthographic,
            &objects,
        );
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&frame);

        assert!(output.contains("orthographic"));
        let first = output.find("[0] mesh=4 texture=1").unwrap();
        let second = output.find("[1] mesh=2 texture=3").unwrap();
        assert!(first < second);
        assert_eq!(renderer.frames_rendered(), 1);
    }
}
