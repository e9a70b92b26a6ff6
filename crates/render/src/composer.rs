use glam::{Mat4, Vec3};
use townview_camera::{Camera, ProjectionMode};
use townview_common::{MeshHandle, SceneObject, TextureHandle};

/// Everything a renderer needs to draw one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub mesh: MeshHandle,
    pub texture: TextureHandle,
}

impl DrawItem {
    /// `projection * view * model`.
    pub fn model_view_projection(&self) -> Mat4 {
        self.projection * self.view * self.model
    }
}

/// One frame's draw list.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedFrame {
    /// Sequence number, starting at zero.
    pub index: u64,
    pub mode: ProjectionMode,
    pub aspect: f32,
    pub eye: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub items: Vec<DrawItem>,
}

impl ComposedFrame {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Combines fixed model transforms with the camera into ordered draw items.
#[derive(Debug, Default)]
pub struct FrameComposer {
    frames_composed: u64,
}

impl FrameComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_composed(&self) -> u64 {
        self.frames_composed
    }

    /// Build the draw list for `objects` as seen from `camera`.
    pub fn compose(
        &mut self,
        camera: &Camera,
        aspect: f32,
        mode: ProjectionMode,
        objects: &[SceneObject],
    ) -> ComposedFrame {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect, mode);

        let items = objects
            .iter()
            .map(|object| DrawItem {
                model: object.model,
                view,
                projection,
                mesh: object.mesh,
                texture: object.texture,
            })
            .collect();

        let index = self.frames_composed;
        self.frames_composed += 1;
        tracing::trace!(index, objects = objects.len(), %mode, "composed frame");

        ComposedFrame {
            index,
            mode,
            aspect,
            eye: camera.position(),
            view,
            projection,
            items,
        }
    }
}
