use crate::clock::Clock;
use crate::config::ViewerConfig;
use townview_camera::{Camera, ProjectionMode};
use townview_common::{SceneObject, Viewport};
use townview_input::InputState;
use townview_render::{ComposedFrame, FrameComposer, Renderer};

/// Viewer session state, handed to the event loop by the owner.
#[derive(Debug)]
pub struct AppState {
    camera: Camera,
    input: InputState,
    composer: FrameComposer,
    objects: Vec<SceneObject>,
    viewport: Viewport,
    projection: ProjectionMode,
    exit_requested: bool,
}

impl AppState {
    pub fn new(config: ViewerConfig, objects: Vec<SceneObject>, viewport: Viewport) -> Self {
        tracing::info!(
            objects = objects.len(),
            width = viewport.width,
            height = viewport.height,
            projection = %config.projection,
            "viewer state created"
        );
        Self {
            camera: Camera::new(config.camera),
            input: InputState::new(),
            composer: FrameComposer::new(),
            objects,
            viewport,
            projection: config.projection,
            exit_requested: false,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Input sink for platform callbacks. Recorded input reaches the camera
    /// on the next [`AppState::frame`].
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn projection(&self) -> ProjectionMode {
        self.projection
    }

    pub fn should_exit(&self) -> bool {
        self.exit_requested
    }

    /// Drawable size changed. Takes effect from the next frame.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "viewport resized"
            );
            self.viewport = viewport;
        }
    }

    /// Run one frame: apply pending input for `delta_time` seconds, settle the
    /// projection mode, then compose the draw list from the updated camera.
    pub fn frame(&mut self, delta_time: f32) -> ComposedFrame {
        let applied = self.input.apply(&mut self.camera, delta_time);

        if applied.toggle_projection {
            self.projection = self.projection.toggled();
            tracing::info!(projection = %self.projection, "projection mode changed");
        }
        if applied.exit_requested && !self.exit_requested {
            tracing::info!("exit requested");
            self.exit_requested = true;
        }

        self.composer.compose(
            &self.camera,
            self.viewport.aspect_ratio(),
            self.projection,
            &self.objects,
        )
    }

    /// [`AppState::frame`] with the delta taken from `clock`.
    pub fn advance(&mut self, clock: &mut impl Clock) -> ComposedFrame {
        let delta_time = clock.delta_seconds();
        self.frame(delta_time)
    }
}

/// Drive `frames` frames through `renderer`, stopping early once exit is
/// requested. `before_frame` runs ahead of each frame with the frame number,
/// so callers can feed scripted input.
pub fn run_frames<R, C, F>(
    state: &mut AppState,
    clock: &mut C,
    renderer: &mut R,
    frames: u32,
    mut before_frame: F,
) -> Vec<R::Output>
where
    R: Renderer,
    C: Clock,
    F: FnMut(u32, &mut InputState),
{
    let mut outputs = Vec::with_capacity(frames as usize);
    for n in 0..frames {
        before_frame(n, state.input_mut());
        let frame = state.advance(clock);
        outputs.push(renderer.render(&frame));
        if state.should_exit() {
            tracing::debug!(frame = n, "stopping early on exit request");
            break;
        }
    }
    outputs
}
