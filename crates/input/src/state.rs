use crate::action::Action;
use std::collections::BTreeSet;
use townview_camera::{Camera, CameraMovement};

/// Pointer input queued between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PointerEvent {
    CursorMoved { x: f32, y: f32 },
    Scrolled(f32),
    /// Cursor left the window or focus was lost; re-seed on the next sample.
    Reset,
}

/// What the frame loop has to act on after input was applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Flip the projection mode this frame.
    pub toggle_projection: bool,
    pub exit_requested: bool,
}

/// Input collected since the last frame.
///
/// Platform callbacks only record into this; nothing touches the camera until
/// [`InputState::apply`] runs at the start of the frame.
#[derive(Debug, Default)]
pub struct InputState {
    held: BTreeSet<CameraMovement>,
    pointer: Vec<PointerEvent>,
    toggle_held: bool,
    pending_toggles: u32,
    exit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release for a bound action.
    pub fn handle_action(&mut self, action: Action, pressed: bool) {
        match action {
            Action::Move(direction) => {
                if pressed {
                    self.held.insert(direction);
                } else {
                    self.held.remove(&direction);
                }
            }
            Action::ToggleProjection => {
                if pressed && !self.toggle_held {
                    self.pending_toggles += 1;
                }
                self.toggle_held = pressed;
            }
            Action::Exit => {
                if pressed {
                    self.exit_requested = true;
                }
            }
        }
    }

    /// Record an absolute cursor position in window pixels.
    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        self.pointer.push(PointerEvent::CursorMoved { x, y });
    }

    /// Record a vertical scroll offset in lines.
    pub fn scrolled(&mut self, y_offset: f32) {
        self.pointer.push(PointerEvent::Scrolled(y_offset));
    }

    /// Drop held keys and the cursor baseline, e.g. when the window loses focus.
    pub fn focus_lost(&mut self) {
        self.held.clear();
        self.toggle_held = false;
        self.pointer.push(PointerEvent::Reset);
    }

    pub fn is_held(&self, direction: CameraMovement) -> bool {
        self.held.contains(&direction)
    }

    /// Apply everything recorded since the last call to `camera`.
    ///
    /// Held movement keys advance by `delta_time`; pointer events follow in the
    /// order they arrived. The queue is empty afterwards.
    pub fn apply(&mut self, camera: &mut Camera, delta_time: f32) -> FrameInput {
        for direction in &self.held {
            camera.process_keyboard(*direction, delta_time);
        }

        for event in self.pointer.drain(..) {
            match event {
                PointerEvent::CursorMoved { x, y } => camera.process_cursor_position(x, y),
                PointerEvent::Scrolled(y) => camera.process_mouse_scroll(y),
                PointerEvent::Reset => camera.reset_cursor(),
            }
        }

        let frame = FrameInput {
            toggle_projection: self.pending_toggles % 2 == 1,
            exit_requested: self.exit_requested,
        };
        if self.pending_toggles > 0 {
            tracing::debug!(toggles = self.pending_toggles, "projection toggle pressed");
        }
        self.pending_toggles = 0;
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn held_key_moves_every_frame_until_released() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        input.handle_action(Action::Move(CameraMovement::Forward), true);

        input.apply(&mut cam, 1.0);
        input.apply(&mut cam, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-4));

        input.handle_action(Action::Move(CameraMovement::Forward), false);
        input.apply(&mut cam, 1.0);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-4));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        input.handle_action(Action::Move(CameraMovement::Left), true);
        input.handle_action(Action::Move(CameraMovement::Right), true);
        input.apply(&mut cam, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), 1e-5));
    }

    #[test]
    fn pointer_events_apply_in_order_and_drain() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        input.cursor_moved(500.0, 500.0);
        input.cursor_moved(510.0, 500.0);
        input.scrolled(5.0);
        input.apply(&mut cam, 0.0);

        assert!((cam.yaw() - -89.0).abs() < 1e-5);
        assert_eq!(cam.zoom(), 40.0);

        // Nothing left to replay.
        input.apply(&mut cam, 0.0);
        assert!((cam.yaw() - -89.0).abs() < 1e-5);
        assert_eq!(cam.zoom(), 40.0);
    }

    #[test]
    fn toggle_fires_once_per_press() {
        let mut input = InputState::new();
        let mut cam = Camera::default();

        input.handle_action(Action::ToggleProjection, true);
        // Key repeat while held.
        input.handle_action(Action::ToggleProjection, true);
        assert!(input.apply(&mut cam, 0.0).toggle_projection);
        assert!(!input.apply(&mut cam, 0.0).toggle_projection);

        input.handle_action(Action::ToggleProjection, false);
        input.handle_action(Action::ToggleProjection, true);
        input.handle_action(Action::ToggleProjection, false);
        input.handle_action(Action::ToggleProjection, true);
        // Two presses within one frame cancel out.
        assert!(!input.apply(&mut cam, 0.0).toggle_projection);
    }

    #[test]
    fn focus_loss_releases_keys_and_reseeds_cursor() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        input.handle_action(Action::Move(CameraMovement::Up), true);
        input.cursor_moved(100.0, 100.0);
        input.focus_lost();
        input.cursor_moved(700.0, 100.0);
        input.apply(&mut cam, 1.0);

        assert!(!input.is_held(CameraMovement::Up));
        assert_eq!(cam.yaw(), -90.0);
    }

    #[test]
    fn exit_is_sticky() {
        let mut input = InputState::new();
        let mut cam = Camera::default();
        input.handle_action(Action::Exit, true);
        input.handle_action(Action::Exit, false);
        assert!(input.apply(&mut cam, 0.0).exit_requested);
    }
}
