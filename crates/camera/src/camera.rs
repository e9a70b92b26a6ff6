use crate::projection::ProjectionMode;
use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Pitch is held strictly inside `(-PITCH_LIMIT, PITCH_LIMIT)` degrees.
pub const PITCH_LIMIT: f32 = 89.0;
/// Largest pitch magnitude the camera will take.
pub const MAX_PITCH: f32 = PITCH_LIMIT - 1.0e-3;
/// Narrowest field of view, in degrees.
pub const ZOOM_MIN: f32 = 1.0;
/// Widest field of view, in degrees.
pub const ZOOM_MAX: f32 = 45.0;

/// Direction of a keyboard-driven camera move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Construction-time camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Degrees. -90 looks down -Z.
    pub yaw: f32,
    /// Degrees.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Degrees per pixel.
    pub mouse_sensitivity: f32,
    pub near: f32,
    pub far: f32,
    /// Half height of the orthographic volume at the widest zoom.
    pub ortho_half_height: f32,
}

/// A camera setting that would make the view or projection degenerate.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CameraConfigError {
    #[error("camera field `{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("near plane must be positive, got {near}")]
    NearNotPositive { near: f32 },
    #[error("far plane {far} must lie beyond the near plane {near}")]
    FarBeforeNear { near: f32, far: f32 },
    #[error("orthographic half height must be positive, got {0}")]
    OrthoHeightNotPositive(f32),
}

impl CameraConfig {
    /// Reject settings that produce non-finite matrices.
    ///
    /// Pitch and zoom out of range are fine here; [`Camera::new`] clamps them.
    pub fn validate(&self) -> Result<(), CameraConfigError> {
        let fields = [
            ("position.x", self.position.x),
            ("position.y", self.position.y),
            ("position.z", self.position.z),
            ("yaw", self.yaw),
            ("pitch", self.pitch),
            ("zoom", self.zoom),
            ("movement_speed", self.movement_speed),
            ("mouse_sensitivity", self.mouse_sensitivity),
            ("near", self.near),
            ("far", self.far),
            ("ortho_half_height", self.ortho_half_height),
        ];
        if let Some(&(field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CameraConfigError::NotFinite { field, value });
        }
        if self.near <= 0.0 {
            return Err(CameraConfigError::NearNotPositive { near: self.near });
        }
        if self.far <= self.near {
            return Err(CameraConfigError::FarBeforeNear {
                near: self.near,
                far: self.far,
            });
        }
        if self.ortho_half_height <= 0.0 {
            return Err(CameraConfigError::OrthoHeightNotPositive(
                self.ortho_half_height,
            ));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: -90.0,
            pitch: 0.0,
            zoom: ZOOM_MAX,
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            near: 0.1,
            far: 100.0,
            ortho_half_height: 5.0,
        }
    }
}

/// First-person fly camera.
///
/// Orientation is stored as yaw/pitch in degrees; the `front`/`right`/`up`
/// basis is derived from them and never set on its own, so the fields are
/// private and every mutation goes through a method that re-establishes the
/// clamps.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    zoom: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    near: f32,
    far: f32,
    ortho_half_height: f32,
    /// Last absolute cursor position. `None` until the first sample arrives.
    last_cursor: Option<Vec2>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            position: config.position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: wrap_degrees(config.yaw),
            pitch: config.pitch.clamp(-MAX_PITCH, MAX_PITCH),
            zoom: config.zoom.clamp(ZOOM_MIN, ZOOM_MAX),
            movement_speed: config.movement_speed,
            mouse_sensitivity: config.mouse_sensitivity,
            near: config.near,
            far: config.far,
            ortho_half_height: config.ortho_half_height,
            last_cursor: None,
        };
        camera.update_vectors();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn world_up(&self) -> Vec3 {
        self.world_up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    /// Move along the camera basis for `delta_time` seconds.
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        // NaN.max(0.0) is 0.0, so a bad clock sample cannot poison the position.
        let velocity = self.movement_speed * delta_time.max(0.0);
        let axis = match direction {
            CameraMovement::Forward => self.front,
            CameraMovement::Backward => -self.front,
            CameraMovement::Right => self.right,
            CameraMovement::Left => -self.right,
            CameraMovement::Up => self.up,
            CameraMovement::Down => -self.up,
        };
        self.position += axis * velocity;
    }

    /// Rotate by a cursor delta in pixels. Positive `y_offset` looks up.
    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        if !x_offset.is_finite() || !y_offset.is_finite() {
            tracing::warn!(x_offset, y_offset, "ignoring non-finite mouse delta");
            return;
        }

        self.yaw = wrap_degrees(self.yaw + x_offset * self.mouse_sensitivity);
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
        self.update_vectors();
    }

    /// Feed an absolute cursor position in window pixels.
    ///
    /// The first sample only records the baseline. Screen y grows downward, so
    /// the vertical delta is inverted before it reaches the pitch.
    pub fn process_cursor_position(&mut self, x: f32, y: f32) {
        let current = Vec2::new(x, y);
        let Some(last) = self.last_cursor.replace(current) else {
            tracing::debug!(x, y, "seeded cursor baseline");
            return;
        };
        self.process_mouse_movement(current.x - last.x, last.y - current.y);
    }

    /// Forget the cursor baseline; the next sample seeds it again.
    pub fn reset_cursor(&mut self) {
        self.last_cursor = None;
    }

    /// Narrow or widen the field of view. Positive `y_offset` zooms in.
    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        if !y_offset.is_finite() {
            tracing::warn!(y_offset, "ignoring non-finite scroll offset");
            return;
        }
        self.zoom = (self.zoom - y_offset).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Projection for a viewport of the given width/height ratio.
    pub fn projection_matrix(&self, aspect: f32, mode: ProjectionMode) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        match mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh(self.zoom.to_radians(), aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_half_height * (self.zoom / ZOOM_MAX);
                let half_width = half_height * aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Map an angle in degrees into [-180, 180).
fn wrap_degrees(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(CameraConfig::default().validate(), Ok(()));
    }

    #[test]
    fn degenerate_clip_planes_are_rejected() {
        let base = CameraConfig::default();
        let cases = [
            (
                CameraConfig { near: 0.0, ..base },
                CameraConfigError::NearNotPositive { near: 0.0 },
            ),
            (
                CameraConfig { far: 0.1, ..base },
                CameraConfigError::FarBeforeNear { near: 0.1, far: 0.1 },
            ),
            (
                CameraConfig {
                    ortho_half_height: -1.0,
                    ..base
                },
                CameraConfigError::OrthoHeightNotPositive(-1.0),
            ),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(), Err(expected));
        }
    }

    #[test]
    fn non_finite_fields_are_named() {
        let config = CameraConfig {
            mouse_sensitivity: f32::INFINITY,
            ..CameraConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CameraConfigError::NotFinite {
                field: "mouse_sensitivity",
                ..
            })
        ));
    }

    #[test]
    fn valid_config_yields_finite_projections() {
        let config = CameraConfig {
            near: 0.5,
            far: 0.6,
            ortho_half_height: 0.01,
            ..CameraConfig::default()
        };
        config.validate().unwrap();
        let camera = Camera::new(config);
        for mode in [ProjectionMode::Perspective, ProjectionMode::Orthographic] {
            assert!(camera.projection_matrix(1.0, mode).is_finite());
        }
    }

    /// Deterministic xorshift sequence in [-range, range).
    struct Noise(u32);

    impl Noise {
        fn next(&mut self, range: f32) -> f32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            (self.0 as f32 / u32::MAX as f32 * 2.0 - 1.0) * range
        }
    }

    fn assert_orthonormal(cam: &Camera) {
        for v in [cam.front(), cam.right(), cam.up()] {
            assert!((v.length() - 1.0).abs() < EPS, "not unit: {v:?}");
        }
        assert!(cam.front().dot(cam.right()).abs() < EPS);
        assert!(cam.front().dot(cam.up()).abs() < EPS);
        assert!(cam.right().dot(cam.up()).abs() < EPS);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let cam = Camera::default();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 3.0));
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
        assert_eq!(cam.world_up(), Vec3::Y);
        assert_eq!(cam.zoom(), 45.0);
    }

    #[test]
    fn pitch_stays_strictly_inside_limit() {
        let mut cam = Camera::default();
        let mut noise = Noise(0x9e37_79b9);
        for _ in 0..2_000 {
            cam.process_mouse_movement(noise.next(5_000.0), noise.next(5_000.0));
            assert!(cam.pitch() > -PITCH_LIMIT && cam.pitch() < PITCH_LIMIT);
        }

        cam.process_mouse_movement(0.0, 1.0e9);
        assert!(cam.pitch() < PITCH_LIMIT);
        cam.process_mouse_movement(0.0, -1.0e9);
        assert!(cam.pitch() > -PITCH_LIMIT);
    }

    #[test]
    fn zoom_stays_in_range() {
        let mut cam = Camera::default();
        let mut noise = Noise(42);
        for _ in 0..1_000 {
            cam.process_mouse_scroll(noise.next(100.0));
            assert!((ZOOM_MIN..=ZOOM_MAX).contains(&cam.zoom()));
        }

        cam.process_mouse_scroll(1.0e6);
        assert_eq!(cam.zoom(), ZOOM_MIN);
        cam.process_mouse_scroll(-1.0e6);
        assert_eq!(cam.zoom(), ZOOM_MAX);
    }

    #[test]
    fn scroll_zooms_in_for_positive_offset() {
        let mut cam = Camera::default();
        cam.process_mouse_scroll(5.0);
        assert_eq!(cam.zoom(), 40.0);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut cam = Camera::default();
        let mut noise = Noise(7);
        for _ in 0..1_000 {
            cam.process_mouse_movement(noise.next(800.0), noise.next(800.0));
            assert_orthonormal(&cam);
        }
        // Pinned against the pole.
        cam.process_mouse_movement(0.0, 10_000.0);
        assert_orthonormal(&cam);
    }

    #[test]
    fn first_cursor_sample_only_seeds() {
        let mut cam = Camera::default();
        let (yaw, pitch) = (cam.yaw(), cam.pitch());

        cam.process_cursor_position(500.0, 500.0);
        assert_eq!(cam.yaw(), yaw);
        assert_eq!(cam.pitch(), pitch);

        cam.process_cursor_position(510.0, 505.0);
        let s = cam.mouse_sensitivity();
        assert!((cam.yaw() - (yaw + 10.0 * s)).abs() < EPS);
        // Cursor moved down the screen, so the camera looks down.
        assert!((cam.pitch() - (pitch - 5.0 * s)).abs() < EPS);
    }

    #[test]
    fn reset_cursor_reseeds() {
        let mut cam = Camera::default();
        cam.process_cursor_position(100.0, 100.0);
        cam.reset_cursor();
        let yaw = cam.yaw();
        cam.process_cursor_position(900.0, 100.0);
        assert_eq!(cam.yaw(), yaw);
    }

    #[test]
    fn forward_movement_is_front_times_speed() {
        let mut cam = Camera::default();
        let start = cam.position();
        let expected = start + cam.front() * cam.movement_speed();
        cam.process_keyboard(CameraMovement::Forward, 1.0);
        assert!(cam.position().abs_diff_eq(expected, EPS));
    }

    #[test]
    fn movement_uses_each_basis_axis() {
        let cases = [
            (CameraMovement::Forward, Vec3::NEG_Z),
            (CameraMovement::Backward, Vec3::Z),
            (CameraMovement::Right, Vec3::X),
            (CameraMovement::Left, Vec3::NEG_X),
            (CameraMovement::Up, Vec3::Y),
            (CameraMovement::Down, Vec3::NEG_Y),
        ];
        for (direction, axis) in cases {
            let mut cam = Camera::default();
            let start = cam.position();
            cam.process_keyboard(direction, 2.0);
            let moved = cam.position() - start;
            assert!(
                moved.abs_diff_eq(axis * 2.5 * 2.0, 1e-4),
                "{direction:?} moved {moved:?}"
            );
        }
    }

    #[test]
    fn negative_or_nan_delta_does_not_move() {
        let mut cam = Camera::default();
        let start = cam.position();
        cam.process_keyboard(CameraMovement::Forward, -1.0);
        cam.process_keyboard(CameraMovement::Forward, f32::NAN);
        assert_eq!(cam.position(), start);
    }

    #[test]
    fn non_finite_mouse_input_is_ignored() {
        let mut cam = Camera::default();
        cam.process_mouse_movement(f32::INFINITY, 1.0);
        cam.process_mouse_scroll(f32::NAN);
        assert_eq!(cam.yaw(), -90.0);
        assert_eq!(cam.zoom(), 45.0);
        assert_orthonormal(&cam);
    }

    #[test]
    fn yaw_wraps_without_changing_direction() {
        let mut cam = Camera::default();
        let front = cam.front();
        // Ten full turns at 0.1 degrees per pixel.
        cam.process_mouse_movement(36_000.0, 0.0);
        assert!(cam.yaw() >= -180.0 && cam.yaw() < 180.0);
        assert!(cam.front().abs_diff_eq(front, 1e-4));
    }

    #[test]
    fn view_matrix_matches_reference_look_at() {
        let cam = Camera::default();
        let eye = Vec3::new(0.0, 0.0, 3.0);
        let target = Vec3::new(0.0, 0.0, 2.0);
        let up = Vec3::Y;

        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);
        let reference = Mat4::from_cols(
            glam::Vec4::new(s.x, u.x, -f.x, 0.0),
            glam::Vec4::new(s.y, u.y, -f.y, 0.0),
            glam::Vec4::new(s.z, u.z, -f.z, 0.0),
            glam::Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        );

        assert!(cam.view_matrix().abs_diff_eq(reference, EPS));
        // The eye maps to the origin of view space.
        assert!(cam.view_matrix().transform_point3(eye).abs_diff_eq(Vec3::ZERO, EPS));
    }

    #[test]
    fn perspective_uses_zoom_as_fov() {
        let mut cam = Camera::default();
        cam.process_mouse_scroll(15.0);
        let proj = cam.projection_matrix(4.0 / 3.0, ProjectionMode::Perspective);
        let expected = Mat4::perspective_rh(30.0_f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        assert!(proj.abs_diff_eq(expected, EPS));
    }

    #[test]
    fn orthographic_volume_matches_viewport() {
        let cam = Camera::default();
        let proj = cam.projection_matrix(2.0, ProjectionMode::Orthographic);
        let expected = Mat4::orthographic_rh(-10.0, 10.0, -5.0, 5.0, 0.1, 100.0);
        assert!(proj.abs_diff_eq(expected, EPS));
        assert!(!proj.abs_diff_eq(
            cam.projection_matrix(2.0, ProjectionMode::Perspective),
            EPS
        ));
    }

    #[test]
    fn degenerate_aspect_falls_back_to_square() {
        let cam = Camera::default();
        let proj = cam.projection_matrix(0.0, ProjectionMode::Perspective);
        assert_eq!(proj, cam.projection_matrix(1.0, ProjectionMode::Perspective));
    }

    #[test]
    fn config_values_are_clamped_on_construction() {
        let cam = Camera::new(CameraConfig {
            pitch: 120.0,
            zoom: 90.0,
            ..CameraConfig::default()
        });
        assert_eq!(cam.pitch(), MAX_PITCH);
        assert_eq!(cam.zoom(), ZOOM_MAX);
        assert_orthonormal(&cam);
    }

    #[test]
    fn config_fills_missing_fields_from_defaults() {
        let config: CameraConfig = serde_json::from_str(r#"{ "movement_speed": 5.0 }"#).unwrap();
        assert_eq!(config.movement_speed, 5.0);
        assert_eq!(config.yaw, -90.0);
        assert_eq!(config.position, Vec3::new(0.0, 0.0, 3.0));
    }
}
