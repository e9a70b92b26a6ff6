use std::time::Instant;

/// Longest frame delta handed to the camera, in seconds. A stall (window
/// drag, debugger pause) would otherwise teleport the camera.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Source of per-frame elapsed time.
pub trait Clock {
    /// Seconds since the previous call, never negative.
    fn delta_seconds(&mut self) -> f32;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn delta_seconds(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DELTA)
    }
}

/// Clock that advances by the same step every frame.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    step: f32,
}

impl FixedClock {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(0.0),
        }
    }

    /// Sixty frames per second.
    pub fn sixty_hz() -> Self {
        Self::new(1.0 / 60.0)
    }
}

impl Clock for FixedClock {
    fn delta_seconds(&mut self) -> f32 {
        self.step
    }
}
