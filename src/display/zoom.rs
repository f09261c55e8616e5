/// Default multiplier applied per wheel notch
pub const DEFAULT_ZOOM_STEP: f32 = 1.1;

/// Largest factor reachable by zooming in
pub const MAX_ZOOM_FACTOR: f32 = 8.0;

/// Zoom state for the image display.
///
/// The level counts wheel notches above the neutral fit, so the factor is
/// `step^level`. Zooming out from level 0 stays at 0, which keeps the
/// factor at or above 1.0 and makes "back to neutral" an exact check.
/// Zooming in stops at the last level whose factor is within
/// [`MAX_ZOOM_FACTOR`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    step: f32,
    level: u32,
    max_level: u32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_STEP)
    }
}

impl Zoom {
    /// A step that is not finite or not above 1.0 is replaced by
    /// [`DEFAULT_ZOOM_STEP`]
    pub fn new(step: f32) -> Self {
        let step = if step.is_finite() && step > 1.0 {
            step
        } else {
            tracing::warn!("Invalid zoom step {}, using {}", step, DEFAULT_ZOOM_STEP);
            DEFAULT_ZOOM_STEP
        };
        // Nudge before flooring so exact powers (2.0^3 = 8.0) are kept
        let max_level = (MAX_ZOOM_FACTOR.ln() / step.ln() + 1e-4).floor().max(0.0) as u32;

        Self {
            step,
            level: 0,
            max_level,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Current scale factor (1.0 = fitted to the viewport)
    pub fn factor(&self) -> f32 {
        self.step.powi(self.level as i32)
    }

    pub fn is_neutral(&self) -> bool {
        self.level == 0
    }

    pub fn zoom_in(&mut self) {
        self.level = (self.level + 1).min(self.max_level);
    }

    pub fn zoom_out(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.level = 0;
    }
}
