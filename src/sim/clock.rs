//! Frame clock
//!
//! Converts host refresh timestamps into simulation deltas. The delta is
//! clamped so a slow frame or a resumed tab never produces a huge physics
//! step, and nothing advances while the run is halted or the page is hidden.

/// Clamp a raw delta into `[0, max_dt]`; non-finite input becomes zero
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    dt.min(max_dt.max(0.0))
}

/// Tracks the previous refresh timestamp
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_dt: f32,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            max_dt,
            last_ms: None,
        }
    }

    /// Advance to `now_ms`.
    ///
    /// Returns `None` when the frame must be skipped (not running, or the
    /// host is hidden); the stored timestamp is forgotten so the next live
    /// frame starts from a zero delta instead of a catch-up step.
    pub fn advance(&mut self, now_ms: f64, visible: bool, running: bool) -> Option<f32> {
        if !running || !visible || !now_ms.is_finite() {
            self.last_ms = None;
            return None;
        }

        let last = self.last_ms.unwrap_or(now_ms);
        self.last_ms = Some(now_ms);
        let raw = ((now_ms - last) / 1000.0) as f32;
        Some(clamp_dt(raw, self.max_dt))
    }

    /// Forget the previous timestamp
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }
}
