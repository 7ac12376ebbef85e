//! Timed transitions for render passes
//!
//! Every pass animates on one shared clock with a fixed duration and cubic
//! in-out easing; nothing is staggered.
//!
//! # EGUI-RULES Compliance
//! - Animation state is UI-only (not tree data)
//! - No callbacks - values are polled each frame
//! - Call `tick(dt)` at start of update(), then render with sampled values
//!
//! The duration comes from `config/hierarchy_settings.yaml` via `global_config()`.

use egui::{Pos2, Rect};

use crate::config::global_config;

/// Cubic in-out easing over `t` in 0..=1
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

// =============================================================================
// LERP
// =============================================================================

/// Linear interpolation between two values of the same kind
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Pos2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Pos2::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

impl Lerp for Rect {
    fn lerp(self, to: Self, t: f32) -> Self {
        Rect::from_min_max(self.min.lerp(to.min, t), self.max.lerp(to.max, t))
    }
}

/// Start and end value of one animated property
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T) -> Self {
        Self { from, to }
    }

    /// A tween that holds one value
    pub fn still(value: T) -> Self {
        Self::new(value, value)
    }

    /// Value at eased progress `t`
    pub fn sample(&self, t: f32) -> T {
        self.from.lerp(self.to, t)
    }
}

// =============================================================================
// TRANSITION CLOCK
// =============================================================================

/// Shared clock for one batch of transitions
///
/// # Usage
/// ```ignore
/// let mut clock = TransitionClock::new(0.75);
/// clock.restart();
///
/// // Each frame:
/// clock.tick(dt);
/// let t = clock.progress();  // eased 0..=1
/// ```
#[derive(Debug, Clone)]
pub struct TransitionClock {
    elapsed: f32,
    duration: f32,
}

impl Default for TransitionClock {
    fn default() -> Self {
        Self::new(global_config().animation.duration_secs())
    }
}

impl TransitionClock {
    /// A finished clock with the given duration in seconds
    pub fn new(duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            elapsed: duration,
            duration,
        }
    }

    /// Start a new batch from zero
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    /// Advance by `dt` seconds. Returns true on the tick that completes the batch.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.is_running() {
            return false;
        }
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        !self.is_running()
    }

    /// Jump to the end of the batch
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }

    pub fn is_running(&self) -> bool {
        self.elapsed < self.duration
    }

    /// Linear progress 0..=1
    pub fn linear(&self) -> f32 {
        if self.duration <= f32::EPSILON {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    /// Eased progress 0..=1
    pub fn progress(&self) -> f32 {
        ease_cubic_in_out(self.linear())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_hits_endpoints_and_midpoint() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
        assert!(ease_cubic_in_out(0.75) > 0.75);
    }

    #[test]
    fn clock_runs_to_completion() {
        let mut clock = TransitionClock::new(0.75);
        assert!(!clock.is_running());
        clock.restart();
        assert!(clock.is_running());
        assert_eq!(clock.progress(), 0.0);
        assert!(!clock.tick(0.5));
        assert!(clock.tick(0.5));
        assert!(!clock.is_running());
        assert_eq!(clock.progress(), 1.0);
        assert!(!clock.tick(0.1));
    }

    #[test]
    fn zero_duration_is_always_done() {
        let mut clock = TransitionClock::new(0.0);
        clock.restart();
        assert!(!clock.is_running());
        assert_eq!(clock.progress(), 1.0);
    }

    #[test]
    fn tween_samples_between_endpoints() {
        let tween = Tween::new(Pos2::new(0.0, 10.0), Pos2::new(100.0, 20.0));
        assert_eq!(tween.sample(0.0), Pos2::new(0.0, 10.0));
        assert_eq!(tween.sample(0.5), Pos2::new(50.0, 15.0));
        assert_eq!(tween.sample(1.0), Pos2::new(100.0, 20.0));
    }
}
