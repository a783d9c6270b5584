//! Explicit timer-driven interpolation
//!
//! Animations here are plain value producers: construct one with a start
//! instant, then sample `value_at(now)` from whatever loop drives rendering.
//! They are finite, restartable by constructing anew, and carry no timers or
//! threads of their own, so controllers can drop one to cancel it and tests
//! can drive them with synthetic instants.

use std::time::{Duration, Instant};

/// Interpolation curve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Smooth S-curve tween
    EaseInOut,
    /// Overshoots the target then settles back; used for the snap bounce.
    /// Output briefly exceeds 1.0.
    Overshoot,
}

impl Easing {
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Easing::Overshoot => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let u = t - 1.0;
                1.0 + c3 * u * u * u + c1 * u * u
            }
        }
    }
}

/// One scalar interpolated from `from` to `to` over a fixed duration
#[derive(Debug, Clone)]
pub struct Animation {
    from: f32,
    to: f32,
    duration: Duration,
    easing: Easing,
    started_at: Instant,
}

impl Animation {
    pub fn new(from: f32, to: f32, duration: Duration, easing: Easing, now: Instant) -> Self {
        Self {
            from,
            to,
            duration,
            easing,
            started_at: now,
        }
    }

    /// Final value the animation settles at
    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * self.easing.apply(t)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Paired alpha/scale transition for fade+scale window effects
#[derive(Debug, Clone)]
pub struct FadeScale {
    alpha: Animation,
    scale: Animation,
}

impl FadeScale {
    /// Transition from the window's current visual toward a preset
    pub fn toward(
        current: (f32, f32),
        target: (f32, f32),
        duration: Duration,
        easing: Easing,
        now: Instant,
    ) -> Self {
        Self {
            alpha: Animation::new(current.0, target.0, duration, easing, now),
            scale: Animation::new(current.1, target.1, duration, easing, now),
        }
    }

    pub fn target(&self) -> (f32, f32) {
        (self.alpha.target(), self.scale.target())
    }

    pub fn value_at(&self, now: Instant) -> (f32, f32) {
        (self.alpha.value_at(now), self.scale.value_at(now))
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.alpha.is_finished(now) && self.scale.is_finished(now)
    }
}
