//! Easing curves and single-value tweens

use serde::Deserialize;

/// Timing curve applied to a tween's normalized progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum Ease {
    #[serde(rename = "linear", alias = "none")]
    Linear,
    #[serde(rename = "power1.in")]
    Power1In,
    #[serde(rename = "power1.out")]
    Power1Out,
    /// Accelerate then decelerate
    #[serde(rename = "power1.inOut")]
    Power1InOut,
}

impl Ease {
    /// Map progress `t` to eased progress. `t` is clamped into [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => t * t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let inv = 1.0 - t;
                    1.0 - 2.0 * inv * inv
                }
            }
        }
    }
}

/// Animates one value from `from` to `to` after `delay`, over `duration`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub delay: f32,
    pub duration: f32,
    pub ease: Ease,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self { from, to, delay: 0.0, duration, ease: Ease::Linear }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Local time at which the tween settles on `to`
    pub fn end_time(&self) -> f32 {
        self.delay + self.duration
    }

    /// Linear progress in [0, 1] at local time `t`
    pub fn progress_at(&self, t: f32) -> f32 {
        if t <= self.delay {
            return if self.duration <= 0.0 && t >= self.delay { 1.0 } else { 0.0 };
        }
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((t - self.delay) / self.duration).min(1.0)
    }

    /// Tweened value at local time `t`
    pub fn value_at(&self, t: f32) -> f32 {
        let eased = self.ease.apply(self.progress_at(t));
        self.from + (self.to - self.from) * eased
    }
}
