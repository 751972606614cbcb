//! Animation system.
//!
//! Animations only advance inside Update. A node's bounds animation moves its
//! relative bounds and alpha toward a target; requesting a new target while
//! one is in flight restarts from the current value. No queue.

use crate::layout::Rect;
use serde::{Deserialize, Serialize};

/// Distance to target below which an animation is considered finished.
pub const SETTLE_TOLERANCE: f32 = 1e-4;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Exponential ease-out (sharp snap to target).
    #[default]
    ExponentialOut,
    /// Exponential ease-in (accelerating).
    ExponentialIn,
    /// Exponential ease-in-out.
    ExponentialInOut,
    /// Instant (no animation).
    Instant,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::ExponentialOut => {
                // 1 - 2^(-10t)
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExponentialIn => {
                // 2^(10(t-1))
                if t <= 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * (t - 1.0))
                }
            }
            Self::ExponentialInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::Instant => 1.0,
        }
    }
}

/// Timing policy applied to every animation the tree starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationConfig {
    /// Duration in seconds.
    pub duration: f32,
    /// Easing curve.
    pub easing: Easing,
}

impl AnimationConfig {
    /// Default animation duration.
    pub const DEFAULT_DURATION: f32 = 0.15;

    /// Creates a config.
    #[must_use]
    pub const fn new(duration: f32, easing: Easing) -> Self {
        Self { duration, easing }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION, Easing::ExponentialOut)
    }
}

/// A single animated value.
#[derive(Debug, Clone)]
pub struct Animation {
    /// Current value.
    current: f32,
    /// Target value.
    target: f32,
    /// Animation progress (0-1).
    progress: f32,
    /// Animation duration (seconds).
    duration: f32,
    /// Easing function.
    easing: Easing,
    /// Start value (for interpolation).
    start: f32,
}

impl Animation {
    /// Creates a new animation at the given value.
    #[must_use]
    pub fn new(value: f32, easing: Easing) -> Self {
        Self {
            current: value,
            target: value,
            progress: 1.0,
            duration: AnimationConfig::DEFAULT_DURATION,
            easing,
            start: value,
        }
    }

    /// Creates an animation with custom duration.
    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Returns the target value.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Returns true if the animation is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Sets a new target value, starting animation from current value.
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() > SETTLE_TOLERANCE {
            self.start = self.current;
            self.target = target;
            self.progress = 0.0;
        }
    }

    /// Immediately sets the value without animation.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.start = value;
        self.progress = 1.0;
    }

    /// Updates the animation.
    ///
    /// `dt` is delta time in seconds.
    pub fn update(&mut self, dt: f32) {
        if self.progress >= 1.0 {
            return;
        }

        if self.duration > 0.0 {
            self.progress += dt.max(0.0) / self.duration;
        } else {
            self.progress = 1.0;
        }

        self.progress = self.progress.min(1.0);

        let eased = self.easing.apply(self.progress);
        self.current = self.start + (self.target - self.start) * eased;

        // Snap to target when complete
        if self.progress >= 1.0 {
            self.current = self.target;
        }
    }

    /// Finishes early once within tolerance of the target.
    fn settle(&mut self) -> bool {
        if self.is_complete() || (self.target - self.current).abs() <= SETTLE_TOLERANCE {
            self.set_immediate(self.target);
            return true;
        }
        false
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(0.0, Easing::ExponentialOut)
    }
}

/// Per-node animation of relative bounds and alpha.
#[derive(Debug, Clone)]
pub struct BoundsAnimation {
    x: Animation,
    y: Animation,
    width: Animation,
    height: Animation,
    alpha: Animation,
}

impl BoundsAnimation {
    /// Creates an animation resting at the given bounds and alpha.
    #[must_use]
    pub fn new(bounds: Rect, alpha: f32, config: AnimationConfig) -> Self {
        let channel =
            |value: f32| Animation::new(value, config.easing).with_duration(config.duration);
        Self {
            x: channel(bounds.x),
            y: channel(bounds.y),
            width: channel(bounds.width),
            height: channel(bounds.height),
            alpha: channel(alpha),
        }
    }

    /// Retargets every channel, starting from the current values.
    pub fn set_target(&mut self, bounds: Rect, alpha: f32) {
        self.x.set_target(bounds.x);
        self.y.set_target(bounds.y);
        self.width.set_target(bounds.width);
        self.height.set_target(bounds.height);
        self.alpha.set_target(alpha);
    }

    /// Returns the current bounds and alpha.
    #[must_use]
    pub fn current(&self) -> (Rect, f32) {
        (
            Rect::new(
                self.x.value(),
                self.y.value(),
                self.width.value(),
                self.height.value(),
            ),
            self.alpha.value(),
        )
    }

    /// Returns the target bounds and alpha.
    #[must_use]
    pub fn target(&self) -> (Rect, f32) {
        (
            Rect::new(
                self.x.target(),
                self.y.target(),
                self.width.target(),
                self.height.target(),
            ),
            self.alpha.target(),
        )
    }

    /// Advances all channels.
    ///
    /// Returns true once every channel sits exactly on its target; the
    /// caller should then drop the animation.
    pub fn update(&mut self, dt: f32) -> bool {
        self.x.update(dt);
        self.y.update(dt);
        self.width.update(dt);
        self.height.update(dt);
        self.alpha.update(dt);

        // Non-short-circuiting so every channel gets pinned.
        let settled = [
            self.x.settle(),
            self.y.settle(),
            self.width.settle(),
            self.height.settle(),
            self.alpha.settle(),
        ];
        settled.iter().all(|s| *s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_out_is_sharp() {
        let value = Easing::ExponentialOut.apply(0.3);
        assert!(value > 0.8, "Exponential out should snap quickly: {value}");
    }

    #[test]
    fn test_easings_are_monotonic() {
        for easing in [
            Easing::Linear,
            Easing::ExponentialOut,
            Easing::ExponentialIn,
            Easing::ExponentialInOut,
        ] {
            let mut last = easing.apply(0.0);
            for step in 1..=100 {
                let v = easing.apply(step as f32 / 100.0);
                assert!(v >= last, "{easing:?} went backwards at {step}");
                last = v;
            }
            assert_eq!(easing.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut anim = Animation::new(0.0, Easing::ExponentialOut);
        anim.set_target(100.0);

        for _ in 0..20 {
            anim.update(0.016);
        }

        assert!((anim.value() - 100.0).abs() < 0.01);
        assert!(anim.is_complete());
    }

    #[test]
    fn test_bounds_animation_pins_exactly() {
        let config = AnimationConfig::new(0.1, Easing::Linear);
        let mut anim = BoundsAnimation::new(Rect::new(0.0, 0.0, 0.5, 0.5), 1.0, config);
        let target = Rect::new(0.3, 0.1, 0.2, 0.7);
        anim.set_target(target, 0.25);

        let mut done = false;
        for _ in 0..20 {
            if anim.update(0.016) {
                done = true;
                break;
            }
        }
        assert!(done);
        assert_eq!(anim.current(), (target, 0.25));
    }

    #[test]
    fn test_retarget_starts_from_current() {
        let config = AnimationConfig::new(1.0, Easing::Linear);
        let mut anim = BoundsAnimation::new(Rect::ZERO, 1.0, config);
        anim.set_target(Rect::new(1.0, 0.0, 0.0, 0.0), 1.0);
        anim.update(0.5);
        let (mid, _) = anim.current();
        assert!((mid.x - 0.5).abs() < 1e-5);

        anim.set_target(Rect::ZERO, 1.0);
        anim.update(0.5);
        let (back, _) = anim.current();
        assert!((back.x - 0.25).abs() < 1e-5);
    }
}
