//! # Volume Envelopes
//!
//! Pure fade math. A [`FadePlan`] describes a ramp from a start to a target
//! gain in a fixed number of discrete steps; the asset drives it one step per
//! scheduled callback and owns the cancellation token.
//!
//! - Linear ramps advance by a constant delta and stay inside the range spanned
//!   by start and target.
//! - Exponential ramps multiply by a constant ratio. Start and target are
//!   floored at the configured zero volume so the ratio stays finite.
//!
//! A fade whose duration is shorter than one step has no plan; callers apply
//! the target immediately.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCurve {
    Linear,
    Exponential,
}

/// What happens to the channel once the last step was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeCompletion {
    /// Keep playing at the target volume.
    Hold,
    /// Pause the channel.
    Pause,
    /// Stop the asset and dispatch `complete`.
    Stop,
}

/// A precomputed volume ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadePlan {
    curve: FadeCurve,
    start: f32,
    target: f32,
    steps: u32,
    interval: Duration,
    /// Per-step delta (linear) or ratio (exponential).
    factor: f32,
    floor: f32,
    ceiling: f32,
    completion: FadeCompletion,
}

impl FadePlan {
    /// Linear ramp from `start` to `target` over `duration`.
    pub fn linear(start: f32, target: f32, duration: Duration, interval: Duration) -> Option<Self> {
        let steps = step_count(duration, interval)?;
        Some(Self {
            curve: FadeCurve::Linear,
            start,
            target,
            steps,
            interval,
            factor: (target - start) / steps as f32,
            floor: start.min(target).max(0.0),
            ceiling: start.max(target),
            completion: FadeCompletion::Hold,
        })
    }

    /// Perceptual ramp from `start` to `target` over `duration`.
    pub fn exponential(
        start: f32,
        target: f32,
        duration: Duration,
        interval: Duration,
        zero_volume: f32,
        max_volume: f32,
    ) -> Option<Self> {
        let steps = step_count(duration, interval)?;
        let start = start.clamp(zero_volume, max_volume);
        let target = target.clamp(zero_volume, max_volume);
        let ratio = (target / start).powf(1.0 / steps as f32);

        Some(Self {
            curve: FadeCurve::Exponential,
            start,
            target,
            steps,
            interval,
            factor: ratio,
            floor: zero_volume,
            ceiling: max_volume,
            completion: FadeCompletion::Hold,
        })
    }

    pub fn with_completion(mut self, completion: FadeCompletion) -> Self {
        self.completion = completion;
        self
    }

    /// Gain after `step` steps. The last step is pinned to the target.
    pub fn volume_at(&self, step: u32) -> f32 {
        if step >= self.steps {
            return self.target;
        }

        let volume = match self.curve {
            FadeCurve::Linear => self.start + self.factor * step as f32,
            FadeCurve::Exponential => self.start * self.factor.powi(step as i32),
        };
        volume.clamp(self.floor, self.ceiling)
    }

    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn completion(&self) -> FadeCompletion {
        self.completion
    }
}

fn step_count(duration: Duration, interval: Duration) -> Option<u32> {
    if interval.is_zero() {
        return None;
    }
    match duration.as_nanos() / interval.as_nanos() {
        0 => None,
        steps => Some(u32::try_from(steps).unwrap_or(u32::MAX)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(80);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_linear_fade_in() {
        let plan = FadePlan::linear(0.0, 0.8, Duration::from_millis(800), STEP).unwrap();
        assert_eq!(plan.steps(), 10);
        assert!(approx(plan.volume_at(1), 0.08));
        assert!(approx(plan.volume_at(5), 0.4));
        assert_eq!(plan.volume_at(10), 0.8);
    }

    #[test]
    fn test_linear_fade_out_stays_in_range() {
        let plan = FadePlan::linear(1.0, 0.0, Duration::from_secs(2), STEP).unwrap();
        assert_eq!(plan.steps(), 25);
        for step in 0..=plan.steps() {
            let volume = plan.volume_at(step);
            assert!((0.0..=1.0).contains(&volume));
        }
        assert!(plan.volume_at(24) > plan.volume_at(25));
        assert_eq!(plan.volume_at(25), 0.0);
    }

    #[test]
    fn test_short_fade_has_no_plan() {
        assert!(FadePlan::linear(0.0, 1.0, Duration::from_millis(79), STEP).is_none());
        assert!(FadePlan::linear(0.0, 1.0, Duration::ZERO, STEP).is_none());
        assert!(FadePlan::linear(0.0, 1.0, Duration::from_secs(1), Duration::ZERO).is_none());
    }

    #[test]
    fn test_exponential_uses_constant_ratio() {
        let plan =
            FadePlan::exponential(1.0, 0.01, Duration::from_millis(160), STEP, 0.001, 1.0).unwrap();
        assert_eq!(plan.steps(), 2);
        assert!(approx(plan.volume_at(1), 0.1));
        assert_eq!(plan.volume_at(2), 0.01);
    }

    #[test]
    fn test_exponential_floors_zero() {
        let plan =
            FadePlan::exponential(0.0, 1.0, Duration::from_millis(400), STEP, 0.001, 1.0).unwrap();
        assert!(plan.volume_at(0) >= 0.001);
        assert!(plan.volume_at(1).is_finite());
        assert!(plan.volume_at(3) > plan.volume_at(2));
        assert_eq!(plan.volume_at(plan.steps()), 1.0);

        let down =
            FadePlan::exponential(0.5, 0.0, Duration::from_millis(400), STEP, 0.001, 1.0).unwrap();
        assert_eq!(down.target(), 0.001);
    }

    #[test]
    fn test_completion_defaults_to_hold() {
        let plan = FadePlan::linear(0.0, 1.0, Duration::from_secs(1), STEP).unwrap();
        assert_eq!(plan.completion(), FadeCompletion::Hold);
        assert_eq!(
            plan.with_completion(FadeCompletion::Stop).completion(),
            FadeCompletion::Stop
        );
    }
}
