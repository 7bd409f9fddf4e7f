//! Smoothed control values for zipper-free parameter changes.
//!
//! Stepwise control changes (a knob jump, a new note pitch, a pitch-bend
//! message) must not reach the signal path as discontinuities. This module
//! provides two smoothers:
//!
//! - [`LinearSmoothedParam`]: constant-rate ramp that lands exactly on the
//!   goal after a fixed number of frames. Used for glide, pitch bend and
//!   vibrato depth.
//! - [`SmoothedParam`]: one-pole (RC-like) approach that snaps to the goal
//!   once the residual is inaudible. Used for filter modulation and volume.
//!
//! ## Usage
//!
//! ```rust
//! use polyanalog_core::LinearSmoothedParam;
//!
//! let mut pitch = LinearSmoothedParam::new(60.0);
//! pitch.set_transition_frames(480);
//! pitch.set_target(72.0);
//!
//! for _ in 0..480 {
//!     let _semitones = pitch.get_and_step();
//! }
//! assert_eq!(pitch.get(), 72.0);
//! ```

use libm::expf;

/// Residual below which the one-pole smoother is treated as converged.
const SETTLE_EPSILON: f32 = 1e-5;

/// A parameter with one-pole exponential smoothing.
///
/// Approaches its target along an exponential curve. Once the distance to
/// the target drops below a negligible threshold the value snaps, so the
/// tail is finite and [`is_settled`](Self::is_settled) becomes true.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Smoothing time in milliseconds
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with initial value and no smoothing.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Time constant in milliseconds
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the target value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap to it (no smoothing).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Set the time constant in milliseconds (0 = instant).
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let delta = self.target - self.current;
        if delta.abs() < SETTLE_EPSILON {
            self.current = self.target;
        } else {
            self.current += self.coeff * delta;
        }
        self.current
    }

    /// Get the current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the value has landed on the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    /// `coeff = 1 - exp(-1 / (tau * sample_rate))`, or 1.0 when smoothing is off.
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = self.smoothing_time_ms / 1000.0 * self.sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A parameter with a linear ramp over a fixed number of frames.
///
/// Every change of goal restarts the ramp from the current value, so the
/// value never jumps by more than one step per frame. The final step lands
/// exactly on the goal and intermediate values never pass it.
///
/// The ramp length can be changed while a ramp is running with
/// [`dezipper_check`](Self::dezipper_check), which re-plans the remaining
/// distance over the new length. This is how glide time follows a knob
/// turned during a slide.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    current: f32,
    target: f32,
    /// Increment per frame (signed)
    increment: f32,
    /// Frames left until `target` is reached
    frames_remaining: u32,
    /// Ramp length used for the next goal change
    transition_frames: u32,
}

impl LinearSmoothedParam {
    /// Create a new linear smoother resting at `initial` with an instant ramp.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            frames_remaining: 0,
            transition_frames: 0,
        }
    }

    /// Create a smoother whose ramp lasts `transition_ms` at `sample_rate`.
    pub fn with_config(initial: f32, sample_rate: f32, transition_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.set_transition_time_ms(transition_ms, sample_rate);
        param
    }

    /// Set a new goal and start ramping toward it.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        self.plan_ramp();
    }

    /// Snap to `value` with no ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.frames_remaining = 0;
    }

    /// Set the ramp length in frames for subsequent goal changes.
    pub fn set_transition_frames(&mut self, frames: u32) {
        self.transition_frames = frames;
    }

    /// Set the ramp length in milliseconds.
    pub fn set_transition_time_ms(&mut self, time_ms: f32, sample_rate: f32) {
        self.transition_frames = (time_ms.max(0.0) / 1000.0 * sample_rate) as u32;
    }

    /// Ramp length in frames.
    #[inline]
    pub fn transition_frames(&self) -> u32 {
        self.transition_frames
    }

    /// Adopt a new ramp length if it differs from the current one.
    ///
    /// When a ramp is in progress the remaining distance is re-planned over
    /// `frames`. Calling this every frame with an unchanged length is cheap.
    #[inline]
    pub fn dezipper_check(&mut self, frames: u32) {
        if frames != self.transition_frames {
            self.transition_frames = frames;
            if self.current != self.target {
                self.plan_ramp();
            }
        }
    }

    /// Return the current value, then advance one frame.
    #[inline]
    pub fn get_and_step(&mut self) -> f32 {
        let value = self.current;
        self.step();
        value
    }

    /// Advance one frame, then return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.step();
        self.current
    }

    /// Get the current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Get the goal.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True when no ramp is in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.frames_remaining == 0
    }

    /// Jump to the goal and cancel the ramp.
    pub fn snap_to_target(&mut self) {
        self.set_immediate(self.target);
    }

    fn plan_ramp(&mut self) {
        if self.transition_frames == 0 {
            self.set_immediate(self.target);
        } else {
            self.increment = (self.target - self.current) / self.transition_frames as f32;
            self.frames_remaining = self.transition_frames;
        }
    }

    #[inline]
    fn step(&mut self) {
        if self.frames_remaining == 0 {
            return;
        }
        self.frames_remaining -= 1;
        if self.frames_remaining == 0 {
            self.current = self.target;
            return;
        }
        let next = self.current + self.increment;
        // Rounding must never carry the value past the goal.
        self.current = if self.increment > 0.0 {
            next.min(self.target)
        } else {
            next.max(self.target)
        };
    }
}

impl Default for LinearSmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_param_instant_when_no_smoothing() {
        let mut param = SmoothedParam::new(1.0);
        param.set_smoothing_time_ms(0.0);

        param.set_target(0.5);
        let val = param.advance();
        assert!((val - 0.5).abs() < 1e-6, "Should snap instantly");
    }

    #[test]
    fn smoothed_param_converges_and_settles() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);

        for _ in 0..48000 {
            param.advance();
        }

        assert_eq!(param.get(), 1.0, "one-pole should snap once converged");
        assert!(param.is_settled());
    }

    #[test]
    fn smoothed_param_gradual_approach() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);

        for _ in 0..480 {
            param.advance();
        }

        let expected = 1.0 - expf(-1.0);
        assert!(
            (param.get() - expected).abs() < 0.05,
            "After one time constant, expected ~{}, got {}",
            expected,
            param.get()
        );
    }

    #[test]
    fn linear_reaches_goal_in_exact_frames() {
        let mut param = LinearSmoothedParam::new(0.0);
        param.set_transition_frames(100);
        param.set_target(1.0);

        for i in 0..99 {
            param.get_and_step();
            assert!(!param.is_settled(), "settled too early at frame {}", i);
        }
        param.get_and_step();

        assert_eq!(param.get(), 1.0);
        assert!(param.is_settled());
    }

    #[test]
    fn get_and_step_returns_value_before_step() {
        let mut param = LinearSmoothedParam::new(0.0);
        param.set_transition_frames(4);
        param.set_target(1.0);

        assert_eq!(param.get_and_step(), 0.0);
        assert!((param.get_and_step() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn linear_constant_rate() {
        let mut param = LinearSmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);

        for _ in 0..240 {
            param.advance();
        }

        assert!(
            (param.get() - 0.5).abs() < 0.01,
            "Should be halfway, got {}",
            param.get()
        );
    }

    #[test]
    fn zero_frames_snaps() {
        let mut param = LinearSmoothedParam::new(3.0);
        param.set_target(7.0);
        assert_eq!(param.get(), 7.0);
        assert!(param.is_settled());
    }

    #[test]
    fn dezipper_check_replans_running_ramp() {
        let mut param = LinearSmoothedParam::new(0.0);
        param.set_transition_frames(1000);
        param.set_target(1.0);
        for _ in 0..500 {
            param.advance();
        }
        let halfway = param.get();

        param.dezipper_check(10);
        for _ in 0..10 {
            param.advance();
        }

        assert!(halfway < 0.6);
        assert_eq!(param.get(), 1.0, "shorter ramp should land on the goal");
    }

    #[test]
    fn dezipper_check_same_length_is_noop() {
        let mut param = LinearSmoothedParam::new(0.0);
        param.set_transition_frames(8);
        param.set_target(1.0);
        param.advance();
        let before = param.get();
        param.dezipper_check(8);
        assert_eq!(param.get(), before);
        assert!(!param.is_settled());
    }

    #[test]
    fn descending_ramp_never_undershoots() {
        let mut param = LinearSmoothedParam::new(1.0);
        param.set_transition_frames(3);
        param.set_target(0.1);
        for _ in 0..3 {
            let v = param.advance();
            assert!(v >= 0.1, "went past goal: {}", v);
        }
        assert_eq!(param.get(), 0.1);
    }
}
