//! Biquad (bi-quadratic) filter with a resonant lowpass configuration.
//!
//! Coefficient calculation uses the RBJ Audio EQ Cookbook formulas. The
//! voice filter recomputes its coefficients every sample while the cutoff
//! is modulated, so [`Biquad::set_lowpass`] clamps its inputs to a range
//! where the filter stays stable.

use crate::flush_denormal;
use core::f32::consts::PI;
use libm::{cosf, sinf};

/// Lowest cutoff accepted by [`Biquad::set_lowpass`], in Hz.
pub const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff accepted by [`Biquad::set_lowpass`], as a fraction of the sample rate.
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Generic biquad filter coefficients and state.
///
/// Direct Form I:
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a new biquad with passthrough coefficients.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets the biquad coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, b0: f32, b1: f32, b2: f32, a0: f32, a1: f32, a2: f32) {
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Configure as a resonant lowpass.
    ///
    /// `frequency` is clamped to `[MIN_CUTOFF_HZ, MAX_CUTOFF_RATIO * sample_rate]`
    /// and `q` to at least 0.1, so any modulated input yields a stable filter.
    pub fn set_lowpass(&mut self, frequency: f32, q: f32, sample_rate: f32) {
        let freq = frequency.clamp(MIN_CUTOFF_HZ, sample_rate * MAX_CUTOFF_RATIO);
        let (b0, b1, b2, a0, a1, a2) = lowpass_coefficients(freq, q.max(0.1), sample_rate);
        self.set_coefficients(b0, b1, b2, a0, a1, a2);
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = flush_denormal(output);

        output
    }

    /// Clears the filter state without touching the coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Calculates low-pass filter coefficients using the RBJ cookbook formula.
///
/// # Arguments
///
/// * `frequency` - Cutoff frequency in Hz
/// * `q` - Q factor (0.707 for Butterworth response)
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
///
/// (b0, b1, b2, a0, a1, a2) coefficients
pub fn lowpass_coefficients(
    frequency: f32,
    q: f32,
    sample_rate: f32,
) -> (f32, f32, f32, f32, f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    let cos_omega = cosf(omega);
    let sin_omega = sinf(omega);
    let alpha = sin_omega / (2.0 * q);

    let b0 = (1.0 - cos_omega) / 2.0;
    let b1 = 1.0 - cos_omega;
    let b2 = (1.0 - cos_omega) / 2.0;
    let a0 = 1.0 + alpha;
    let a1 = -2.0 * cos_omega;
    let a2 = 1.0 - alpha;

    (b0, b1, b2, a0, a1, a2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_by_default() {
        let mut bq = Biquad::new();
        assert_eq!(bq.process(0.42), 0.42);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut bq = Biquad::new();
        bq.set_lowpass(1000.0, 0.707, 48000.0);

        let mut out = 0.0;
        for _ in 0..4800 {
            out = bq.process(1.0);
        }
        assert!((out - 1.0).abs() < 0.001, "DC gain should be unity, got {}", out);
    }

    #[test]
    fn test_lowpass_attenuates_nyquist() {
        let mut bq = Biquad::new();
        bq.set_lowpass(500.0, 0.707, 48000.0);

        let mut peak = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            let out = bq.process(input);
            if i > 100 {
                peak = peak.max(out.abs());
            }
        }
        assert!(peak < 0.01, "Nyquist should be removed, peak {}", peak);
    }

    #[test]
    fn test_cutoff_above_nyquist_is_stable() {
        let mut bq = Biquad::new();
        bq.set_lowpass(100_000.0, 8.0, 32000.0);

        for i in 0..10_000 {
            let out = bq.process(if i % 7 == 0 { 1.0 } else { -0.3 });
            assert!(out.is_finite() && out.abs() < 100.0, "unstable at {}: {}", i, out);
        }
    }

    #[test]
    fn test_clear_resets_state() {
        let mut bq = Biquad::new();
        bq.set_lowpass(1000.0, 2.0, 48000.0);
        bq.process(1.0);
        bq.process(1.0);
        bq.clear();
        assert_eq!(bq.process(0.0), 0.0);
    }
}
