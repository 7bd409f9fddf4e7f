//! One-pole (6 dB/oct) highpass built on a lowpass state.
//!
//! ```text
//! lp[n] = x[n] + coeff * (lp[n-1] - x[n])
//! hp[n] = x[n] - lp[n]
//! ```
//!
//! where `coeff = exp(-2π * freq / sample_rate)`. The highpass output is
//! what the synth uses as its master low-cut.
//!
//! # Usage
//!
//! ```rust
//! use polyanalog_core::OnePole;
//!
//! let mut hp = OnePole::new(48000.0, 10.0);
//! let mut out = 0.0;
//! for _ in 0..48000 {
//!     out = hp.process_highpass(1.0);
//! }
//! assert!(out.abs() < 1e-3); // DC removed
//! ```

use crate::flush_denormal;
use libm::expf;

/// One-pole filter.
///
/// # Invariants
///
/// - `coeff` is always in [0, 1) for stable operation
/// - `state` is flushed to zero when below 1e-20
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    sample_rate: f32,
    freq: f32,
}

impl OnePole {
    /// Create a new one-pole filter.
    ///
    /// # Arguments
    ///
    /// * `sample_rate` - Sample rate in Hz
    /// * `freq_hz` - Corner frequency in Hz
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            sample_rate,
            freq: freq_hz,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Set the corner frequency. Clamped to `[0, 0.49 * sample_rate]`.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz.clamp(0.0, self.sample_rate * 0.49);
        self.recalculate_coeff();
    }

    /// Current corner frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.freq
    }

    #[inline]
    fn process_lowpass(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Process one sample and return the highpass output.
    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        input - self.process_lowpass(input)
    }

    /// Reset filter state to zero.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = expf(-core::f32::consts::TAU * self.freq / self.sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowpass_passes_dc() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process_lowpass(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass through, got {out}");
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut hp = OnePole::new(48000.0, 100.0);
        let mut out = 1.0;
        for _ in 0..48000 {
            out = hp.process_highpass(1.0);
        }
        assert!(out.abs() < 1e-4, "DC should be removed, got {out}");
    }

    #[test]
    fn highpass_passes_nyquist() {
        let mut hp = OnePole::new(48000.0, 100.0);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += hp.process_highpass(input).abs();
        }
        let avg = sum / 4800.0;
        assert!(avg > 0.95, "Nyquist should pass the highpass, avg = {avg}");
    }

    #[test]
    fn frequency_is_clamped() {
        let mut hp = OnePole::new(48000.0, 10.0);
        hp.set_frequency(1.0e6);
        assert!((hp.frequency() - 23520.0).abs() < 1.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        lp.process_lowpass(1.0);
        lp.reset();
        assert_eq!(lp.process_lowpass(0.0), 0.0);
    }
}
