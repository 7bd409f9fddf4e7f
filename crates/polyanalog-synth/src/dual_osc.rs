//! Morphing oscillator pair driven by a single waveform control.
//!
//! A [`DualOscillator`] owns a primary saw and a secondary oscillator. One
//! control value `v` in 0..1 sweeps three overlapping regions:
//!
//! ```text
//! v = 0      two saws, detuned ±0.2 st, blended half and half
//! v → 1/4    detune and detune blend shrink to zero (plain saw)
//! v = 1/3    secondary switches from saw to pulse
//! v → 2/3    pulse blend rises quadratically to full
//! v → 1      pulse width narrows from 0.5 toward 0.03
//! ```
//!
//! The blend weight is `max(shape_mix, detune_mix)`, applied to the
//! secondary through an equal-power crossfade. Both terms are zero around
//! `v = 1/3`, so the saw/pulse switch is silent.

use crate::oscillator::{Oscillator, OscillatorWaveform};
use polyanalog_core::{equal_power_mix, mtof};

/// Waveform control value where the secondary oscillator becomes a pulse.
pub const PULSE_THRESHOLD: f32 = 0.3333;

/// Maximum detune of each oscillator, in semitones.
pub const MAX_DETUNE_SEMITONES: f32 = 0.2;

/// Derived morph coefficients for one waveform control value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphState {
    /// Secondary uses a pulse instead of a saw.
    pub pulse: bool,
    /// Detune scale, `(1 - base)²`.
    pub detune_weight: f32,
    /// Saw-pair blend, `(1 - base) / 2`.
    pub detune_mix: f32,
    /// Pulse blend, `min(2·ranged, 1)²`.
    pub shape_mix: f32,
    /// Secondary pulse width.
    pub pulse_width: f32,
}

impl MorphState {
    /// Compute the morph coefficients for control `v` (clamped to 0..1).
    ///
    /// ```rust
    /// use polyanalog_synth::MorphState;
    ///
    /// let saw_pair = MorphState::from_control(0.0);
    /// assert_eq!(saw_pair.detune_mix, 0.5);
    /// assert!(!saw_pair.pulse);
    ///
    /// let narrow = MorphState::from_control(1.0);
    /// assert!(narrow.pulse);
    /// assert!(narrow.pulse_width < 0.04);
    /// ```
    pub fn from_control(v: f32) -> Self {
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        let base = (v * 4.0).min(1.0);
        let inv = 1.0 - base;
        let ranged = ((v - 0.333) * 1.492_537).max(0.0);
        let doubled = ranged * 2.0;
        let shape = doubled.min(1.0);
        Self {
            pulse: v >= PULSE_THRESHOLD,
            detune_weight: inv * inv,
            detune_mix: inv * 0.5,
            shape_mix: shape * shape,
            pulse_width: 0.5 - (doubled - 1.0).max(0.0) * 0.47,
        }
    }

    /// Crossfade weight applied to the secondary oscillator.
    #[inline]
    pub fn blend(&self) -> f32 {
        self.shape_mix.max(self.detune_mix)
    }
}

/// Two band-limited oscillators morphed by one control.
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::DualOscillator;
///
/// let mut osc = DualOscillator::new(48000.0);
/// osc.set_waveform(0.5);
/// osc.set_pitch(60.0);
/// let sample = osc.process();
/// assert!(sample.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct DualOscillator {
    primary: Oscillator,
    secondary: Oscillator,
    morph: MorphState,
    control: f32,
    max_freq: f32,
}

impl DualOscillator {
    /// Create a pair at waveform control 0.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            primary: Oscillator::new(sample_rate),
            secondary: Oscillator::new(sample_rate),
            morph: MorphState::from_control(0.0),
            control: 0.0,
            max_freq: sample_rate * 0.49,
        }
    }

    /// Set the waveform control (0..1).
    ///
    /// Repeating the current value is a no-op, so this can be called every
    /// sample while a modulation source sweeps it.
    pub fn set_waveform(&mut self, v: f32) {
        if v == self.control {
            return;
        }
        self.control = v;
        self.morph = MorphState::from_control(v);
        self.secondary.set_waveform(if self.morph.pulse {
            OscillatorWaveform::Pulse(self.morph.pulse_width)
        } else {
            OscillatorWaveform::Saw
        });
    }

    /// Current morph coefficients.
    pub fn morph(&self) -> MorphState {
        self.morph
    }

    /// Tune both oscillators to `semitones` (MIDI note domain).
    ///
    /// The primary is detuned down and the secondary up by the morph detune.
    /// Frequencies are capped at `0.49 × sample_rate`.
    #[inline]
    pub fn set_pitch(&mut self, semitones: f32) {
        let detune = MAX_DETUNE_SEMITONES * self.morph.detune_weight;
        self.primary
            .set_frequency(mtof(semitones - detune).min(self.max_freq));
        self.secondary
            .set_frequency(mtof(semitones + detune).min(self.max_freq));
    }

    /// Frequencies of the (primary, secondary) oscillators in Hz.
    pub fn frequencies(&self) -> (f32, f32) {
        (self.primary.frequency(), self.secondary.frequency())
    }

    /// Hard phase reset of both oscillators.
    pub fn reset(&mut self) {
        self.primary.reset();
        self.secondary.reset();
    }

    /// Generate the next blended sample.
    #[inline]
    pub fn process(&mut self) -> f32 {
        let primary = self.primary.advance();
        let secondary = self.secondary.advance();
        equal_power_mix(primary, secondary, self.morph.blend())
    }
}

impl Default for DualOscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morph_regions() {
        let low = MorphState::from_control(0.1);
        assert!(!low.pulse);
        assert!(low.detune_weight > 0.0);

        let mid = MorphState::from_control(0.3);
        assert!(!mid.pulse);
        assert_eq!(mid.detune_mix, 0.0);
        assert_eq!(mid.shape_mix, 0.0);

        let high = MorphState::from_control(0.7);
        assert!(high.pulse);
        assert!((high.shape_mix - 1.0).abs() < 1e-6);
        assert!(high.pulse_width < 0.5);
    }

    #[test]
    fn test_blend_continuous_at_pulse_threshold() {
        let below = MorphState::from_control(PULSE_THRESHOLD - 1e-4).blend();
        let above = MorphState::from_control(PULSE_THRESHOLD + 1e-4).blend();
        assert!((below - above).abs() < 1e-3, "jump {} -> {}", below, above);
    }

    #[test]
    fn test_pulse_width_range() {
        assert!((MorphState::from_control(0.5).pulse_width - 0.5).abs() < 1e-6);
        let narrow = MorphState::from_control(1.0).pulse_width;
        assert!((narrow - 0.03).abs() < 0.005, "got {}", narrow);
    }

    #[test]
    fn test_detune_is_symmetric() {
        let mut osc = DualOscillator::new(48000.0);
        osc.set_waveform(0.0);
        osc.set_pitch(69.0);
        let (lo, hi) = osc.frequencies();
        let cents_lo = 1200.0 * libm::log2f(440.0 / lo);
        let cents_hi = 1200.0 * libm::log2f(hi / 440.0);
        assert!((cents_lo - 20.0).abs() < 0.1, "primary {} cents", cents_lo);
        assert!((cents_hi - 20.0).abs() < 0.1, "secondary {} cents", cents_hi);
    }

    #[test]
    fn test_frequency_capped_below_nyquist() {
        let mut osc = DualOscillator::new(32000.0);
        osc.set_waveform(0.0);
        osc.set_pitch(160.0);
        let (a, b) = osc.frequencies();
        assert!(a <= 32000.0 * 0.49 && b <= 32000.0 * 0.49);
    }

    #[test]
    fn test_output_bounded() {
        for &v in &[0.0, 0.2, 0.34, 0.6, 1.0] {
            let mut osc = DualOscillator::new(48000.0);
            osc.set_waveform(v);
            osc.set_pitch(48.0);
            for _ in 0..4800 {
                let s = osc.process();
                assert!(s.abs() < 2.0, "v={} sample {}", v, s);
            }
        }
    }
}
