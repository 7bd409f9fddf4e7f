//! Low-frequency oscillator for control-rate modulation.
//!
//! Drives vibrato, LFO routing and any other periodic control signal. The
//! oscillator runs per sample, but it is usually rendered a block at a time
//! with [`Lfo::fill`] so that consumers can index the result by frame.

use core::f32::consts::TAU;
use libm::sinf;

/// LFO waveform type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LfoWaveform {
    /// Smooth sine.
    #[default]
    Sine,
    /// Linear up/down ramp.
    Triangle,
    /// Rising ramp with an abrupt reset.
    Saw,
    /// Two-level on/off.
    Square,
    /// Random value held for one cycle.
    SampleAndHold,
}

impl LfoWaveform {
    /// All waveforms in selection order.
    pub const ALL: [LfoWaveform; 5] = [
        LfoWaveform::Sine,
        LfoWaveform::Triangle,
        LfoWaveform::Saw,
        LfoWaveform::Square,
        LfoWaveform::SampleAndHold,
    ];

    /// Pick a waveform from a normalized 0..1 control.
    pub fn from_normalized(value: f32) -> Self {
        Self::ALL[crate::math::quantize(value, Self::ALL.len())]
    }

    /// Short display name.
    pub const fn name(self) -> &'static str {
        match self {
            LfoWaveform::Sine => "Sine",
            LfoWaveform::Triangle => "Tri",
            LfoWaveform::Saw => "Saw",
            LfoWaveform::Square => "Square",
            LfoWaveform::SampleAndHold => "S&H",
        }
    }
}

/// Low Frequency Oscillator for generating modulation signals.
///
/// Phase-accumulating oscillator with bipolar output in `[-1, 1]`.
///
/// # Example
///
/// ```rust
/// use polyanalog_core::{Lfo, LfoWaveform};
///
/// let mut lfo = Lfo::new(48000.0, 8.0);
/// lfo.set_waveform(LfoWaveform::Triangle);
///
/// let mut block = [0.0f32; 64];
/// lfo.fill(&mut block);
/// assert!(block.iter().all(|v| (-1.0..=1.0).contains(v)));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    waveform: LfoWaveform,
    /// Held value for sample-and-hold
    held: f32,
    /// Xorshift state for sample-and-hold
    rng: u32,
}

impl Default for Lfo {
    fn default() -> Self {
        Self::new(48000.0, 1.0)
    }
}

impl Lfo {
    /// Create new LFO with given sample rate and frequency
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
            waveform: LfoWaveform::Sine,
            held: 0.0,
            rng: 0x9E37_79B9,
        }
    }

    /// Set frequency in Hz
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz.max(0.0) / self.sample_rate;
    }

    /// Get current frequency in Hz
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Set waveform
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.waveform = waveform;
    }

    /// Get current waveform
    pub fn waveform(&self) -> LfoWaveform {
        self.waveform
    }

    /// Reset phase to 0
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Get current phase (0.0 - 1.0)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Get next LFO value (-1.0 to 1.0)
    #[inline]
    pub fn next(&mut self) -> f32 {
        let output = match self.waveform {
            LfoWaveform::Sine => sinf(self.phase * TAU),
            LfoWaveform::Triangle => {
                if self.phase < 0.5 {
                    4.0 * self.phase - 1.0
                } else {
                    3.0 - 4.0 * self.phase
                }
            }
            LfoWaveform::Saw => 2.0 * self.phase - 1.0,
            LfoWaveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            LfoWaveform::SampleAndHold => self.held,
        };

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            if self.waveform == LfoWaveform::SampleAndHold {
                self.held = self.next_random();
            }
        }

        output
    }

    /// Render consecutive values into `out`.
    pub fn fill(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next();
        }
    }

    fn next_random(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x as i32 as f32) / (i32::MAX as f32)
    }
}
