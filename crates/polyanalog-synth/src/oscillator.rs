//! Audio-rate oscillators with anti-aliasing.
//!
//! Band-limited saw and pulse oscillators using PolyBLEP (Polynomial
//! Band-Limited Step) correction, plus the white noise source blended into
//! each voice.

use libm::floorf;

/// Euclidean remainder for f32, compatible with no_std.
#[inline]
fn rem_euclid_f32(a: f32, b: f32) -> f32 {
    let r = a - b * floorf(a / b);
    if r < 0.0 { r + b } else { r }
}

/// Narrowest pulse width accepted by [`OscillatorWaveform::Pulse`].
pub const MIN_PULSE_WIDTH: f32 = 0.01;

/// Oscillator waveform types
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum OscillatorWaveform {
    /// Sawtooth waveform. All harmonics, bright timbre.
    #[default]
    Saw,
    /// Pulse with variable duty cycle. 0.5 is a square wave.
    Pulse(f32),
}

/// Audio-rate oscillator with PolyBLEP anti-aliasing.
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::{Oscillator, OscillatorWaveform};
///
/// let mut osc = Oscillator::new(48000.0);
/// osc.set_frequency(440.0);
/// osc.set_waveform(OscillatorWaveform::Pulse(0.5));
///
/// let sample = osc.advance();
/// assert!(sample.abs() <= 1.5);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: OscillatorWaveform,
    /// Phase was set to 0 by a reset and has not wrapped since.
    from_reset: bool,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl Oscillator {
    /// Create a new saw oscillator at 440 Hz.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            waveform: OscillatorWaveform::Saw,
            from_reset: true,
        }
    }

    /// Set frequency in Hz. Negative values are treated as 0.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Get current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Set waveform type.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
    }

    /// Get current waveform.
    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Reset phase to 0.
    ///
    /// No wrap precedes the restarted cycle, so the first samples carry no
    /// wrap correction.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.from_reset = true;
    }

    /// Get current phase.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Generate next sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let phase = self.phase;
        let dt = self.phase_inc;
        let wrap = if self.from_reset && phase < 0.5 {
            0.0
        } else {
            poly_blep(phase, dt)
        };
        let output = match self.waveform {
            OscillatorWaveform::Saw => 2.0 * phase - 1.0 - wrap,
            OscillatorWaveform::Pulse(width) => {
                let duty = width.clamp(MIN_PULSE_WIDTH, 1.0 - MIN_PULSE_WIDTH);
                let naive = if phase < duty { 1.0 } else { -1.0 };
                // Rising edge at phase 0, falling edge at phase = duty
                naive + wrap - poly_blep(rem_euclid_f32(phase - duty + 1.0, 1.0), dt)
            }
        };

        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
            self.from_reset = false;
        }
        output
    }
}

/// 4th-order PolyBLEP correction.
///
/// C²-continuous piecewise polynomial fitted to the ideal BLEP residual,
/// spanning two samples on each side of the discontinuity.
///
/// Returns 0.0 when `t` is far from a discontinuity.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    //   p₁(n) = A₄·n⁴ + A₃·n³ + A₂·n² + A₀  for n ∈ [0,1)
    //   p₂(n) = C·(2-n)⁴                     for n ∈ [1,2)
    const A4: f32 = -43.0 / 48.0;
    const A3: f32 = 7.0 / 6.0;
    const A2: f32 = 0.5;
    const A0: f32 = -1.0;
    const C: f32 = -11.0 / 48.0;

    if dt <= 0.0 {
        return 0.0;
    }
    let dt2 = 2.0 * dt;
    let segment = |n: f32| {
        if n < 1.0 {
            let n2 = n * n;
            A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            C * u2 * u2
        }
    };
    if t < dt2 {
        segment(t / dt)
    } else if t > 1.0 - dt2 {
        -segment((1.0 - t) / dt)
    } else {
        0.0
    }
}

/// White noise source with a fixed output amplitude.
///
/// Xorshift32, so the sequence is deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct WhiteNoise {
    state: u32,
    amplitude: f32,
}

impl WhiteNoise {
    /// Create a noise source scaled to `amplitude`.
    pub fn new(amplitude: f32) -> Self {
        Self {
            state: 0x1234_5678,
            amplitude,
        }
    }

    /// Next sample in `[-amplitude, amplitude]`.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x as i32 as f32) / (i32::MAX as f32) * self.amplitude
    }
}

impl Default for WhiteNoise {
    fn default() -> Self {
        Self::new(1.0)
    }
}
