//! ADSR envelope generator.
//!
//! Exponential segments. Attack aims past 1.0 so it finishes in finite
//! time; decay and release are calibrated so the configured time is how
//! long the segment takes to settle within [`SILENCE_THRESHOLD`] of its
//! goal.

use libm::{expf, logf};

/// Level below which a releasing envelope is considered finished.
pub const SILENCE_THRESHOLD: f32 = 0.0001;

/// Attack overshoot target.
const ATTACK_TARGET: f32 = 1.2;

/// ADSR envelope states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Envelope is inactive. Output is zero.
    #[default]
    Idle,
    /// Output rises toward the peak.
    Attack,
    /// Output falls from the peak toward the sustain level.
    Decay,
    /// Output holds at the sustain level while the gate is open.
    Sustain,
    /// Output decays to zero after the gate closes.
    Release,
}

/// ADSR envelope generator.
///
/// Times are in seconds. [`retrigger`](Self::retrigger) restarts the attack
/// either from the current level (soft) or from zero (hard).
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::{AdsrEnvelope, EnvelopeState};
///
/// let mut env = AdsrEnvelope::new(48000.0);
/// env.set_attack_time(0.01);
/// env.set_decay_time(0.1);
/// env.set_sustain(0.7);
/// env.set_release_time(0.2);
///
/// env.retrigger(false);
/// for _ in 0..4800 {
///     env.advance();
/// }
/// assert!(env.level() > 0.69);
///
/// env.gate_off();
/// assert_eq!(env.state(), EnvelopeState::Release);
/// ```
#[derive(Debug, Clone)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    level: f32,
    sample_rate: f32,

    attack_time: f32,
    decay_time: f32,
    release_time: f32,
    sustain: f32,

    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Default for AdsrEnvelope {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AdsrEnvelope {
    /// Create a new ADSR envelope.
    ///
    /// Defaults: attack 10 ms, decay 100 ms, sustain 0.7, release 200 ms.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            state: EnvelopeState::Idle,
            level: 0.0,
            sample_rate,
            attack_time: 0.01,
            decay_time: 0.1,
            release_time: 0.2,
            sustain: 0.7,
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.recalculate_coefficients();
        env
    }

    /// Set attack time in seconds.
    pub fn set_attack_time(&mut self, seconds: f32) {
        self.attack_time = seconds.max(0.0);
        self.attack_coeff = self.attack_coefficient();
    }

    /// Attack time in seconds.
    pub fn attack_time(&self) -> f32 {
        self.attack_time
    }

    /// Set decay time in seconds.
    pub fn set_decay_time(&mut self, seconds: f32) {
        self.decay_time = seconds.max(0.0);
        self.decay_coeff = self.settle_coefficient(self.decay_time);
    }

    /// Decay time in seconds.
    pub fn decay_time(&self) -> f32 {
        self.decay_time
    }

    /// Set sustain level (0.0 to 1.0).
    pub fn set_sustain(&mut self, level: f32) {
        self.sustain = level.clamp(0.0, 1.0);
    }

    /// Sustain level.
    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    /// Set release time in seconds.
    pub fn set_release_time(&mut self, seconds: f32) {
        self.release_time = seconds.max(0.0);
        self.release_coeff = self.settle_coefficient(self.release_time);
    }

    /// Release time in seconds.
    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    /// Restart the attack segment.
    ///
    /// A soft retrigger keeps the current level so overlapping notes do not
    /// click; a hard retrigger starts from zero.
    pub fn retrigger(&mut self, hard: bool) {
        if hard {
            self.level = 0.0;
        }
        self.state = EnvelopeState::Attack;
    }

    /// Close the gate. A running envelope enters release.
    pub fn gate_off(&mut self) {
        if self.state != EnvelopeState::Idle {
            self.state = EnvelopeState::Release;
        }
    }

    /// Force envelope to idle state.
    pub fn reset(&mut self) {
        self.state = EnvelopeState::Idle;
        self.level = 0.0;
    }

    /// Get current state.
    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    /// Get current level without advancing.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// True until the release (or a zero sustain) has fully decayed.
    pub fn is_running(&self) -> bool {
        self.state != EnvelopeState::Idle
    }

    /// Advance envelope by one sample and return the new level.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level = ATTACK_TARGET + (self.level - ATTACK_TARGET) * self.attack_coeff;
                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                self.level = self.sustain + (self.level - self.sustain) * self.decay_coeff;
                if (self.level - self.sustain).abs() < SILENCE_THRESHOLD {
                    self.level = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeState::Release => {
                self.level *= self.release_coeff;
                if self.level < SILENCE_THRESHOLD {
                    self.level = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
        }

        self.level
    }

    fn recalculate_coefficients(&mut self) {
        self.attack_coeff = self.attack_coefficient();
        self.decay_coeff = self.settle_coefficient(self.decay_time);
        self.release_coeff = self.settle_coefficient(self.release_time);
    }

    /// Coefficient that carries a 0 → 1.2 approach across 1.0 in `attack_time`.
    fn attack_coefficient(&self) -> f32 {
        let samples = (self.attack_time * self.sample_rate).max(1.0);
        expf(-logf(ATTACK_TARGET / (ATTACK_TARGET - 1.0)) / samples)
    }

    /// Coefficient that shrinks a unit distance to the silence threshold in `time`.
    fn settle_coefficient(&self, time: f32) -> f32 {
        let samples = (time * self.sample_rate).max(1.0);
        expf(logf(SILENCE_THRESHOLD) / samples)
    }
}
