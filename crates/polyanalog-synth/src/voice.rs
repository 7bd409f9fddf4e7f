//! A single synthesizer voice.
//!
//! Signal chain per sample:
//!
//! ```text
//! pitch ramp ─┬─ + octave·12 ──► osc A ─┐
//!             └─ + btune[i]  ──► osc B ─┴─ equal-power mix ─► + noise ─► lowpass ─► × env²
//!                                                                          ▲
//!              base cutoff + env·90·amount + smoothed filter mod ──────────┘
//! ```
//!
//! Voices never allocate. They are created once inside a
//! [`VoicePool`](crate::VoicePool) and reassigned by index.

use crate::dual_osc::DualOscillator;
use crate::envelope::AdsrEnvelope;
use polyanalog_core::{Biquad, LinearSmoothedParam, SmoothedParam, equal_power_mix, mtof};

/// Semitone offsets selectable for oscillator B.
pub const BTUNE: [f32; 11] = [-24.0, -17.0, -12.0, -5.0, 0.0, 0.08, 0.2, 7.0, 12.0, 19.0, 24.0];

/// Upper bound of the filter cutoff in the semitone domain.
pub const MAX_CUTOFF_SEMITONES: f32 = 132.0;

/// Filter envelope depth at full amount, in semitones.
pub const FILTER_ENV_RANGE: f32 = 90.0;

/// Smoothing time applied to the external filter modulation input.
pub const FILTER_MOD_SMOOTHING_MS: f32 = 20.0;

/// Pitch a voice rests at before its first note.
const INITIAL_PITCH: f32 = 60.0;

/// A played note.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Note {
    /// MIDI note number.
    pub pitch: u8,
    /// Velocity 0..127.
    pub velocity: u8,
    /// Monotonic sequence number assigned at note-on.
    pub timestamp: u64,
}

impl Note {
    /// Create a note.
    pub const fn new(pitch: u8, velocity: u8, timestamp: u64) -> Self {
        Self {
            pitch,
            velocity,
            timestamp,
        }
    }
}

/// Lifecycle of a voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VoiceState {
    /// Gate closed and envelope finished.
    #[default]
    Idle,
    /// Gate open.
    Sounding,
    /// Gate closed, envelope still in its release tail.
    Releasing,
}

/// Settings shared by every voice, applied as one unit.
///
/// Continuous controls are stored in the units the voice works in:
/// semitones for the cutoff, seconds for envelope times, and the raw 0..1
/// control for morphs and mixes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceParams {
    /// Glide control 0..1. The ramp lasts `glide² × sample_rate` frames.
    pub glide: f32,
    /// Oscillator A morph control.
    pub waveform_a: f32,
    /// Oscillator B morph control.
    pub waveform_b: f32,
    /// Oscillator A octave offset, −2..=2.
    pub octave: i8,
    /// Index into [`BTUNE`] for oscillator B.
    pub tune_index: usize,
    /// Oscillator mix control 0..1 (0 = A only).
    pub mix: f32,
    /// Noise blend 0..1.
    pub noise: f32,
    /// Base cutoff in semitones.
    pub filter_cutoff: f32,
    /// Filter resonance as Q.
    pub filter_q: f32,
    /// Envelope to cutoff amount 0..1.
    pub filter_env: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Decay time in seconds.
    pub decay: f32,
    /// Sustain level 0..1.
    pub sustain: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            glide: 0.0,
            waveform_a: 0.0,
            waveform_b: 0.0,
            octave: 0,
            tune_index: 4,
            mix: 0.0,
            noise: 0.0,
            filter_cutoff: 135.0,
            filter_q: 0.5,
            filter_env: 0.0,
            attack: 0.002,
            decay: 0.5,
            sustain: 1.0,
            release: 0.5,
        }
    }
}

/// Per-sample modulation fed to a voice by the pool.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VoiceModulation {
    /// Pitch offset in semitones.
    pub pitch: f32,
    /// Cutoff offset in semitones (smoothed inside the voice).
    pub filter: f32,
    /// Offset added to both morph controls.
    pub waveform: f32,
    /// Noise sample to blend in.
    pub noise: f32,
}

/// One monophonic signal path.
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::{Note, Voice, VoiceModulation, VoiceState};
///
/// let mut voice = Voice::new(48000.0);
/// voice.note_on(Note::new(60, 100, 1));
/// assert_eq!(voice.state(), VoiceState::Sounding);
///
/// let mut peak = 0.0f32;
/// for _ in 0..480 {
///     peak = peak.max(voice.process(&VoiceModulation::default()).abs());
/// }
/// assert!(peak > 0.0);
///
/// voice.note_off();
/// assert_eq!(voice.state(), VoiceState::Releasing);
/// ```
#[derive(Debug, Clone)]
pub struct Voice {
    osc_a: DualOscillator,
    osc_b: DualOscillator,
    env: AdsrEnvelope,
    filter: Biquad,
    pitch: LinearSmoothedParam,
    filter_mod: SmoothedParam,

    state: VoiceState,
    note: Note,
    sample_rate: f32,

    glide_frames: u32,
    waveform_a: f32,
    waveform_b: f32,
    octave_offset: f32,
    tune: f32,
    /// Weight of oscillator A, stored as `1 - mix²`.
    mix_weight: f32,
    noise_mix: f32,
    cutoff: f32,
    q: f32,
    env_amount: f32,

    last_cutoff: f32,
}

impl Voice {
    /// Create an idle voice resting at middle C.
    pub fn new(sample_rate: f32) -> Self {
        let mut voice = Self {
            osc_a: DualOscillator::new(sample_rate),
            osc_b: DualOscillator::new(sample_rate),
            env: AdsrEnvelope::new(sample_rate),
            filter: Biquad::new(),
            pitch: LinearSmoothedParam::new(INITIAL_PITCH),
            filter_mod: SmoothedParam::with_config(0.0, sample_rate, FILTER_MOD_SMOOTHING_MS),
            state: VoiceState::Idle,
            note: Note::new(INITIAL_PITCH as u8, 0, 0),
            sample_rate,
            glide_frames: 0,
            waveform_a: 0.0,
            waveform_b: 0.0,
            octave_offset: 0.0,
            tune: 0.0,
            mix_weight: 1.0,
            noise_mix: 0.0,
            cutoff: 0.0,
            q: 0.5,
            env_amount: 0.0,
            last_cutoff: 0.0,
        };
        voice.apply(&VoiceParams::default());
        voice
    }

    /// Apply a parameter set.
    pub fn apply(&mut self, params: &VoiceParams) {
        let glide = params.glide.clamp(0.0, 1.0);
        self.glide_frames = (glide * glide * self.sample_rate) as u32;
        self.pitch.dezipper_check(self.glide_frames);

        self.waveform_a = params.waveform_a.clamp(0.0, 1.0);
        self.waveform_b = params.waveform_b.clamp(0.0, 1.0);
        self.osc_a.set_waveform(self.waveform_a);
        self.osc_b.set_waveform(self.waveform_b);

        self.octave_offset = f32::from(params.octave.clamp(-2, 2)) * 12.0;
        self.tune = BTUNE[params.tune_index.min(BTUNE.len() - 1)];

        let mix = params.mix.clamp(0.0, 1.0);
        self.mix_weight = 1.0 - mix * mix;
        self.noise_mix = params.noise.clamp(0.0, 1.0);

        self.cutoff = params.filter_cutoff;
        self.q = params.filter_q;
        self.env_amount = params.filter_env.clamp(0.0, 1.0);

        self.env.set_attack_time(params.attack);
        self.env.set_decay_time(params.decay);
        self.env.set_sustain(params.sustain);
        self.env.set_release_time(params.release);
    }

    /// Start a note.
    ///
    /// Oscillator phases are reset only when the envelope has finished, so a
    /// stolen voice keeps its phase. The envelope restarts its attack from
    /// the current level.
    pub fn note_on(&mut self, note: Note) {
        if !self.env.is_running() {
            self.osc_a.reset();
            self.osc_b.reset();
        }
        self.pitch.set_target(f32::from(note.pitch));
        self.env.retrigger(false);
        self.state = VoiceState::Sounding;
        self.note = note;
    }

    /// Move to a new pitch without touching the envelope (legato).
    pub fn retune(&mut self, note: Note) {
        self.pitch.set_target(f32::from(note.pitch));
        self.note = note;
    }

    /// Close the gate.
    pub fn note_off(&mut self) {
        self.env.gate_off();
        self.state = if self.env.is_running() {
            VoiceState::Releasing
        } else {
            VoiceState::Idle
        };
    }

    /// Silence immediately.
    pub fn kill(&mut self) {
        self.env.reset();
        self.filter.clear();
        self.state = VoiceState::Idle;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VoiceState {
        self.state
    }

    /// True unless idle. This is what allocation treats as busy.
    pub fn is_playing(&self) -> bool {
        self.state != VoiceState::Idle
    }

    /// True while the gate is open.
    pub fn is_sounding(&self) -> bool {
        self.state == VoiceState::Sounding
    }

    /// The note this voice was last given.
    pub fn note(&self) -> Note {
        self.note
    }

    /// Pitch of the last note given to this voice.
    pub fn current_pitch(&self) -> u8 {
        self.note.pitch
    }

    /// Timestamp of the last note-on or retune.
    pub fn timestamp(&self) -> u64 {
        self.note.timestamp
    }

    /// Current envelope level.
    pub fn envelope_level(&self) -> f32 {
        self.env.level()
    }

    /// Current (gliding) pitch in semitones, before modulation.
    pub fn pitch(&self) -> f32 {
        self.pitch.get()
    }

    /// Cutoff used for the most recent sample, in semitones.
    pub fn cutoff_semitones(&self) -> f32 {
        self.last_cutoff
    }

    /// Render one sample.
    #[inline]
    pub fn process(&mut self, modulation: &VoiceModulation) -> f32 {
        if self.state == VoiceState::Idle {
            return 0.0;
        }

        let pitch = self.pitch.get_and_step() + modulation.pitch;
        let e = self.env.advance();
        if self.state == VoiceState::Releasing && !self.env.is_running() {
            self.state = VoiceState::Idle;
        }

        if modulation.waveform != 0.0 {
            self.osc_a
                .set_waveform((self.waveform_a + modulation.waveform).clamp(0.0, 1.0));
            self.osc_b
                .set_waveform((self.waveform_b + modulation.waveform).clamp(0.0, 1.0));
        } else {
            self.osc_a.set_waveform(self.waveform_a);
            self.osc_b.set_waveform(self.waveform_b);
        }
        self.osc_a.set_pitch(pitch + self.octave_offset);
        self.osc_b.set_pitch(pitch + self.tune);

        let a = self.osc_a.process();
        let b = self.osc_b.process();
        let osc = equal_power_mix(b, a, self.mix_weight);
        let source = equal_power_mix(osc, modulation.noise, self.noise_mix);

        self.filter_mod.set_target(modulation.filter);
        let smoothed_mod = self.filter_mod.advance();
        self.last_cutoff = (self.cutoff + e * FILTER_ENV_RANGE * self.env_amount + smoothed_mod)
            .min(MAX_CUTOFF_SEMITONES);
        self.filter
            .set_lowpass(mtof(self.last_cutoff), self.q, self.sample_rate);

        self.filter.process(source) * e * e
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn run(voice: &mut Voice, frames: usize) -> f32 {
        let modulation = VoiceModulation::default();
        let mut peak = 0.0f32;
        for _ in 0..frames {
            peak = peak.max(voice.process(&modulation).abs());
        }
        peak
    }

    #[test]
    fn test_idle_voice_is_silent() {
        let mut voice = Voice::new(SR);
        assert_eq!(run(&mut voice, 1000), 0.0);
        assert!(!voice.is_playing());
    }

    #[test]
    fn test_lifecycle() {
        let mut voice = Voice::new(SR);
        voice.apply(&VoiceParams {
            release: 0.05,
            ..VoiceParams::default()
        });
        voice.note_on(Note::new(60, 100, 1));
        assert!(run(&mut voice, 4800) > 0.01);

        voice.note_off();
        assert_eq!(voice.state(), VoiceState::Releasing);
        run(&mut voice, (0.06 * SR) as usize);
        assert_eq!(voice.state(), VoiceState::Idle);
        assert_eq!(run(&mut voice, 100), 0.0);
    }

    #[test]
    fn test_retune_keeps_envelope() {
        let mut voice = Voice::new(SR);
        voice.note_on(Note::new(60, 100, 1));
        run(&mut voice, 4800);
        let level = voice.envelope_level();
        voice.retune(Note::new(64, 100, 2));
        run(&mut voice, 1);
        assert!(voice.envelope_level() >= level * 0.99);
        assert_eq!(voice.current_pitch(), 64);
        assert_eq!(voice.timestamp(), 2);
    }

    #[test]
    fn test_glide_takes_glide_squared_seconds() {
        let mut voice = Voice::new(SR);
        voice.apply(&VoiceParams {
            glide: 0.5,
            ..VoiceParams::default()
        });
        voice.note_on(Note::new(48, 100, 1));
        // 0.25 s ramp from the resting pitch of 60
        run(&mut voice, 6000);
        assert!((voice.pitch() - 54.0).abs() < 0.05, "halfway pitch {}", voice.pitch());
        run(&mut voice, 6000);
        assert_eq!(voice.pitch(), 48.0);
    }

    #[test]
    fn test_no_glide_snaps() {
        let mut voice = Voice::new(SR);
        voice.note_on(Note::new(72, 100, 1));
        assert_eq!(voice.pitch(), 72.0);
    }

    #[test]
    fn test_cutoff_clamped() {
        let mut voice = Voice::new(SR);
        voice.apply(&VoiceParams {
            filter_cutoff: 135.0,
            filter_env: 1.0,
            filter_q: 8.0,
            attack: 0.0,
            ..VoiceParams::default()
        });
        voice.note_on(Note::new(60, 127, 1));
        let modulation = VoiceModulation {
            filter: 200.0,
            ..VoiceModulation::default()
        };
        for _ in 0..4800 {
            let out = voice.process(&modulation);
            assert!(out.is_finite());
            assert!(voice.cutoff_semitones() <= MAX_CUTOFF_SEMITONES);
        }
    }

    #[test]
    fn test_mix_selects_oscillator() {
        let mut voice = Voice::new(SR);
        voice.apply(&VoiceParams {
            mix: 0.0,
            ..VoiceParams::default()
        });
        assert_eq!(voice.mix_weight, 1.0);
        voice.apply(&VoiceParams {
            mix: 1.0,
            ..VoiceParams::default()
        });
        assert_eq!(voice.mix_weight, 0.0);
    }

    #[test]
    fn test_out_of_range_tune_index_clamped() {
        let mut voice = Voice::new(SR);
        voice.apply(&VoiceParams {
            tune_index: 99,
            octave: 7,
            ..VoiceParams::default()
        });
        assert_eq!(voice.tune, 24.0);
        assert_eq!(voice.octave_offset, 24.0);
    }
}
