//! Voice allocation across play modes.
//!
//! The pool owns a fixed array of voices and the record of held keys.
//!
//! - **Mono** drives voice 0. **Unison** drives the first [`UNISON_VOICES`]
//!   voices with a small static detune each. In both, releasing a key while
//!   others are held retunes to the most recent remaining key without
//!   restarting the envelope.
//! - **Poly** gives each key its own voice: same-pitch retrigger (per
//!   [`RetriggerPolicy`]), else the first idle voice, else the voice with
//!   the oldest timestamp, even if it is still releasing.
//!
//! Pitch bend and mod-wheel vibrato are combined once per sample and added
//! to every voice.

use crate::capabilities::RetriggerPolicy;
use crate::oscillator::WhiteNoise;
use crate::voice::{Note, Voice, VoiceModulation, VoiceParams};
use polyanalog_core::{LinearSmoothedParam, Lfo, quantize};

/// Voices stacked in Unison mode.
pub const UNISON_VOICES: usize = 3;

/// Total detune spread across the unison stack, in semitones.
pub const UNISON_SPREAD: f32 = 1.0 / 32.0;

/// Keys remembered for legato. The oldest is forgotten when full.
pub const MAX_HELD_NOTES: usize = 16;

/// Bend range in semitones either side of center.
pub const PITCH_BEND_RANGE: f32 = 2.0;

/// Frames over which bend and vibrato depth changes are ramped.
pub const GLOBAL_SMOOTHING_FRAMES: u32 = 800;

/// Vibrato oscillator rate in Hz.
pub const VIBRATO_RATE_HZ: f32 = 8.0;

/// Vibrato depth at full mod wheel, in semitones.
pub const VIBRATO_DEPTH: f32 = 0.5;

/// Output scale when more than one voice can sound.
pub const POLY_GAIN: f32 = 0.707;

/// Noise amplitude fed to each voice.
pub const NOISE_LEVEL: f32 = 0.707;

/// Voice allocation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    /// One voice, legato.
    #[default]
    Mono,
    /// Stacked, detuned voices playing one key, legato.
    Unison,
    /// One voice per key.
    Poly,
}

impl PlayMode {
    /// All modes in control order.
    pub const ALL: [PlayMode; 3] = [PlayMode::Mono, PlayMode::Unison, PlayMode::Poly];

    /// Pick a mode from a normalized control.
    pub fn from_normalized(value: f32) -> Self {
        Self::ALL[quantize(value, Self::ALL.len())]
    }

    /// The normalized control value that selects this mode.
    pub fn to_normalized(self) -> f32 {
        self as usize as f32 * 0.5
    }

    /// The next mode, wrapping Poly back to Mono.
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            PlayMode::Mono => "Mono",
            PlayMode::Unison => "Unison",
            PlayMode::Poly => "Poly",
        }
    }
}

/// Insertion-ordered set of held notes with fixed capacity.
#[derive(Debug, Clone)]
pub struct HeldNotes {
    notes: [Note; MAX_HELD_NOTES],
    len: usize,
}

impl HeldNotes {
    /// Empty record.
    pub fn new() -> Self {
        Self {
            notes: [Note::default(); MAX_HELD_NOTES],
            len: 0,
        }
    }

    /// Record a key. A key already held moves to the end.
    pub fn push(&mut self, note: Note) {
        self.remove(note.pitch);
        if self.len == MAX_HELD_NOTES {
            self.notes.copy_within(1.., 0);
            self.len -= 1;
        }
        self.notes[self.len] = note;
        self.len += 1;
    }

    /// Forget every entry with `pitch`.
    pub fn remove(&mut self, pitch: u8) {
        let mut kept = 0;
        for i in 0..self.len {
            if self.notes[i].pitch != pitch {
                self.notes[kept] = self.notes[i];
                kept += 1;
            }
        }
        self.len = kept;
    }

    /// Most recently pressed key still held.
    pub fn last(&self) -> Option<Note> {
        self.as_slice().last().copied()
    }

    /// Held notes, oldest first.
    pub fn as_slice(&self) -> &[Note] {
        &self.notes[..self.len]
    }

    /// Number of held keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no key is held.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for HeldNotes {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed pool of `N` voices.
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::{Note, PlayMode, VoiceModulation, VoicePool};
///
/// let mut pool: VoicePool<4> = VoicePool::new(48000.0);
/// pool.set_play_mode(PlayMode::Poly);
/// pool.set_note(true, Note::new(60, 100, 1));
/// pool.set_note(true, Note::new(64, 100, 2));
/// assert_eq!(pool.playing_count(), 2);
///
/// let sample = pool.process(&VoiceModulation::default());
/// assert!(sample.is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct VoicePool<const N: usize> {
    voices: [Voice; N],
    held: HeldNotes,
    mode: PlayMode,
    retrigger: RetriggerPolicy,
    bend: LinearSmoothedParam,
    vibrato_depth: LinearSmoothedParam,
    vibrato: Lfo,
    noise: WhiteNoise,
    noise_enabled: bool,
}

impl<const N: usize> VoicePool<N> {
    /// Create `N` idle voices in Mono mode.
    pub fn new(sample_rate: f32) -> Self {
        let mut bend = LinearSmoothedParam::new(0.0);
        bend.set_transition_frames(GLOBAL_SMOOTHING_FRAMES);
        let mut vibrato_depth = LinearSmoothedParam::new(0.0);
        vibrato_depth.set_transition_frames(GLOBAL_SMOOTHING_FRAMES);

        Self {
            voices: core::array::from_fn(|_| Voice::new(sample_rate)),
            held: HeldNotes::new(),
            mode: PlayMode::Mono,
            retrigger: RetriggerPolicy::default(),
            bend,
            vibrato_depth,
            vibrato: Lfo::new(sample_rate, VIBRATO_RATE_HZ),
            noise: WhiteNoise::new(NOISE_LEVEL),
            noise_enabled: true,
        }
    }

    /// Voices taking part in `mode`.
    pub const fn mode_voice_count(mode: PlayMode) -> usize {
        let count = match mode {
            PlayMode::Mono => 1,
            PlayMode::Unison => UNISON_VOICES,
            PlayMode::Poly => N,
        };
        if count < N { count } else { N }
    }

    /// Voices taking part in the current mode.
    pub fn active_voice_count(&self) -> usize {
        Self::mode_voice_count(self.mode)
    }

    /// Current play mode.
    pub fn play_mode(&self) -> PlayMode {
        self.mode
    }

    /// Switch play mode. A change releases every voice and forgets the held keys.
    ///
    /// Release tails outlive the switch: right after Poly to Mono,
    /// [`playing_count`](Self::playing_count) can still exceed the new mode's
    /// voice count until those tails finish.
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        if mode == self.mode {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("play_mode: {} -> {}", self.mode.name(), mode.name());
        self.mode = mode;
        for voice in &mut self.voices {
            voice.note_off();
        }
        self.held.clear();
    }

    /// Set the Poly same-pitch policy.
    pub fn set_retrigger_policy(&mut self, policy: RetriggerPolicy) {
        self.retrigger = policy;
    }

    /// Current Poly same-pitch policy.
    pub fn retrigger_policy(&self) -> RetriggerPolicy {
        self.retrigger
    }

    /// Enable or disable the per-voice noise feed.
    pub fn set_noise_enabled(&mut self, enabled: bool) {
        self.noise_enabled = enabled;
    }

    /// Apply one parameter set to every voice.
    pub fn apply_params(&mut self, params: &VoiceParams) {
        for voice in &mut self.voices {
            voice.apply(params);
        }
    }

    /// Pitch bend in semitones, ramped over [`GLOBAL_SMOOTHING_FRAMES`].
    pub fn set_pitch_bend(&mut self, semitones: f32) {
        self.bend
            .set_target(semitones.clamp(-PITCH_BEND_RANGE, PITCH_BEND_RANGE));
    }

    /// Mod wheel 0..1, scaling the vibrato depth.
    pub fn set_mod_wheel(&mut self, value: f32) {
        self.vibrato_depth.set_target(value.clamp(0.0, 1.0));
    }

    /// Handle a key press (`is_note_on`) or release.
    pub fn set_note(&mut self, is_note_on: bool, note: Note) {
        if is_note_on {
            self.note_on(note);
        } else {
            self.note_off(note.pitch);
        }
    }

    fn note_on(&mut self, note: Note) {
        self.held.push(note);
        let count = self.active_voice_count();
        if self.mode == PlayMode::Poly {
            let index = self.allocate(note.pitch, count);
            self.voices[index].note_on(note);
        } else {
            for voice in &mut self.voices[..count] {
                voice.note_on(note);
            }
        }
    }

    fn allocate(&self, pitch: u8, count: usize) -> usize {
        let voices = &self.voices[..count];
        if self.retrigger == RetriggerPolicy::SamePitch {
            if let Some(index) = voices
                .iter()
                .position(|v| v.is_playing() && v.current_pitch() == pitch)
            {
                return index;
            }
        }
        if let Some(index) = voices.iter().position(|v| !v.is_playing()) {
            return index;
        }
        let oldest = voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.timestamp())
            .map_or(0, |(i, _)| i);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "voice_steal: voice {} pitch {} -> {}",
            oldest,
            voices[oldest].current_pitch(),
            pitch
        );
        oldest
    }

    fn note_off(&mut self, pitch: u8) {
        self.held.remove(pitch);
        let count = self.active_voice_count();

        if self.mode != PlayMode::Poly {
            if let Some(next) = self.held.last() {
                for voice in &mut self.voices[..count] {
                    if voice.current_pitch() != next.pitch {
                        voice.retune(next);
                    }
                }
                return;
            }
            for voice in &mut self.voices[..count] {
                if voice.current_pitch() == pitch && voice.is_playing() {
                    voice.note_off();
                }
            }
        } else {
            for voice in &mut self.voices[..count] {
                if voice.current_pitch() == pitch && voice.is_sounding() {
                    voice.note_off();
                }
            }
        }
    }

    /// Render one sample: the sum of every voice.
    ///
    /// `modulation` carries the router output for this frame; bend,
    /// vibrato and the unison offsets are added to its pitch here.
    #[inline]
    pub fn process(&mut self, modulation: &VoiceModulation) -> f32 {
        let vibrato = self.vibrato.next() * VIBRATO_DEPTH * self.vibrato_depth.get_and_step();
        let pitch_mod = modulation.pitch + self.bend.get_and_step() + vibrato;
        let unison_count = Self::mode_voice_count(PlayMode::Unison);

        let mut sum = 0.0;
        for (i, voice) in self.voices.iter_mut().enumerate() {
            let offset = if self.mode == PlayMode::Unison && i < unison_count {
                unison_offset(i, unison_count)
            } else {
                0.0
            };
            let noise = if self.noise_enabled {
                self.noise.advance()
            } else {
                0.0
            };
            sum += voice.process(&VoiceModulation {
                pitch: pitch_mod + offset,
                noise,
                ..*modulation
            });
        }

        if self.mode == PlayMode::Mono {
            sum
        } else {
            sum * POLY_GAIN
        }
    }

    /// Number of voices that are not idle.
    pub fn playing_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_playing()).count()
    }

    /// All voices.
    pub fn voices(&self) -> &[Voice; N] {
        &self.voices
    }

    /// Voice at `index`.
    pub fn voice(&self, index: usize) -> Option<&Voice> {
        self.voices.get(index)
    }

    /// Held keys, oldest first.
    pub fn held_notes(&self) -> &[Note] {
        self.held.as_slice()
    }

    /// Current smoothed bend in semitones.
    pub fn pitch_bend(&self) -> f32 {
        self.bend.get()
    }

    /// Silence every voice, forget held keys, and zero bend and vibrato.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.kill();
        }
        self.held.clear();
        self.bend.set_immediate(0.0);
        self.vibrato_depth.set_immediate(0.0);
        self.vibrato.reset();
    }
}

/// Static detune of unison voice `index` out of `count`, in semitones.
///
/// Spreads symmetrically over [`UNISON_SPREAD`].
pub fn unison_offset(index: usize, count: usize) -> f32 {
    if count < 2 {
        return 0.0;
    }
    -UNISON_SPREAD / 2.0 + index as f32 * (UNISON_SPREAD / (count - 1) as f32)
}

/// Map a 14-bit pitch-bend value to semitones.
///
/// ```rust
/// use polyanalog_synth::pitch_bend_semitones;
///
/// assert_eq!(pitch_bend_semitones(8192), 0.0);
/// assert_eq!(pitch_bend_semitones(0), -2.0);
/// assert_eq!(pitch_bend_semitones(16383), 2.0);
/// ```
pub fn pitch_bend_semitones(value: u16) -> f32 {
    const CENTER: f32 = 8192.0;
    let v = f32::from(value.min(16383));
    if v < CENTER {
        -(1.0 - v / CENTER) * PITCH_BEND_RANGE
    } else if v > CENTER {
        (v - CENTER) / (16383.0 - CENTER) * PITCH_BEND_RANGE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn pool(mode: PlayMode) -> VoicePool<4> {
        let mut pool = VoicePool::new(SR);
        pool.set_play_mode(mode);
        pool
    }

    fn run(pool: &mut VoicePool<4>, frames: usize) {
        let modulation = VoiceModulation::default();
        for _ in 0..frames {
            pool.process(&modulation);
        }
    }

    #[test]
    fn test_held_notes_dedupe_and_order() {
        let mut held = HeldNotes::new();
        held.push(Note::new(60, 100, 1));
        held.push(Note::new(64, 100, 2));
        held.push(Note::new(60, 100, 3));
        assert_eq!(held.len(), 2);
        assert_eq!(held.last(), Some(Note::new(60, 100, 3)));
        held.remove(60);
        assert_eq!(held.last().map(|n| n.pitch), Some(64));
    }

    #[test]
    fn test_held_notes_drops_oldest_when_full() {
        let mut held = HeldNotes::new();
        for i in 0..(MAX_HELD_NOTES as u8 + 2) {
            held.push(Note::new(40 + i, 100, u64::from(i)));
        }
        assert_eq!(held.len(), MAX_HELD_NOTES);
        assert_eq!(held.as_slice()[0].pitch, 42);
    }

    #[test]
    fn test_poly_first_free_voice() {
        let mut pool = pool(PlayMode::Poly);
        pool.set_note(true, Note::new(60, 100, 1));
        assert!(pool.voices()[0].is_playing());
        assert_eq!(pool.voices()[0].current_pitch(), 60);
        pool.set_note(true, Note::new(62, 100, 2));
        assert_eq!(pool.voices()[1].current_pitch(), 62);
    }

    #[test]
    fn test_poly_steals_oldest() {
        let mut pool = pool(PlayMode::Poly);
        for (i, pitch) in [60u8, 62, 64, 65].iter().enumerate() {
            pool.set_note(true, Note::new(*pitch, 100, i as u64 + 1));
        }
        pool.set_note(true, Note::new(67, 100, 5));
        assert_eq!(pool.voices()[0].current_pitch(), 67);
        pool.set_note(true, Note::new(69, 100, 6));
        assert_eq!(pool.voices()[1].current_pitch(), 69);
        assert_eq!(pool.playing_count(), 4);
    }

    #[test]
    fn test_poly_same_pitch_retrigger() {
        let mut pool = pool(PlayMode::Poly);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(true, Note::new(64, 100, 2));
        pool.set_note(true, Note::new(60, 100, 3));
        assert_eq!(pool.playing_count(), 2);
        assert_eq!(pool.voices()[0].timestamp(), 3);

        let mut pool = pool_with_policy(RetriggerPolicy::Disabled);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(true, Note::new(60, 100, 2));
        assert_eq!(pool.playing_count(), 2);
    }

    fn pool_with_policy(policy: RetriggerPolicy) -> VoicePool<4> {
        let mut pool = pool(PlayMode::Poly);
        pool.set_retrigger_policy(policy);
        assert_eq!(pool.retrigger_policy(), policy);
        pool
    }

    #[test]
    fn test_poly_note_off_releases_only_that_pitch() {
        let mut pool = pool(PlayMode::Poly);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(true, Note::new(64, 100, 2));
        run(&mut pool, 100);
        pool.set_note(false, Note::new(60, 0, 0));
        assert!(!pool.voices()[0].is_sounding());
        assert!(pool.voices()[1].is_sounding());
    }

    #[test]
    fn test_mono_legato_retunes() {
        let mut pool = pool(PlayMode::Mono);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(true, Note::new(67, 100, 2));
        run(&mut pool, 4800);
        let level = pool.voices()[0].envelope_level();

        pool.set_note(false, Note::new(67, 0, 0));
        assert!(pool.voices()[0].is_sounding());
        assert_eq!(pool.voices()[0].current_pitch(), 60);
        run(&mut pool, 1);
        assert!(pool.voices()[0].envelope_level() >= level * 0.99);
    }

    #[test]
    fn test_mono_last_release_closes_gate() {
        let mut pool = pool(PlayMode::Mono);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(false, Note::new(60, 0, 0));
        assert!(!pool.voices()[0].is_sounding());
        assert!(pool.held_notes().is_empty());
    }

    #[test]
    fn test_unison_uses_three_voices() {
        let mut pool = pool(PlayMode::Unison);
        pool.set_note(true, Note::new(60, 100, 1));
        assert_eq!(pool.playing_count(), 3);
        assert!(!pool.voices()[3].is_playing());
    }

    #[test]
    fn test_unison_offsets_symmetric() {
        assert!((unison_offset(0, 3) + 1.0 / 64.0).abs() < 1e-7);
        assert!(unison_offset(1, 3).abs() < 1e-7);
        assert!((unison_offset(2, 3) - 1.0 / 64.0).abs() < 1e-7);
        assert_eq!(unison_offset(0, 1), 0.0);
    }

    #[test]
    fn test_mode_change_releases_everything() {
        let mut pool = pool(PlayMode::Poly);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.set_note(true, Note::new(64, 100, 2));
        run(&mut pool, 480);
        pool.set_play_mode(PlayMode::Mono);
        assert!(pool.voices().iter().all(|v| !v.is_sounding()));
        assert!(pool.held_notes().is_empty());

        // Tails keep playing; only one gate opens in Mono.
        run(&mut pool, 10);
        pool.set_note(true, Note::new(67, 100, 3));
        assert_eq!(pool.voices().iter().filter(|v| v.is_sounding()).count(), 1);
        assert!(pool.playing_count() >= 2);
    }

    #[test]
    fn test_mono_output_unscaled_poly_scaled() {
        let mut mono = pool(PlayMode::Mono);
        let mut poly = pool(PlayMode::Poly);
        mono.set_noise_enabled(false);
        poly.set_noise_enabled(false);
        mono.set_note(true, Note::new(60, 100, 1));
        poly.set_note(true, Note::new(60, 100, 1));
        let modulation = VoiceModulation::default();
        for _ in 0..256 {
            let m = mono.process(&modulation);
            let p = poly.process(&modulation);
            assert!((m * POLY_GAIN - p).abs() < 1e-5);
        }
    }

    #[test]
    fn test_pitch_bend_smoothed_over_800_frames() {
        let mut pool = pool(PlayMode::Mono);
        pool.set_pitch_bend(pitch_bend_semitones(16383));
        run(&mut pool, 400);
        assert!((pool.pitch_bend() - 1.0).abs() < 0.01);
        run(&mut pool, 400);
        assert_eq!(pool.pitch_bend(), 2.0);
    }

    #[test]
    fn test_play_mode_controls() {
        assert_eq!(PlayMode::from_normalized(0.0), PlayMode::Mono);
        assert_eq!(PlayMode::from_normalized(0.5), PlayMode::Unison);
        assert_eq!(PlayMode::from_normalized(1.0), PlayMode::Poly);
        assert_eq!(PlayMode::Poly.next(), PlayMode::Mono);
        for mode in PlayMode::ALL {
            assert_eq!(PlayMode::from_normalized(mode.to_normalized()), mode);
        }
    }

    #[test]
    fn test_reset_silences() {
        let mut pool = pool(PlayMode::Poly);
        pool.set_note(true, Note::new(60, 100, 1));
        pool.reset();
        assert_eq!(pool.playing_count(), 0);
        assert!(pool.held_notes().is_empty());
    }
}
