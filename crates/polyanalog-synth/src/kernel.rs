//! The synth kernel: event handling, parameter dispatch and the block loop.
//!
//! The kernel owns one [`VoicePool`], one [`ModRouter`] and the output
//! stage. Events and parameter changes are applied between blocks; the
//! block loop itself never allocates.
//!
//! Output per frame:
//!
//! ```text
//! out = soft_clip(highpass(pool × volume × amp_mod) × 0.333)
//! ```
//!
//! and the same sample is written to every channel.

use crate::capabilities::Capabilities;
use crate::mod_router::{MAX_BLOCK_SIZE, ModDestination, ModRouter, ModulationUnit};
use crate::params::{MIDI_CC_MOD_WHEEL, PARAM_COUNT, PARAMS, Param, default_values};
use crate::voice::{Note, VoiceModulation, VoiceParams};
use crate::voice_pool::{PlayMode, VoicePool, pitch_bend_semitones};
use polyanalog_core::{
    LfoWaveform, OnePole, ParamDescriptor, ParameterInfo, SmoothedParam, mtof, soft_clip,
};

/// Default polyphony.
pub const POLYPHONY: usize = 4;

/// Output high-pass corner before the parameter is first written.
pub const INITIAL_HIGH_PASS_HZ: f32 = 10.0;

/// Volume smoothing time.
const VOLUME_SMOOTHING_MS: f32 = 10.0;

/// Headroom applied before the soft clipper.
const OUTPUT_GAIN: f32 = 0.333;

/// A decoded input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SynthEvent {
    /// Key press. Velocity 0 is treated as a release.
    NoteOn {
        /// MIDI note number.
        pitch: u8,
        /// Velocity 1..127.
        velocity: u8,
    },
    /// Key release.
    NoteOff {
        /// MIDI note number.
        pitch: u8,
    },
    /// MIDI control change.
    ControlChange {
        /// Controller number.
        controller: u8,
        /// Controller value 0..127.
        value: u8,
    },
    /// 14-bit pitch bend, 8192 at center.
    PitchBend(u16),
}

/// Polyphonic synth engine with `N` voices.
///
/// # Example
///
/// ```rust
/// use polyanalog_synth::{Capabilities, Param, SynthEvent, SynthKernel};
///
/// let mut synth: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
/// synth.update_parameter(Param::PlayMode.index(), 1.0);
/// synth.handle_event(SynthEvent::NoteOn { pitch: 60, velocity: 100 });
///
/// let mut left = [0.0f32; 128];
/// let mut right = [0.0f32; 128];
/// synth.process(&mut [&mut left[..], &mut right[..]]);
/// assert_eq!(left, right);
/// assert!(left.iter().any(|s| *s != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct SynthKernel<const N: usize = POLYPHONY> {
    pool: VoicePool<N>,
    router: ModRouter,
    capabilities: Capabilities,
    values: [f32; PARAM_COUNT],
    voice_params: VoiceParams,
    volume: SmoothedParam,
    high_pass: OnePole,
    timestamp: u64,
    last_param: Option<Param>,
    sample_rate: f32,
}

impl<const N: usize> SynthKernel<N> {
    /// Build a kernel and apply every parameter default.
    pub fn new(sample_rate: f32, capabilities: Capabilities) -> Self {
        let mut pool = VoicePool::new(sample_rate);
        pool.set_retrigger_policy(capabilities.retrigger());
        pool.set_noise_enabled(capabilities.noise_mixer());

        let mut kernel = Self {
            pool,
            router: ModRouter::new(sample_rate, &capabilities),
            capabilities,
            values: default_values(),
            voice_params: VoiceParams::default(),
            volume: SmoothedParam::with_config(0.0, sample_rate, VOLUME_SMOOTHING_MS),
            high_pass: OnePole::new(sample_rate, INITIAL_HIGH_PASS_HZ),
            timestamp: 0,
            last_param: None,
            sample_rate,
        };

        let defaults = kernel.values;
        for (index, value) in defaults.iter().enumerate() {
            if index != Param::HighPass.index() {
                kernel.update_parameter(index, *value);
            }
        }
        kernel.volume.snap_to_target();
        kernel.last_param = None;
        kernel
    }

    /// Sample rate the kernel was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// The feature set fixed at construction.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Apply one input event.
    pub fn handle_event(&mut self, event: SynthEvent) {
        match event {
            SynthEvent::NoteOn { pitch, velocity: 0 } | SynthEvent::NoteOff { pitch } => {
                self.pool.set_note(false, Note::new(pitch, 0, 0));
            }
            SynthEvent::NoteOn { pitch, velocity } => {
                self.timestamp += 1;
                self.pool
                    .set_note(true, Note::new(pitch, velocity, self.timestamp));
                self.router.trigger_envelope();
            }
            SynthEvent::ControlChange { controller, value } => {
                let value = f32::from(value.min(127)) / 127.0;
                if controller == MIDI_CC_MOD_WHEEL {
                    self.pool.set_mod_wheel(value);
                } else if let Some(param) = Param::from_cc(controller) {
                    self.update_parameter(param.index(), value);
                }
            }
            SynthEvent::PitchBend(value) => {
                self.pool.set_pitch_bend(pitch_bend_semitones(value));
            }
        }
    }

    /// Set parameter `index` from a normalized 0..1 control.
    ///
    /// Out-of-range indices are ignored and values are clamped.
    pub fn update_parameter(&mut self, index: usize, value: f32) {
        let Some(param) = Param::from_index(index) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("ignored parameter index {index}");
            return;
        };
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.values[index] = value;
        self.last_param = Some(param);
        let physical = param.denormalize(value);

        match param {
            Param::PlayMode => self.pool.set_play_mode(PlayMode::from_normalized(value)),
            Param::Volume => self.volume.set_target(physical),
            Param::HighPass => self.high_pass.set_frequency(mtof(physical)),

            Param::LfoTypeA | Param::LfoTypeB => {
                if let Some(lfo) = self.router.lfo_mut(lfo_index(param)) {
                    lfo.set_waveform(LfoWaveform::from_normalized(value));
                }
            }
            Param::LfoDestinationA | Param::LfoDestinationB => {
                if let Some(lfo) = self.router.lfo_mut(lfo_index(param)) {
                    lfo.set_destination_value(value);
                }
            }
            Param::LfoRateA | Param::LfoRateB => {
                if let Some(lfo) = self.router.lfo_mut(lfo_index(param)) {
                    lfo.set_rate(value);
                }
            }
            Param::LfoAmountA | Param::LfoAmountB => {
                if let Some(lfo) = self.router.lfo_mut(lfo_index(param)) {
                    lfo.set_amount(value);
                }
            }

            Param::ModEnvAttack => {
                if let Some(env) = self.router.envelope_mut() {
                    env.set_attack(physical);
                }
            }
            Param::ModEnvDecay => {
                if let Some(env) = self.router.envelope_mut() {
                    env.set_decay(physical);
                }
            }
            Param::ModEnvAmount => {
                if let Some(env) = self.router.envelope_mut() {
                    env.set_amount(value);
                }
            }
            Param::ModEnvDestination => {
                if let Some(env) = self.router.envelope_mut() {
                    env.set_destination_value(value);
                }
            }

            _ => self.update_voice_param(param, physical),
        }
    }

    fn update_voice_param(&mut self, param: Param, physical: f32) {
        let p = &mut self.voice_params;
        match param {
            Param::Glide => p.glide = physical,
            Param::OscWaveformA => p.waveform_a = physical,
            Param::OscOctaveA => p.octave = physical as i8,
            Param::OscWaveformB => p.waveform_b = physical,
            Param::OscTuneB => p.tune_index = physical as usize,
            Param::Noise => {
                if !self.capabilities.noise_mixer() {
                    return;
                }
                p.noise = physical;
            }
            Param::OscMix => p.mix = physical,
            Param::FilterCutoff => p.filter_cutoff = physical,
            Param::FilterResonance => p.filter_q = physical,
            Param::FilterEnv => p.filter_env = physical,
            Param::Attack => p.attack = physical,
            Param::Decay => {
                p.decay = physical;
                if !self.capabilities.separate_release() {
                    p.release = physical;
                }
            }
            Param::Sustain => p.sustain = physical,
            Param::Release => {
                if !self.capabilities.separate_release() {
                    return;
                }
                p.release = physical;
            }
            _ => return,
        }
        self.pool.apply_params(&self.voice_params);
    }

    /// Current normalized value of parameter `index`, or `None`.
    pub fn parameter(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Name of the most recently changed parameter.
    pub fn last_parameter_name(&self) -> Option<&'static str> {
        self.last_param.map(|p| p.descriptor().name)
    }

    /// Destination name of LFO `index`, `None` for an LFO the build lacks.
    pub fn lfo_destination_name(&self, index: usize) -> Option<&'static str> {
        self.router.lfo(index).map(ModulationUnit::destination_name)
    }

    /// Current play mode.
    pub fn play_mode(&self) -> PlayMode {
        self.pool.play_mode()
    }

    /// Cycle Mono → Unison → Poly → Mono.
    pub fn toggle_play_mode(&mut self) {
        let next = self.play_mode().next();
        self.update_parameter(Param::PlayMode.index(), next.to_normalized());
    }

    /// Every parameter as a flat normalized array.
    pub fn snapshot(&self) -> [f32; PARAM_COUNT] {
        self.values
    }

    /// Apply a flat normalized array in index order. Extra entries are ignored.
    pub fn load_preset(&mut self, values: &[f32]) {
        #[cfg(feature = "tracing")]
        tracing::debug!("load_preset: {} values", values.len());
        for (index, value) in values.iter().take(PARAM_COUNT).enumerate() {
            self.update_parameter(index, *value);
        }
    }

    /// Silence every voice and clear held notes, bend, and modulation state.
    pub fn reset(&mut self) {
        self.pool.reset();
        self.router.reset();
        self.high_pass.reset();
        self.volume.snap_to_target();
    }

    /// The voice pool.
    pub fn pool(&self) -> &VoicePool<N> {
        &self.pool
    }

    /// The modulation router.
    pub fn router(&self) -> &ModRouter {
        &self.router
    }

    /// Render planar output. Every channel receives the same signal; the
    /// shortest channel sets the frame count.
    pub fn process(&mut self, outputs: &mut [&mut [f32]]) {
        let Some(frames) = outputs.iter().map(|c| c.len()).min() else {
            return;
        };
        let mut start = 0;
        while start < frames {
            let len = (frames - start).min(MAX_BLOCK_SIZE);
            self.router.process(len);
            for i in 0..len {
                let sample = self.render_frame(i);
                for channel in outputs.iter_mut() {
                    channel[start + i] = sample;
                }
            }
            start += len;
        }
    }

    /// Render interleaved output with `channels` channels per frame.
    pub fn process_interleaved(&mut self, output: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let frames = output.len() / channels;
        let mut start = 0;
        while start < frames {
            let len = (frames - start).min(MAX_BLOCK_SIZE);
            self.router.process(len);
            for i in 0..len {
                let sample = self.render_frame(i);
                let base = (start + i) * channels;
                output[base..base + channels].fill(sample);
            }
            start += len;
        }
    }

    #[inline]
    fn render_frame(&mut self, frame: usize) -> f32 {
        let modulation = VoiceModulation {
            pitch: self.router.contribution(ModDestination::Pitch, frame),
            filter: self.router.contribution(ModDestination::FilterCutoff, frame),
            waveform: self.router.contribution(ModDestination::Waveform, frame),
            noise: 0.0,
        };
        let amp = (1.0 + self.router.contribution(ModDestination::Amplitude, frame)).max(0.0);
        let synth = self.pool.process(&modulation);
        let out = self
            .high_pass
            .process_highpass(synth * self.volume.advance() * amp);
        soft_clip(out * OUTPUT_GAIN)
    }
}

fn lfo_index(param: Param) -> usize {
    match param {
        Param::LfoTypeB | Param::LfoDestinationB | Param::LfoRateB | Param::LfoAmountB => 1,
        _ => 0,
    }
}

impl<const N: usize> ParameterInfo for SynthKernel<N> {
    fn param_count(&self) -> usize {
        PARAM_COUNT
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        PARAMS.get(index).copied()
    }

    fn get_param(&self, index: usize) -> f32 {
        match (PARAMS.get(index), self.values.get(index)) {
            (Some(desc), Some(value)) => desc.denormalize(*value),
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f32) {
        if let Some(desc) = PARAMS.get(index) {
            self.update_parameter(index, desc.normalize(value));
        }
    }
}
