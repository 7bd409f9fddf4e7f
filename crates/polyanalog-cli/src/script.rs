//! TOML render scripts.
//!
//! A script fixes the output format, picks a starting sound and lists
//! timed events:
//!
//! ```toml
//! sample_rate = 48000
//! duration = 2.0
//! channels = 2
//! preset = "pad"
//!
//! [capabilities]
//! mod_envelope = true
//! destinations = ["pitch", "filter", "amplitude"]
//!
//! [params]
//! filter_cutoff = 0.4
//!
//! [[events]]
//! time = 0.0
//! type = "note_on"
//! pitch = 60
//!
//! [[events]]
//! time = 1.5
//! type = "note_off"
//! pitch = 60
//! ```
//!
//! `params` holds normalized values keyed by string id and is applied after
//! the preset. A `param` event takes a physical value instead.

use anyhow::{Context, bail};
use polyanalog_config::Preset;
use polyanalog_synth::{
    Capabilities, DestinationSet, ModDestination, PARAMS, ParameterInfo, RetriggerPolicy,
    SynthEvent, SynthKernel,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const MAX_CHANNELS: u16 = 8;

fn default_sample_rate() -> u32 {
    48000
}

fn default_channels() -> u16 {
    2
}

fn default_velocity() -> u8 {
    100
}

/// A complete render script.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderScript {
    /// Output sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Render length in seconds.
    pub duration: f64,
    /// Output channel count; every channel carries the same signal.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Factory preset name or preset file.
    #[serde(default)]
    pub preset: Option<String>,
    /// Engine feature overrides on top of the stock instrument.
    #[serde(default)]
    pub capabilities: CapabilityOverrides,
    /// Normalized parameter values by string id.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
    /// Timed events.
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

/// Feature overrides. Unset fields keep the stock value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilityOverrides {
    /// Number of LFO units.
    pub lfo_count: Option<usize>,
    /// Noise mixer fitted.
    pub noise_mixer: Option<bool>,
    /// Modulation envelope fitted.
    pub mod_envelope: Option<bool>,
    /// Release has its own control.
    pub separate_release: Option<bool>,
    /// Poly same-pitch retrigger.
    pub retrigger: Option<Retrigger>,
    /// Reachable modulation destinations.
    pub destinations: Option<Vec<Destination>>,
}

/// Retrigger policy names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Retrigger {
    /// Always take a free or stolen voice.
    Disabled,
    /// Retrigger the voice already on that pitch.
    SamePitch,
}

/// Modulation destination names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Voice pitch.
    Pitch,
    /// Filter cutoff.
    Filter,
    /// Oscillator morph.
    Waveform,
    /// Output gain.
    Amplitude,
}

impl From<Destination> for ModDestination {
    fn from(dest: Destination) -> Self {
        match dest {
            Destination::Pitch => ModDestination::Pitch,
            Destination::Filter => ModDestination::FilterCutoff,
            Destination::Waveform => ModDestination::Waveform,
            Destination::Amplitude => ModDestination::Amplitude,
        }
    }
}

impl CapabilityOverrides {
    /// Apply the overrides to `base`.
    pub fn apply(&self, base: Capabilities) -> Capabilities {
        let mut caps = base;
        if let Some(count) = self.lfo_count {
            caps = caps.with_lfo_count(count);
        }
        if let Some(enabled) = self.noise_mixer {
            caps = caps.with_noise_mixer(enabled);
        }
        if let Some(enabled) = self.mod_envelope {
            caps = caps.with_mod_envelope(enabled);
        }
        if let Some(enabled) = self.separate_release {
            caps = caps.with_separate_release(enabled);
        }
        if let Some(retrigger) = self.retrigger {
            caps = caps.with_retrigger(match retrigger {
                Retrigger::Disabled => RetriggerPolicy::Disabled,
                Retrigger::SamePitch => RetriggerPolicy::SamePitch,
            });
        }
        if let Some(destinations) = &self.destinations {
            let set = destinations
                .iter()
                .fold(DestinationSet::EMPTY, |set, d| set.with((*d).into()));
            caps = caps.with_destinations(set);
        }
        caps
    }
}

/// An event at a time in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimedEvent {
    /// Seconds from the start of the render.
    pub time: f64,
    /// What happens.
    #[serde(flatten)]
    pub event: ScriptEvent,
}

/// Script event kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Key press.
    NoteOn {
        /// MIDI note number.
        pitch: u8,
        /// Velocity, 100 when omitted.
        #[serde(default = "default_velocity")]
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
    PitchBend {
        /// Raw bend value.
        value: u16,
    },
    /// Set a parameter to a physical value.
    Param {
        /// Name, short name or string id.
        name: String,
        /// Physical value in the parameter's unit.
        value: f32,
    },
}

impl RenderScript {
    /// Load and validate a script file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("invalid script '{}'", path.display()))
    }

    /// Parse and validate a script. Events come back sorted by time.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let mut script: RenderScript = toml::from_str(toml_str)?;
        script.validate()?;
        script.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(script)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 {
            bail!("sample_rate must be positive");
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            bail!("duration must be a non-negative number of seconds");
        }
        if self.channels == 0 || self.channels > MAX_CHANNELS {
            bail!("channels must be 1..={MAX_CHANNELS}, got {}", self.channels);
        }
        for id in self.params.keys() {
            if !PARAMS.iter().any(|p| p.string_id == id.as_str()) {
                bail!("unknown parameter '{id}' in [params]");
            }
        }
        for event in &self.events {
            if !event.time.is_finite() || event.time < 0.0 {
                bail!("event time {} is not a non-negative number", event.time);
            }
        }
        Ok(())
    }

    /// Total frames to render.
    pub fn total_frames(&self) -> u64 {
        (self.duration * f64::from(self.sample_rate)).round() as u64
    }

    /// Frame at which `event` fires.
    pub fn event_frame(&self, event: &TimedEvent) -> u64 {
        (event.time * f64::from(self.sample_rate)).round() as u64
    }

    /// Resolve the starting preset, if any.
    pub fn resolve_preset(&self) -> anyhow::Result<Option<Preset>> {
        self.preset
            .as_deref()
            .map(Preset::resolve)
            .transpose()
            .context("failed to resolve preset")
    }

    /// Build a kernel with the script's features, preset and parameters.
    pub fn build_kernel(&self) -> anyhow::Result<SynthKernel> {
        let caps = self.capabilities.apply(Capabilities::firmware());
        let mut kernel: SynthKernel = SynthKernel::new(self.sample_rate as f32, caps);

        if let Some(preset) = self.resolve_preset()? {
            tracing::info!("preset: {}", preset.name);
            kernel.load_preset(&preset.values);
        }
        for (id, value) in &self.params {
            if let Some(index) = PARAMS.iter().position(|p| p.string_id == id.as_str()) {
                kernel.update_parameter(index, *value);
            }
        }
        Ok(kernel)
    }
}

/// Deliver one script event to the kernel.
pub fn apply_event(kernel: &mut SynthKernel, event: &ScriptEvent) -> anyhow::Result<()> {
    match event {
        ScriptEvent::NoteOn { pitch, velocity } => kernel.handle_event(SynthEvent::NoteOn {
            pitch: *pitch,
            velocity: *velocity,
        }),
        ScriptEvent::NoteOff { pitch } => {
            kernel.handle_event(SynthEvent::NoteOff { pitch: *pitch });
        }
        ScriptEvent::ControlChange { controller, value } => {
            kernel.handle_event(SynthEvent::ControlChange {
                controller: *controller,
                value: *value,
            });
        }
        ScriptEvent::PitchBend { value } => kernel.handle_event(SynthEvent::PitchBend(*value)),
        ScriptEvent::Param { name, value } => {
            let index = kernel
                .find_param_by_name(name)
                .with_context(|| format!("unknown parameter '{name}'"))?;
            kernel.set_param(index, *value);
        }
    }
    Ok(())
}
