//! PolyAnalog Synth - the polyphonic voice engine
//!
//! Turns note and control events into a continuous sample stream under a
//! hard real-time deadline: no allocation, no blocking, and a bounded
//! amount of work per sample.
//!
//! # Components
//!
//! ## Oscillators
//!
//! - [`Oscillator`] - PolyBLEP saw and pulse
//! - [`DualOscillator`] - Two oscillators whose shape, detune and blend all
//!   follow one morph control ([`MorphState`])
//!
//! ```rust
//! use polyanalog_synth::{Oscillator, OscillatorWaveform};
//!
//! let mut osc = Oscillator::new(48000.0);
//! osc.set_frequency(440.0);
//! osc.set_waveform(OscillatorWaveform::Pulse(0.25));
//!
//! let sample = osc.advance();
//! assert!(sample.abs() <= 1.5);
//! ```
//!
//! ## Voices
//!
//! - [`Voice`] - Oscillator pair, noise blend, resonant lowpass, ADSR
//! - [`VoicePool`] - Mono, Unison and Poly allocation with voice stealing
//!
//! ## Modulation
//!
//! - [`ModRouter`] - LFO units and an optional envelope unit, each routed
//!   to one [`ModDestination`]
//!
//! ## Engine
//!
//! - [`SynthKernel`] - Event handling, the parameter table ([`Param`]) and
//!   the block loop
//! - [`Capabilities`] - Which optional hardware features the build has
//!
//! ```rust
//! use polyanalog_synth::{Capabilities, SynthEvent, SynthKernel};
//!
//! let mut synth: SynthKernel = SynthKernel::new(48000.0, Capabilities::firmware());
//! synth.handle_event(SynthEvent::NoteOn { pitch: 69, velocity: 100 });
//!
//! let mut block = [0.0f32; 256];
//! synth.process(&mut [&mut block[..]]);
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! polyanalog-synth = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature logs play-mode changes, preset loads,
//! ignored parameter indices and voice steals. Nothing is logged per sample.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod capabilities;
pub mod dual_osc;
pub mod envelope;
pub mod kernel;
pub mod mod_router;
pub mod oscillator;
pub mod params;
pub mod voice;
pub mod voice_pool;

pub use capabilities::{Capabilities, RetriggerPolicy};
pub use dual_osc::{DualOscillator, MorphState};
pub use envelope::{AdsrEnvelope, EnvelopeState};
pub use kernel::{POLYPHONY, SynthEvent, SynthKernel};
pub use mod_router::{
    DestinationSet, EnvelopeUnit, LfoUnit, MAX_BLOCK_SIZE, ModDestination, ModRouter,
    ModulationUnit,
};
pub use oscillator::{Oscillator, OscillatorWaveform, WhiteNoise};
pub use params::{MIDI_CC_MOD_WHEEL, MIDI_CC_START, PARAM_COUNT, PARAMS, Param, default_values};
pub use voice::{BTUNE, Note, Voice, VoiceModulation, VoiceParams, VoiceState};
pub use voice_pool::{HeldNotes, PlayMode, VoicePool, pitch_bend_semitones, unison_offset};

// Re-export commonly used types from polyanalog-core
pub use polyanalog_core::{LfoWaveform, ParamDescriptor, ParameterInfo};
