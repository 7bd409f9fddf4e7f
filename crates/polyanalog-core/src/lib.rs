//! PolyAnalog Core - DSP primitives for the voice engine
//!
//! The building blocks the synth crate assembles into voices: parameter
//! smoothers, filters, a modulation oscillator, and the small math helpers
//! that map controls onto pitch, time and mix amounts. Everything here is
//! allocation-free and safe to call from the audio callback.
//!
//! # Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//! - [`LinearSmoothedParam`] - Linear ramps with a fixed frame count, used
//!   for glide and pitch-bend dezippering
//!
//! # Filters
//!
//! - [`Biquad`] - Second-order IIR, resonant lowpass via RBJ coefficients
//! - [`OnePole`] - 6 dB/oct highpass
//!
//! # Modulation
//!
//! - [`Lfo`] - Low-frequency oscillator (5 waveforms)
//!
//! # Parameter Metadata
//!
//! - [`ParamDescriptor`] - Names, units, range and mapping curve
//! - [`ParameterInfo`] - Introspection trait for processors
//!
//! # no_std Support
//!
//! Disable the default `std` feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! polyanalog-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod biquad;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod param;
pub mod param_info;

pub use biquad::{Biquad, MAX_CUTOFF_RATIO, MIN_CUTOFF_HZ, lowpass_coefficients};
pub use lfo::{Lfo, LfoWaveform};
pub use math::{equal_power_mix, flush_denormal, mtof, quantize, soft_clip};
pub use one_pole::OnePole;
pub use param::{LinearSmoothedParam, SmoothedParam};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo};
