//! Modulation routing: LFO units and a one-shot envelope unit.
//!
//! Each unit renders one block of its waveform ahead of time, then the
//! kernel pulls per-frame contributions with
//! [`ModulationUnit::get_buffer`]. A unit feeds exactly one destination,
//! chosen by quantizing a 0..1 control over the destinations the build
//! enables. Units aimed at the same destination sum.

use crate::capabilities::Capabilities;
use crate::envelope::AdsrEnvelope;
use polyanalog_core::{Lfo, LfoWaveform, quantize};

/// Frames rendered per [`ModulationUnit::process`] call.
pub const MAX_BLOCK_SIZE: usize = 256;

/// Lowest LFO rate in Hz.
pub const LFO_RATE_MIN_HZ: f32 = 0.05;

/// Highest LFO rate in Hz.
pub const LFO_RATE_MAX_HZ: f32 = 20.0;

/// Most LFO units a router holds.
pub const MAX_LFOS: usize = 2;

/// Modulation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModDestination {
    /// Voice pitch, in semitones.
    Pitch,
    /// Filter cutoff, in semitones.
    FilterCutoff,
    /// Oscillator morph control.
    Waveform,
    /// Output gain.
    Amplitude,
}

impl ModDestination {
    /// All destinations in selection order.
    pub const ALL: [ModDestination; 4] = [
        ModDestination::Pitch,
        ModDestination::FilterCutoff,
        ModDestination::Waveform,
        ModDestination::Amplitude,
    ];

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            ModDestination::Pitch => "Pitch",
            ModDestination::FilterCutoff => "Filter",
            ModDestination::Waveform => "Wave",
            ModDestination::Amplitude => "Amp",
        }
    }

    /// Full-scale contribution at amount 1, in the destination's units.
    pub const fn depth(self) -> f32 {
        match self {
            ModDestination::Pitch => 12.0,
            ModDestination::FilterCutoff => 48.0,
            ModDestination::Waveform => 0.5,
            ModDestination::Amplitude => 1.0,
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A set of enabled destinations.
///
/// ```rust
/// use polyanalog_synth::{DestinationSet, ModDestination};
///
/// let set = DestinationSet::FIRMWARE;
/// assert_eq!(set.len(), 2);
/// assert_eq!(set.select(0.25), Some(ModDestination::Pitch));
/// assert_eq!(set.select(0.75), Some(ModDestination::FilterCutoff));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestinationSet(u8);

impl DestinationSet {
    /// No destinations.
    pub const EMPTY: Self = Self(0);
    /// Pitch and filter cutoff.
    pub const FIRMWARE: Self = Self(ModDestination::Pitch.bit() | ModDestination::FilterCutoff.bit());
    /// Every destination.
    pub const ALL: Self = Self(0b1111);

    /// This set plus `dest`.
    pub const fn with(self, dest: ModDestination) -> Self {
        Self(self.0 | dest.bit())
    }

    /// True if `dest` is enabled.
    pub const fn contains(self, dest: ModDestination) -> bool {
        self.0 & dest.bit() != 0
    }

    /// Number of enabled destinations.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True when nothing is enabled.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Enabled destinations in selection order.
    pub fn iter(self) -> impl Iterator<Item = ModDestination> {
        ModDestination::ALL
            .into_iter()
            .filter(move |d| self.contains(*d))
    }

    /// Quantize a 0..1 control onto the enabled destinations.
    pub fn select(self, value: f32) -> Option<ModDestination> {
        if self.is_empty() {
            return None;
        }
        self.iter().nth(quantize(value, self.len()))
    }
}

impl Default for DestinationSet {
    fn default() -> Self {
        Self::FIRMWARE
    }
}

/// Common interface of LFO and envelope units.
pub trait ModulationUnit {
    /// Set the depth, 0..1.
    fn set_amount(&mut self, amount: f32);

    /// Current depth.
    fn amount(&self) -> f32;

    /// Pick the destination from a 0..1 control.
    fn set_destination_value(&mut self, value: f32);

    /// Active destination, `None` when the build enables none.
    fn destination(&self) -> Option<ModDestination>;

    /// Render `frames` values of the unit's raw signal.
    ///
    /// `frames` beyond [`MAX_BLOCK_SIZE`] are ignored; callers split larger
    /// blocks.
    fn process(&mut self, frames: usize);

    /// Raw signal at `frame` of the last rendered block.
    fn wave(&self, frame: usize) -> f32;

    /// Destination display name.
    fn destination_name(&self) -> &'static str {
        self.destination().map_or("Off", ModDestination::name)
    }

    /// `amount × mult × wave[frame]` when `dest` is this unit's destination, else 0.
    #[inline]
    fn get_buffer(&self, dest: ModDestination, frame: usize, mult: f32) -> f32 {
        if self.destination() == Some(dest) {
            self.amount() * mult * self.wave(frame)
        } else {
            0.0
        }
    }
}

/// Bipolar LFO routed to one destination.
#[derive(Debug, Clone)]
pub struct LfoUnit {
    lfo: Lfo,
    amount: f32,
    destinations: DestinationSet,
    destination: Option<ModDestination>,
    buffer: [f32; MAX_BLOCK_SIZE],
}

impl LfoUnit {
    /// Create a sine LFO at 1 Hz with zero depth.
    pub fn new(sample_rate: f32, destinations: DestinationSet) -> Self {
        Self {
            lfo: Lfo::new(sample_rate, 1.0),
            amount: 0.0,
            destinations,
            destination: destinations.select(0.0),
            buffer: [0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Set the rate from a 0..1 control, exponential between
    /// [`LFO_RATE_MIN_HZ`] and [`LFO_RATE_MAX_HZ`].
    pub fn set_rate(&mut self, value: f32) {
        self.lfo.set_frequency(lfo_rate_hz(value));
    }

    /// Rate in Hz.
    pub fn rate_hz(&self) -> f32 {
        self.lfo.frequency()
    }

    /// Select the waveform.
    pub fn set_waveform(&mut self, waveform: LfoWaveform) {
        self.lfo.set_waveform(waveform);
    }

    /// Current waveform.
    pub fn waveform(&self) -> LfoWaveform {
        self.lfo.waveform()
    }

    /// Restart the phase and clear the block.
    pub fn reset(&mut self) {
        self.lfo.reset();
        self.buffer = [0.0; MAX_BLOCK_SIZE];
    }
}

impl ModulationUnit for LfoUnit {
    fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
    }

    fn amount(&self) -> f32 {
        self.amount
    }

    fn set_destination_value(&mut self, value: f32) {
        self.destination = self.destinations.select(value);
    }

    fn destination(&self) -> Option<ModDestination> {
        self.destination
    }

    fn process(&mut self, frames: usize) {
        let frames = frames.min(MAX_BLOCK_SIZE);
        self.lfo.fill(&mut self.buffer[..frames]);
    }

    #[inline]
    fn wave(&self, frame: usize) -> f32 {
        self.buffer.get(frame).copied().unwrap_or(0.0)
    }
}

/// Map a 0..1 control onto the LFO rate range.
pub fn lfo_rate_hz(value: f32) -> f32 {
    let v = value.clamp(0.0, 1.0);
    LFO_RATE_MIN_HZ * libm::powf(LFO_RATE_MAX_HZ / LFO_RATE_MIN_HZ, v)
}

/// Unipolar attack/decay envelope fired on every note-on.
#[derive(Debug, Clone)]
pub struct EnvelopeUnit {
    env: AdsrEnvelope,
    amount: f32,
    destinations: DestinationSet,
    destination: Option<ModDestination>,
    buffer: [f32; MAX_BLOCK_SIZE],
}

impl EnvelopeUnit {
    /// Create an envelope unit with 10 ms attack and 300 ms decay.
    pub fn new(sample_rate: f32, destinations: DestinationSet) -> Self {
        let mut env = AdsrEnvelope::new(sample_rate);
        env.set_attack_time(0.01);
        env.set_decay_time(0.3);
        env.set_sustain(0.0);
        Self {
            env,
            amount: 0.0,
            destinations,
            destination: destinations.select(0.0),
            buffer: [0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Attack time in seconds.
    pub fn set_attack(&mut self, seconds: f32) {
        self.env.set_attack_time(seconds);
    }

    /// Decay time in seconds.
    pub fn set_decay(&mut self, seconds: f32) {
        self.env.set_decay_time(seconds);
    }

    /// Restart from zero.
    pub fn trigger(&mut self) {
        self.env.retrigger(true);
    }

    /// Current level.
    pub fn level(&self) -> f32 {
        self.env.level()
    }

    /// Stop and clear.
    pub fn reset(&mut self) {
        self.env.reset();
        self.buffer = [0.0; MAX_BLOCK_SIZE];
    }
}

impl ModulationUnit for EnvelopeUnit {
    fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, 1.0);
    }

    fn amount(&self) -> f32 {
        self.amount
    }

    fn set_destination_value(&mut self, value: f32) {
        self.destination = self.destinations.select(value);
    }

    fn destination(&self) -> Option<ModDestination> {
        self.destination
    }

    fn process(&mut self, frames: usize) {
        let frames = frames.min(MAX_BLOCK_SIZE);
        for slot in &mut self.buffer[..frames] {
            *slot = self.env.advance();
        }
    }

    #[inline]
    fn wave(&self, frame: usize) -> f32 {
        self.buffer.get(frame).copied().unwrap_or(0.0)
    }
}

/// The LFO units and optional envelope unit of one engine.
#[derive(Debug, Clone)]
pub struct ModRouter {
    lfos: [LfoUnit; MAX_LFOS],
    lfo_count: usize,
    envelope: EnvelopeUnit,
    envelope_enabled: bool,
}

impl ModRouter {
    /// Build a router for the given capabilities.
    ///
    /// LFO A starts at destination control 0.25 and LFO B at 0.75.
    pub fn new(sample_rate: f32, capabilities: &Capabilities) -> Self {
        let destinations = capabilities.destinations();
        let mut lfos: [LfoUnit; MAX_LFOS] =
            core::array::from_fn(|_| LfoUnit::new(sample_rate, destinations));
        lfos[0].set_destination_value(0.25);
        lfos[1].set_destination_value(0.75);
        Self {
            lfos,
            lfo_count: capabilities.lfo_count(),
            envelope: EnvelopeUnit::new(sample_rate, destinations),
            envelope_enabled: capabilities.mod_envelope(),
        }
    }

    /// Number of active LFO units.
    pub fn lfo_count(&self) -> usize {
        self.lfo_count
    }

    /// LFO unit `index`, if active.
    pub fn lfo(&self, index: usize) -> Option<&LfoUnit> {
        self.lfos[..self.lfo_count].get(index)
    }

    /// Mutable LFO unit `index`, if active.
    pub fn lfo_mut(&mut self, index: usize) -> Option<&mut LfoUnit> {
        self.lfos[..self.lfo_count].get_mut(index)
    }

    /// Envelope unit, if enabled.
    pub fn envelope(&self) -> Option<&EnvelopeUnit> {
        self.envelope_enabled.then_some(&self.envelope)
    }

    /// Mutable envelope unit, if enabled.
    pub fn envelope_mut(&mut self) -> Option<&mut EnvelopeUnit> {
        self.envelope_enabled.then_some(&mut self.envelope)
    }

    /// Fire the envelope unit.
    pub fn trigger_envelope(&mut self) {
        if self.envelope_enabled {
            self.envelope.trigger();
        }
    }

    /// Render the next block on every active unit.
    pub fn process(&mut self, frames: usize) {
        for lfo in &mut self.lfos[..self.lfo_count] {
            lfo.process(frames);
        }
        if self.envelope_enabled {
            self.envelope.process(frames);
        }
    }

    /// Summed contribution of every unit aimed at `dest`, scaled by the
    /// destination depth.
    #[inline]
    pub fn contribution(&self, dest: ModDestination, frame: usize) -> f32 {
        let mult = dest.depth();
        let mut sum: f32 = self.lfos[..self.lfo_count]
            .iter()
            .map(|lfo| lfo.get_buffer(dest, frame, mult))
            .sum();
        if self.envelope_enabled {
            sum += self.envelope.get_buffer(dest, frame, mult);
        }
        sum
    }

    /// Reset phases and envelope.
    pub fn reset(&mut self) {
        for lfo in &mut self.lfos {
            lfo.reset();
        }
        self.envelope.reset();
    }
}
