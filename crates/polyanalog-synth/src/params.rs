//! The engine's parameter table.
//!
//! Indices are stable: presets and MIDI CC numbers address parameters by
//! position. The first 24 match the hardware panel; the release and
//! modulation-envelope controls come after them so older presets still
//! line up.
//!
//! Every entry is a [`ParamDescriptor`] in physical units. The kernel stores
//! the normalized `0..1` control and maps it through the descriptor.

use polyanalog_core::{ParamDescriptor, ParamId, ParamScale, ParamUnit};

/// Number of parameters.
pub const PARAM_COUNT: usize = 29;

/// MIDI CC number mapped to parameter 0.
pub const MIDI_CC_START: u8 = 10;

/// MIDI CC number of the mod wheel.
pub const MIDI_CC_MOD_WHEEL: u8 = 1;

/// Parameter indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
#[allow(missing_docs)]
pub enum Param {
    PlayMode = 0,
    Glide,
    Volume,
    OscWaveformA,
    OscOctaveA,
    OscWaveformB,
    OscTuneB,
    Noise,
    OscMix,
    FilterCutoff,
    FilterResonance,
    FilterEnv,
    Attack,
    Decay,
    Sustain,
    HighPass,
    LfoTypeA,
    LfoDestinationA,
    LfoRateA,
    LfoAmountA,
    LfoTypeB,
    LfoDestinationB,
    LfoRateB,
    LfoAmountB,
    Release,
    ModEnvAttack,
    ModEnvDecay,
    ModEnvAmount,
    ModEnvDestination,
}

impl Param {
    /// Every parameter in index order.
    pub const ALL: [Param; PARAM_COUNT] = [
        Param::PlayMode,
        Param::Glide,
        Param::Volume,
        Param::OscWaveformA,
        Param::OscOctaveA,
        Param::OscWaveformB,
        Param::OscTuneB,
        Param::Noise,
        Param::OscMix,
        Param::FilterCutoff,
        Param::FilterResonance,
        Param::FilterEnv,
        Param::Attack,
        Param::Decay,
        Param::Sustain,
        Param::HighPass,
        Param::LfoTypeA,
        Param::LfoDestinationA,
        Param::LfoRateA,
        Param::LfoAmountA,
        Param::LfoTypeB,
        Param::LfoDestinationB,
        Param::LfoRateB,
        Param::LfoAmountB,
        Param::Release,
        Param::ModEnvAttack,
        Param::ModEnvDecay,
        Param::ModEnvAmount,
        Param::ModEnvDestination,
    ];

    /// Parameter at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Descriptor for this parameter.
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &PARAMS[self.index()]
    }

    /// Map a normalized control to this parameter's physical value.
    pub fn denormalize(self, normalized: f32) -> f32 {
        self.descriptor().denormalize(normalized)
    }

    /// Parameter addressed by a MIDI CC number. CC 1 and numbers below
    /// [`MIDI_CC_START`] map to nothing.
    pub fn from_cc(controller: u8) -> Option<Self> {
        controller
            .checked_sub(MIDI_CC_START)
            .and_then(|i| Self::from_index(usize::from(i)))
    }
}

const fn seconds(
    name: &'static str,
    short: &'static str,
    min: f32,
    max: f32,
    default: f32,
) -> ParamDescriptor {
    ParamDescriptor::new(name, short, ParamUnit::Seconds, min, max, default)
        .with_scale(ParamScale::Power(3.0))
}

const fn lfo_rate(name: &'static str) -> ParamDescriptor {
    ParamDescriptor::new(name, "Rate", ParamUnit::Hertz, 0.05, 20.0, 1.0)
        .with_scale(ParamScale::Logarithmic)
}

/// Descriptors in index order.
pub static PARAMS: [ParamDescriptor; PARAM_COUNT] = [
    ParamDescriptor::stepped("Play Mode", "Mode", ParamUnit::None, 0.0, 2.0, 0.0)
        .with_id(ParamId(0), "play_mode")
        .with_group("global"),
    ParamDescriptor::amount("Glide", "Glide", 0.0)
        .with_id(ParamId(1), "glide")
        .with_group("global"),
    ParamDescriptor::amount("Volume", "Vol", 0.8)
        .with_id(ParamId(2), "volume")
        .with_group("global"),
    ParamDescriptor::amount("Osc A Waveform", "WaveA", 0.0)
        .with_id(ParamId(3), "osc_a_waveform")
        .with_group("osc_a"),
    ParamDescriptor::stepped("Osc A Octave", "Oct", ParamUnit::Octaves, -2.0, 2.0, 0.0)
        .with_id(ParamId(4), "osc_a_octave")
        .with_group("osc_a"),
    ParamDescriptor::amount("Osc B Waveform", "WaveB", 0.0)
        .with_id(ParamId(5), "osc_b_waveform")
        .with_group("osc_b"),
    ParamDescriptor::stepped("Osc B Tune", "Tune", ParamUnit::None, 0.0, 10.0, 4.0)
        .with_id(ParamId(6), "osc_b_tune")
        .with_group("osc_b"),
    ParamDescriptor::amount("Noise", "Noise", 0.0)
        .with_id(ParamId(7), "noise")
        .with_group("mixer"),
    ParamDescriptor::amount("Osc Mix", "Mix", 0.0)
        .with_id(ParamId(8), "osc_mix")
        .with_group("mixer"),
    ParamDescriptor::new("Filter Cutoff", "Cutoff", ParamUnit::Semitones, 15.0, 135.0, 135.0)
        .with_id(ParamId(9), "filter_cutoff")
        .with_group("filter"),
    ParamDescriptor::new("Filter Resonance", "Res", ParamUnit::Q, 0.5, 8.0, 0.5)
        .with_scale(ParamScale::Logarithmic)
        .with_id(ParamId(10), "filter_resonance")
        .with_group("filter"),
    ParamDescriptor::amount("Filter Env", "FEnv", 0.0)
        .with_id(ParamId(11), "filter_env")
        .with_group("filter"),
    seconds("Attack", "Atk", 0.002, 16.0, 0.002)
        .with_id(ParamId(12), "attack")
        .with_group("amp_env"),
    seconds("Decay", "Dec", 0.005, 8.0, 0.5)
        .with_id(ParamId(13), "decay")
        .with_group("amp_env"),
    ParamDescriptor::amount("Sustain", "Sus", 1.0)
        .with_id(ParamId(14), "sustain")
        .with_group("amp_env"),
    ParamDescriptor::new("High Pass", "HP", ParamUnit::Semitones, 15.0, 135.0, 15.0)
        .with_id(ParamId(15), "high_pass")
        .with_group("output"),
    ParamDescriptor::stepped("Lfo A Type", "Type", ParamUnit::None, 0.0, 4.0, 0.0)
        .with_id(ParamId(16), "lfo_a_type")
        .with_group("lfo_a"),
    ParamDescriptor::amount("Lfo A Destination", "Dest", 0.25)
        .with_id(ParamId(17), "lfo_a_destination")
        .with_group("lfo_a"),
    lfo_rate("Lfo A Rate")
        .with_id(ParamId(18), "lfo_a_rate")
        .with_group("lfo_a"),
    ParamDescriptor::amount("Lfo A Amount", "Amt", 0.0)
        .with_id(ParamId(19), "lfo_a_amount")
        .with_group("lfo_a"),
    ParamDescriptor::stepped("Lfo B Type", "Type", ParamUnit::None, 0.0, 4.0, 0.0)
        .with_id(ParamId(20), "lfo_b_type")
        .with_group("lfo_b"),
    ParamDescriptor::amount("Lfo B Destination", "Dest", 0.75)
        .with_id(ParamId(21), "lfo_b_destination")
        .with_group("lfo_b"),
    lfo_rate("Lfo B Rate")
        .with_id(ParamId(22), "lfo_b_rate")
        .with_group("lfo_b"),
    ParamDescriptor::amount("Lfo B Amount", "Amt", 0.0)
        .with_id(ParamId(23), "lfo_b_amount")
        .with_group("lfo_b"),
    seconds("Release", "Rel", 0.005, 8.0, 0.5)
        .with_id(ParamId(24), "release")
        .with_group("amp_env"),
    seconds("Mod Env Attack", "MAtk", 0.002, 16.0, 0.01)
        .with_id(ParamId(25), "mod_env_attack")
        .with_group("mod_env"),
    seconds("Mod Env Decay", "MDec", 0.005, 8.0, 0.3)
        .with_id(ParamId(26), "mod_env_decay")
        .with_group("mod_env"),
    ParamDescriptor::amount("Mod Env Amount", "MAmt", 0.0)
        .with_id(ParamId(27), "mod_env_amount")
        .with_group("mod_env"),
    ParamDescriptor::amount("Mod Env Destination", "MDest", 0.0)
        .with_id(ParamId(28), "mod_env_destination")
        .with_group("mod_env"),
];

/// Normalized defaults for every parameter, in index order.
pub fn default_values() -> [f32; PARAM_COUNT] {
    core::array::from_fn(|i| PARAMS[i].default_normalized())
}
