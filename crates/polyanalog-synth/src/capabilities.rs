//! Build-time feature selection for the engine.
//!
//! Hardware variants of the instrument differ in how many LFOs they have,
//! whether the noise mixer is fitted, which modulation destinations are
//! reachable, and whether there is a modulation envelope and a separate
//! release control. All of that is one [`Capabilities`] value handed to
//! [`SynthKernel::new`](crate::SynthKernel::new); disabled features simply
//! contribute nothing.

use crate::mod_router::{DestinationSet, MAX_LFOS};

/// How a Poly note-on treats a voice already playing the same pitch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetriggerPolicy {
    /// Always take a free or stolen voice.
    Disabled,
    /// Retrigger the voice already playing that pitch.
    #[default]
    SamePitch,
}

/// Engine feature set.
///
/// ```rust
/// use polyanalog_synth::{Capabilities, DestinationSet, ModDestination};
///
/// let caps = Capabilities::firmware()
///     .with_lfo_count(1)
///     .with_destinations(DestinationSet::FIRMWARE.with(ModDestination::Amplitude))
///     .with_mod_envelope(true);
///
/// assert_eq!(caps.lfo_count(), 1);
/// assert_eq!(caps.destinations().len(), 3);
/// assert!(caps.noise_mixer());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    lfo_count: usize,
    noise_mixer: bool,
    destinations: DestinationSet,
    mod_envelope: bool,
    separate_release: bool,
    retrigger: RetriggerPolicy,
}

impl Capabilities {
    /// The stock instrument: two LFOs to pitch and filter, noise mixer on,
    /// no modulation envelope, release tied to decay.
    pub const fn firmware() -> Self {
        Self {
            lfo_count: 2,
            noise_mixer: true,
            destinations: DestinationSet::FIRMWARE,
            mod_envelope: false,
            separate_release: false,
            retrigger: RetriggerPolicy::SamePitch,
        }
    }

    /// Every optional feature enabled.
    pub const fn full() -> Self {
        Self {
            lfo_count: MAX_LFOS,
            noise_mixer: true,
            destinations: DestinationSet::ALL,
            mod_envelope: true,
            separate_release: true,
            retrigger: RetriggerPolicy::SamePitch,
        }
    }

    /// Number of LFO units, clamped to 1..=2.
    pub const fn with_lfo_count(mut self, count: usize) -> Self {
        self.lfo_count = if count < 1 {
            1
        } else if count > MAX_LFOS {
            MAX_LFOS
        } else {
            count
        };
        self
    }

    /// Enable or disable the noise mixer.
    pub const fn with_noise_mixer(mut self, enabled: bool) -> Self {
        self.noise_mixer = enabled;
        self
    }

    /// Set the reachable modulation destinations.
    pub const fn with_destinations(mut self, destinations: DestinationSet) -> Self {
        self.destinations = destinations;
        self
    }

    /// Enable or disable the modulation envelope unit.
    pub const fn with_mod_envelope(mut self, enabled: bool) -> Self {
        self.mod_envelope = enabled;
        self
    }

    /// Give release its own control instead of following decay.
    pub const fn with_separate_release(mut self, enabled: bool) -> Self {
        self.separate_release = enabled;
        self
    }

    /// Set the Poly same-pitch retrigger policy.
    pub const fn with_retrigger(mut self, policy: RetriggerPolicy) -> Self {
        self.retrigger = policy;
        self
    }

    /// Number of LFO units.
    pub const fn lfo_count(&self) -> usize {
        self.lfo_count
    }

    /// Noise mixer fitted.
    pub const fn noise_mixer(&self) -> bool {
        self.noise_mixer
    }

    /// Reachable destinations.
    pub const fn destinations(&self) -> DestinationSet {
        self.destinations
    }

    /// Modulation envelope fitted.
    pub const fn mod_envelope(&self) -> bool {
        self.mod_envelope
    }

    /// Release has its own control.
    pub const fn separate_release(&self) -> bool {
        self.separate_release
    }

    /// Poly same-pitch retrigger policy.
    pub const fn retrigger(&self) -> RetriggerPolicy {
        self.retrigger
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::firmware()
    }
}
