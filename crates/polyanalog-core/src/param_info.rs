//! Parameter metadata and normalized/physical value mapping.
//!
//! Every control the engine exposes has a [`ParamDescriptor`] that states its
//! display names, unit, physical range, and the curve that maps a
//! normalized `0..1` control onto that range. Continuous controls
//! interpolate along a [`ParamScale`]; parameters flagged
//! [`ParamFlags::STEPPED`] snap to one of their integer positions.
//!
//! Descriptors are `const`-constructible so that a parameter table can live
//! in a `static` with no allocation.
//!
//! # Example
//!
//! ```rust
//! use polyanalog_core::{ParamDescriptor, ParamScale, ParamUnit};
//!
//! const ATTACK: ParamDescriptor =
//!     ParamDescriptor::new("Attack", "Atk", ParamUnit::Seconds, 0.002, 16.0, 0.01)
//!         .with_scale(ParamScale::Power(3.0));
//!
//! assert_eq!(ATTACK.denormalize(0.0), 0.002);
//! assert!((ATTACK.denormalize(1.0) - 16.0).abs() < 1e-4);
//! ```

use crate::math::quantize;

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`
/// - **Power(exp)**: `normalized = ((value - min) / (max - min)).powf(1.0 / exp)`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// Exponential sweep. Requires `min > 0.0`.
    Logarithmic,
    /// Power curve; exponent > 1.0 gives more resolution at the low end.
    Power(f32),
}

/// Stable parameter identifier that survives reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// ```rust
/// use polyanalog_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::NONE.contains(ParamFlags::AUTOMATABLE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Can be automated or mapped to a controller.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Discrete integer positions between `min` and `max`.
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Frequency in Hz.
    Hertz,
    /// Time in seconds.
    Seconds,
    /// Pitch or cutoff in semitones (MIDI note domain).
    Semitones,
    /// Octave offset.
    Octaves,
    /// Filter quality factor.
    Q,
    /// Dimensionless 0..1 amount.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use polyanalog_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Hertz => " Hz",
            ParamUnit::Seconds => " s",
            ParamUnit::Semitones => " st",
            ParamUnit::Octaves => " oct",
            ParamUnit::Q => " Q",
            ParamUnit::None => "",
        }
    }
}

/// Describes a single parameter's metadata for display and mapping.
///
/// `min`, `max` and `default` are physical values. `short_name` is kept to
/// 8 characters or fewer for small hardware displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display.
    pub name: &'static str,
    /// Short name, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the value.
    pub unit: ParamUnit,
    /// Minimum physical value.
    pub min: f32,
    /// Maximum physical value.
    pub max: f32,
    /// Physical value at initialization.
    pub default: f32,
    /// Stable numeric ID.
    pub id: ParamId,
    /// Human-readable stable ID for presets and scripts (e.g. `"filter_cutoff"`).
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Group for listings (e.g. `"filter"`, `"lfo_a"`).
    pub group: &'static str,
}

impl ParamDescriptor {
    /// A continuous, linearly mapped parameter.
    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
        }
    }

    /// A dimensionless 0..1 amount.
    pub const fn amount(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::new(name, short_name, ParamUnit::None, 0.0, 1.0, default)
    }

    /// A discrete parameter with integer positions `min..=max`.
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::new(name, short_name, unit, min, max, default)
            .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
    }

    /// Sets the stable parameter ID and string ID.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the parameter flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the parameter group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// True for discrete parameters.
    #[inline]
    pub const fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Number of discrete positions for a stepped parameter.
    #[inline]
    pub fn step_count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Clamps a value to this parameter's valid range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Converts a physical value to normalized range (0.0 to 1.0).
    ///
    /// ```rust
    /// use polyanalog_core::{ParamDescriptor, ParamUnit};
    ///
    /// let cutoff = ParamDescriptor::new("Cutoff", "Cutoff", ParamUnit::Semitones, 15.0, 135.0, 75.0);
    /// assert_eq!(cutoff.normalize(75.0), 0.5);
    /// ```
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
            ParamScale::Power(exp) => {
                let linear = (value - self.min) / range;
                libm::powf(linear, 1.0 / exp)
            }
        }
    }

    /// Converts a normalized value (0.0 to 1.0) to the physical range.
    ///
    /// Stepped parameters land on one of their integer positions, with the
    /// `0..1` control split into equal bins.
    ///
    /// ```rust
    /// use polyanalog_core::{ParamDescriptor, ParamUnit};
    ///
    /// let octave = ParamDescriptor::stepped("Octave", "Oct", ParamUnit::Octaves, -2.0, 2.0, 0.0);
    /// assert_eq!(octave.denormalize(0.0), -2.0);
    /// assert_eq!(octave.denormalize(0.5), 0.0);
    /// assert_eq!(octave.denormalize(1.0), 2.0);
    /// ```
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        if self.is_stepped() {
            return self.min + quantize(normalized, self.step_count()) as f32;
        }
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::powf(self.max / self.min, normalized)
            }
            ParamScale::Power(exp) => {
                let curved = libm::powf(normalized, exp);
                self.min + curved * (self.max - self.min)
            }
        }
    }

    /// Normalized value of this parameter's default.
    #[inline]
    pub fn default_normalized(&self) -> f32 {
        self.normalize(self.default)
    }
}

/// Trait for processors that expose introspectable parameters.
///
/// Values passed through [`get_param`](Self::get_param) and
/// [`set_param`](Self::set_param) are physical values. Out-of-range
/// indices are ignored.
pub trait ParameterInfo {
    /// Returns the number of parameters.
    fn param_count(&self) -> usize;

    /// Returns the descriptor for the parameter at `index`, or `None`.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Gets the current physical value of the parameter at `index`.
    fn get_param(&self, index: usize) -> f32;

    /// Sets the physical value of the parameter at `index` (clamped).
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a parameter index by name, short name or string id
    /// (case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name)
                    || desc.short_name.eq_ignore_ascii_case(name)
                    || desc.string_id.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Finds a parameter index by its stable [`ParamId`].
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}
