//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and `no_std`.
//!
//! # Pitch
//!
//! - [`mtof`] - Semitone (MIDI note) domain to Hz
//!
//! # Mixing and shaping
//!
//! - [`equal_power_mix`] - Square-root crossfade
//! - [`soft_clip`] - Rational soft saturation
//!
//! # Control mapping
//!
//! - [`quantize`] - Normalized value to a discrete index

use libm::{exp2f, sqrtf};

/// Convert a semitone value (MIDI note number, fractional allowed) to Hz.
///
/// A4 (69) = 440 Hz.
///
/// # Example
/// ```rust
/// use polyanalog_core::mtof;
///
/// assert!((mtof(69.0) - 440.0).abs() < 1e-3);
/// assert!((mtof(81.0) - 880.0).abs() < 1e-2);
/// ```
#[inline]
pub fn mtof(semitones: f32) -> f32 {
    440.0 * exp2f((semitones - 69.0) / 12.0)
}

/// Equal-power ("square-root") crossfade.
///
/// Returns `dry * sqrt(1 - mix) + wet * sqrt(mix)`. Perceived loudness stays
/// roughly constant across the blend for uncorrelated inputs.
///
/// `mix` is clamped to \[0.0, 1.0\]: 0.0 = all dry, 1.0 = all wet.
#[inline]
pub fn equal_power_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    let mix = mix.clamp(0.0, 1.0);
    dry * sqrtf(1.0 - mix) + wet * sqrtf(mix)
}

/// Soft clip with a rational approximation of tanh.
///
/// `x * (27 + x²) / (27 + 9x²)` inside ±3, hard limit at ±1 outside.
/// Continuous at the knee and monotonic over the whole range.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    if x < -3.0 {
        -1.0
    } else if x > 3.0 {
        1.0
    } else {
        let x2 = x * x;
        x * (27.0 + x2) / (27.0 + 9.0 * x2)
    }
}

/// Map a normalized 0..1 control to one of `count` equal bins.
///
/// Values outside \[0, 1\] fall into the first or last bin. Returns 0 when
/// `count` is 0.
///
/// ```rust
/// use polyanalog_core::quantize;
///
/// assert_eq!(quantize(0.0, 3), 0);
/// assert_eq!(quantize(0.5, 3), 1);
/// assert_eq!(quantize(1.0, 3), 2);
/// ```
#[inline]
pub fn quantize(value: f32, count: usize) -> usize {
    if count == 0 || value.is_nan() {
        return 0;
    }
    let scaled = value.clamp(0.0, 1.0) * count as f32;
    (scaled as usize).min(count - 1)
}

/// Flush denormal (subnormal) floats to zero.
///
/// Replaces values below 1e-20 with zero, well before the IEEE 754
/// subnormal range begins. Use in recursive filter state.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
