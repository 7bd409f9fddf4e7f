//! CLI command implementations.

pub mod info;
pub mod params;
pub mod preset;
pub mod render;

/// Linear gain to decibels, floored at -200 dB.
pub(crate) fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.max(1e-10).log10()
}
