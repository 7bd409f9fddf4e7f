//! Property-based tests for polyanalog-core DSP primitives.
//!
//! Filter stability under arbitrary modulation, smoother bounds, and
//! control mapping ranges.

use proptest::prelude::*;
use polyanalog_core::{
    Biquad, LinearSmoothedParam, ParamDescriptor, ParamScale, ParamUnit, SmoothedParam,
    equal_power_mix, mtof, quantize, soft_clip,
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A lowpass whose cutoff jumps every sample stays finite for any
    /// semitone cutoff and Q inside the control range.
    #[test]
    fn modulated_lowpass_stability(
        cutoffs in prop::collection::vec(0.0f32..140.0, 64),
        q in 0.5f32..8.0,
        sample_rate in prop::sample::select(vec![16000.0f32, 44100.0, 48000.0, 96000.0]),
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut biquad = Biquad::new();
        for (i, &st) in cutoffs.iter().enumerate() {
            biquad.set_lowpass(mtof(st), q, sample_rate);
            let out = biquad.process(input[i % input.len()]);
            prop_assert!(out.is_finite(), "cutoff {} st, q {}: {}", st, q, out);
        }
    }

    /// Linear ramps stay between start and goal and land exactly.
    #[test]
    fn linear_ramp_bounded(
        start in -100.0f32..100.0,
        goal in -100.0f32..100.0,
        frames in 1u32..2000,
    ) {
        let mut param = LinearSmoothedParam::new(start);
        param.set_transition_frames(frames);
        param.set_target(goal);
        let (lo, hi) = if start < goal { (start, goal) } else { (goal, start) };
        for _ in 0..frames {
            let v = param.advance();
            prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4, "{} outside [{}, {}]", v, lo, hi);
        }
        prop_assert_eq!(param.get(), goal);
        prop_assert!(param.is_settled());
    }

    /// Exponential smoothing never overshoots.
    #[test]
    fn smoothed_param_no_overshoot(
        start in -10.0f32..10.0,
        goal in -10.0f32..10.0,
        ms in 0.1f32..50.0,
    ) {
        let mut param = SmoothedParam::with_config(start, 48000.0, ms);
        param.set_target(goal);
        let (lo, hi) = if start < goal { (start, goal) } else { (goal, start) };
        for _ in 0..1000 {
            let v = param.advance();
            prop_assert!(v >= lo - 1e-4 && v <= hi + 1e-4);
        }
    }

    /// Quantized indices are always in range.
    #[test]
    fn quantize_in_range(value in -2.0f32..3.0, count in 1usize..32) {
        prop_assert!(quantize(value, count) < count);
    }

    /// Normalize/denormalize agree for continuous curves.
    #[test]
    fn descriptor_round_trip(v in 0.0f32..=1.0, scale in 0usize..3) {
        let scale = match scale {
            0 => ParamScale::Linear,
            1 => ParamScale::Logarithmic,
            _ => ParamScale::Power(3.0),
        };
        let desc = ParamDescriptor::new("P", "P", ParamUnit::None, 0.5, 8.0, 1.0).with_scale(scale);
        let back = desc.normalize(desc.denormalize(v));
        prop_assert!((back - v).abs() < 5e-3, "{:?}: {} -> {}", scale, v, back);
    }

    /// Soft clip is bounded, and the equal-power mix of bounded inputs stays
    /// within the sum of their magnitudes.
    #[test]
    fn shaping_bounded(x in -100.0f32..100.0, a in -1.0f32..=1.0, b in -1.0f32..=1.0, m in -1.0f32..2.0) {
        prop_assert!(soft_clip(x).abs() <= 1.0);
        prop_assert!(equal_power_mix(a, b, m).abs() <= a.abs() + b.abs() + 1e-6);
    }
}
