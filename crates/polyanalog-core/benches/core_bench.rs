//! Criterion benchmarks for polyanalog-core DSP primitives
//!
//! Run with: cargo bench -p polyanalog-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use polyanalog_core::{Biquad, Lfo, LfoWaveform, OnePole, mtof, soft_clip};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_modulated_lowpass(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        group.bench_with_input(
            BenchmarkId::new("set_lowpass_per_sample", block_size),
            &block_size,
            |b, _| {
                let mut biquad = Biquad::new();
                b.iter(|| {
                    for (i, &sample) in input.iter().enumerate() {
                        let st = 60.0 + (i % 48) as f32;
                        biquad.set_lowpass(mtof(st), 2.0, SAMPLE_RATE);
                        black_box(biquad.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("Lfo");

    for waveform in LfoWaveform::ALL {
        group.bench_function(waveform.name(), |b| {
            let mut lfo = Lfo::new(SAMPLE_RATE, 5.0);
            lfo.set_waveform(waveform);
            let mut block = [0.0f32; 256];
            b.iter(|| {
                lfo.fill(black_box(&mut block));
            });
        });
    }

    group.finish();
}

fn bench_output_stage(c: &mut Criterion) {
    let input = generate_test_signal(256);
    c.bench_function("highpass_soft_clip_256", |b| {
        let mut hp = OnePole::new(SAMPLE_RATE, 10.0);
        b.iter(|| {
            for &sample in &input {
                black_box(soft_clip(hp.process_highpass(black_box(sample)) * 0.333));
            }
        });
    });
}

criterion_group!(benches, bench_modulated_lowpass, bench_lfo, bench_output_stage);
criterion_main!(benches);
