//! Integration tests for polyanalog-io WAV output and inspection.

use polyanalog_io::{
    Error, WavFormat, WavSink, WavSpec, deinterleave, read_wav, read_wav_info, write_wav,
};
use tempfile::NamedTempFile;

fn sine_wave(sample_rate: u32, freq_hz: f32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Streaming writes
// ---------------------------------------------------------------------------

#[test]
fn sink_blocks_match_whole_buffer() {
    let sr = 48000;
    let left = sine_wave(sr, 440.0, 1000);
    let right = sine_wave(sr, 220.0, 1000);
    let spec = WavSpec {
        channels: 2,
        sample_rate: sr,
        bits_per_sample: 32,
    };

    let file = NamedTempFile::new().unwrap();
    let mut sink = WavSink::create(file.path(), spec).unwrap();
    for (l, r) in left.chunks(256).zip(right.chunks(256)) {
        sink.write_planar(&[l, r]).unwrap();
    }
    assert_eq!(sink.frames_written(), 1000);
    assert_eq!(sink.finalize().unwrap(), 1000);

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded_spec, spec);
    let planar = deinterleave(&loaded, 2);
    for (a, b) in left.iter().zip(planar[0].iter()) {
        assert!((a - b).abs() < 1e-6, "left mismatch: {a} vs {b}");
    }
    for (a, b) in right.iter().zip(planar[1].iter()) {
        assert!((a - b).abs() < 1e-6, "right mismatch: {a} vs {b}");
    }
}

#[test]
fn wav_roundtrip_24_bit() {
    let samples = sine_wave(44100, 1000.0, 4410);
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 24,
    };

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, spec).unwrap();

    let (loaded, _) = read_wav(file.path()).unwrap();
    assert_eq!(loaded.len(), samples.len());
    for (a, b) in samples.iter().zip(loaded.iter()) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn unsupported_bit_depth_rejected() {
    let file = NamedTempFile::new().unwrap();
    let spec = WavSpec {
        bits_per_sample: 8,
        ..WavSpec::default()
    };
    let err = write_wav(file.path(), &[0.0; 4], spec).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSpec(_)));
    assert!(err.to_string().contains("8-bit"));
}

// ---------------------------------------------------------------------------
// 2. Header inspection
// ---------------------------------------------------------------------------

#[test]
fn info_reports_stereo_float() {
    let spec = WavSpec {
        channels: 2,
        sample_rate: 48000,
        bits_per_sample: 32,
    };
    let samples = vec![0.0f32; 48000 * 2];

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, spec).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.channels, 2);
    assert_eq!(info.num_frames, 48000);
    assert_eq!(info.format, WavFormat::IeeeFloat);
    assert!((info.duration_secs - 1.0).abs() < 1e-9);
}

#[test]
fn info_reports_pcm() {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
    };
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &[0.1; 2205], spec).unwrap();

    let info = read_wav_info(file.path()).unwrap();
    assert_eq!(info.format, WavFormat::Pcm);
    assert_eq!(info.format.name(), "PCM");
    assert_eq!(info.bits_per_sample, 16);
    assert!((info.duration_secs - 0.1).abs() < 1e-9);
}

#[test]
fn info_on_missing_file_is_error() {
    assert!(read_wav_info("/nonexistent/12345.wav").is_err());
}
