//! WAV file reading and writing.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// WAV audio encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavFormat {
    /// Linear PCM (integer samples).
    Pcm,
    /// IEEE 754 floating-point samples.
    IeeeFloat,
}

impl WavFormat {
    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            WavFormat::Pcm => "PCM",
            WavFormat::IeeeFloat => "IEEE float",
        }
    }
}

/// WAV file metadata extracted without loading sample data.
#[derive(Debug, Clone)]
pub struct WavInfo {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample.
    pub bits_per_sample: u16,
    /// Total number of sample frames (samples per channel).
    pub num_frames: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Audio encoding format.
    pub format: WavFormat,
}

/// Read WAV metadata without loading sample data.
pub fn read_wav_info<P: AsRef<Path>>(path: P) -> Result<WavInfo> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let total_samples = u64::from(reader.len());
    let num_frames = total_samples / u64::from(spec.channels.max(1));
    let duration_secs = num_frames as f64 / f64::from(spec.sample_rate);

    let format = match spec.sample_format {
        SampleFormat::Float => WavFormat::IeeeFloat,
        SampleFormat::Int => WavFormat::Pcm,
    };

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        num_frames,
        duration_secs,
        format,
    })
}

/// WAV file specification.
///
/// 32-bit files are written as float, 16 and 24-bit as integer PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample: 16, 24 or 32.
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
        }
    }
}

impl WavSpec {
    /// Reject specs the writer cannot produce.
    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::UnsupportedSpec("zero channels".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(Error::UnsupportedSpec("zero sample rate".to_string()));
        }
        if !matches!(self.bits_per_sample, 16 | 24 | 32) {
            return Err(Error::UnsupportedSpec(format!(
                "{}-bit samples",
                self.bits_per_sample
            )));
        }
        Ok(())
    }
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

fn int_scale(bits: u16) -> f32 {
    (1i32 << (bits - 1)) as f32
}

/// Read a WAV file as interleaved f32 samples along with its spec.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = int_scale(spec.bits_per_sample);
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok((samples, spec))
}

/// Write interleaved samples to a WAV file.
///
/// A trailing partial frame is dropped.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let mut sink = WavSink::create(path, spec)?;
    sink.write_interleaved(samples)?;
    sink.finalize()?;
    Ok(())
}

/// Interleave planar channels. Output length follows the shortest channel.
pub fn interleave(channels: &[&[f32]]) -> Vec<f32> {
    let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        out.extend(channels.iter().map(|c| c[i]));
    }
    out
}

/// Split interleaved samples into `channels` planar buffers.
pub fn deinterleave(samples: &[f32], channels: usize) -> Vec<Vec<f32>> {
    if channels == 0 {
        return Vec::new();
    }
    let frames = samples.len() / channels;
    (0..channels)
        .map(|ch| {
            samples
                .chunks_exact(channels)
                .take(frames)
                .map(|frame| frame[ch])
                .collect()
        })
        .collect()
}

/// Streaming WAV writer fed block by block.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    spec: WavSpec,
    frames: u64,
}

impl WavSink {
    /// Create the file and write the header.
    pub fn create<P: AsRef<Path>>(path: P, spec: WavSpec) -> Result<Self> {
        spec.validate()?;
        let writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
        Ok(Self {
            writer,
            spec,
            frames: 0,
        })
    }

    /// Output spec.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Append one block of planar channels.
    ///
    /// The number of slices must equal the spec's channel count and all
    /// slices must have the same length.
    pub fn write_planar(&mut self, channels: &[&[f32]]) -> Result<()> {
        if channels.len() != usize::from(self.spec.channels) {
            return Err(Error::ChannelMismatch(format!(
                "expected {} channels, got {}",
                self.spec.channels,
                channels.len()
            )));
        }
        let frames = channels.first().map_or(0, |c| c.len());
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::ChannelMismatch("ragged channel lengths".to_string()));
        }
        for i in 0..frames {
            for channel in channels {
                self.write_sample(channel[i])?;
            }
        }
        self.frames += frames as u64;
        Ok(())
    }

    /// Append interleaved samples. A trailing partial frame is dropped.
    pub fn write_interleaved(&mut self, samples: &[f32]) -> Result<()> {
        let channels = usize::from(self.spec.channels);
        for frame in samples.chunks_exact(channels) {
            for &sample in frame {
                self.write_sample(sample)?;
            }
            self.frames += 1;
        }
        Ok(())
    }

    fn write_sample(&mut self, sample: f32) -> Result<()> {
        if self.spec.bits_per_sample == 32 {
            self.writer.write_sample(sample)?;
        } else {
            let max_val = int_scale(self.spec.bits_per_sample);
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            self.writer.write_sample(int_sample)?;
        }
        Ok(())
    }

    /// Patch the header and close the file. Returns the frame count.
    pub fn finalize(self) -> Result<u64> {
        self.writer.finalize()?;
        tracing::debug!("wrote {} frames", self.frames);
        Ok(self.frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_roundtrip_f32() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0).sin()).collect();
        let spec = WavSpec::default();

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, spec).unwrap();

        let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
        assert_eq!(loaded_spec, spec);
        assert_eq!(loaded.len(), samples.len());
        for (a, b) in samples.iter().zip(loaded.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_roundtrip_i16_clamps() {
        let samples = vec![0.5f32, -0.5, 1.5, -1.5];
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };

        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, spec).unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert!((loaded[0] - 0.5).abs() < 0.001);
        assert!((loaded[2] - 1.0).abs() < 0.001, "clamped high: {}", loaded[2]);
        assert!((loaded[3] + 1.0).abs() < 1e-6, "clamped low: {}", loaded[3]);
    }

    #[test]
    fn test_interleave_deinterleave() {
        let left = [1.0f32, 3.0, 5.0];
        let right = [2.0f32, 4.0];
        let inter = interleave(&[&left[..], &right[..]]);
        assert_eq!(inter, vec![1.0, 2.0, 3.0, 4.0]);

        let planar = deinterleave(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(planar, vec![vec![1.0, 3.0], vec![2.0, 4.0]]);
        assert!(deinterleave(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_spec_validation() {
        assert!(WavSpec::default().validate().is_ok());
        let bad = WavSpec {
            bits_per_sample: 12,
            ..WavSpec::default()
        };
        assert!(matches!(bad.validate(), Err(Error::UnsupportedSpec(_))));
        let mono_zero = WavSpec {
            channels: 0,
            ..WavSpec::default()
        };
        assert!(mono_zero.validate().is_err());
    }

    #[test]
    fn test_sink_rejects_wrong_layout() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            ..WavSpec::default()
        };
        let mut sink = WavSink::create(file.path(), spec).unwrap();
        let a = [0.0f32; 4];
        let b = [0.0f32; 3];
        assert!(matches!(
            sink.write_planar(&[&a[..]]),
            Err(Error::ChannelMismatch(_))
        ));
        assert!(sink.write_planar(&[&a[..], &b[..]]).is_err());
        sink.write_planar(&[&a[..], &a[..]]).unwrap();
        assert_eq!(sink.finalize().unwrap(), 4);
    }
}
