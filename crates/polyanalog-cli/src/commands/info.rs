//! WAV inspection for rendered files.

use super::linear_to_db;
use anyhow::Context;
use clap::Args;
use polyanalog_io::{deinterleave, read_wav, read_wav_info};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// WAV file to inspect
    file: PathBuf,

    /// Header only; skip the level scan
    #[arg(long)]
    header: bool,
}

pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let info = read_wav_info(&args.file)
        .with_context(|| format!("failed to open '{}'", args.file.display()))?;
    let size = std::fs::metadata(&args.file)?.len();

    println!("File:        {}", args.file.display());
    println!("Format:      {} {}-bit", info.format.name(), info.bits_per_sample);
    println!("Channels:    {}", info.channels);
    println!("Sample Rate: {} Hz", info.sample_rate);
    println!("Duration:    {:.3}s ({} frames)", info.duration_secs, info.num_frames);
    println!("Size:        {:.1} KB", size as f64 / 1024.0);

    if args.header {
        return Ok(());
    }

    let (samples, spec) = read_wav(&args.file)?;
    println!();
    for (ch, channel) in deinterleave(&samples, usize::from(spec.channels)).iter().enumerate() {
        let (peak, rms) = levels(channel);
        println!(
            "  ch{ch}: peak {:6.1} dB  rms {:6.1} dB",
            linear_to_db(peak),
            linear_to_db(rms)
        );
    }

    Ok(())
}

fn levels(samples: &[f32]) -> (f32, f32) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let sum: f64 = samples.iter().map(|s| f64::from(*s) * f64::from(*s)).sum();
    (peak, (sum / samples.len() as f64).sqrt() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_of_square() {
        let (peak, rms) = levels(&[0.5, -0.5, 0.5, -0.5]);
        assert!((peak - 0.5).abs() < 1e-6);
        assert!((rms - 0.5).abs() < 1e-6);
        assert_eq!(levels(&[]), (0.0, 0.0));
    }

    #[test]
    fn test_db_floor() {
        assert!((linear_to_db(1.0)).abs() < 1e-6);
        assert!(linear_to_db(0.0) <= -199.0);
    }
}
