//! Script rendering command.

use super::linear_to_db;
use crate::script::{RenderScript, apply_event};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use polyanalog_io::{WavSink, WavSpec};
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Render script (TOML)
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Processing block size
    #[arg(long, default_value = "256")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let script = RenderScript::load(&args.script)?;
    let mut kernel = script.build_kernel()?;
    let total = script.total_frames();
    let channels = usize::from(script.channels);
    let block_size = args.block_size.max(1);

    tracing::info!(
        "rendering {:.2}s at {} Hz, {} channel(s), {} event(s)",
        script.duration,
        script.sample_rate,
        channels,
        script.events.len()
    );

    let spec = WavSpec {
        channels: script.channels,
        sample_rate: script.sample_rate,
        bits_per_sample: args.bit_depth,
    };
    let mut sink = WavSink::create(&args.output, spec)
        .with_context(|| format!("failed to create '{}'", args.output.display()))?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut buffers = vec![vec![0.0f32; block_size]; channels];
    let mut events = script.events.iter().peekable();
    let mut frame = 0u64;
    let mut peak = 0.0f32;

    while frame < total {
        while let Some(event) = events.next_if(|e| script.event_frame(e) <= frame) {
            apply_event(&mut kernel, &event.event)?;
        }

        // Stop the block at the next event so it lands on its exact frame.
        let mut end = (frame + block_size as u64).min(total);
        if let Some(next) = events.peek() {
            end = end.min(script.event_frame(next).max(frame + 1));
        }
        let len = (end - frame) as usize;

        let mut outputs: Vec<&mut [f32]> = buffers.iter_mut().map(|b| &mut b[..len]).collect();
        kernel.process(&mut outputs);
        peak = buffers[0][..len].iter().fold(peak, |m, s| m.max(s.abs()));

        let planar: Vec<&[f32]> = buffers.iter().map(|b| &b[..len]).collect();
        sink.write_planar(&planar)?;

        frame = end;
        pb.set_position(frame);
    }

    let skipped = events.count();
    if skipped > 0 {
        tracing::warn!("{skipped} event(s) after the end of the render were ignored");
    }

    let frames = sink.finalize()?;
    pb.finish_and_clear();

    println!(
        "Wrote {} ({} frames, peak {:.1} dB)",
        args.output.display(),
        frames,
        linear_to_db(peak)
    );

    Ok(())
}
