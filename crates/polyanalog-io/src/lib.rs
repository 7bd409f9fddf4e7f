//! WAV output and inspection for polyanalog renders.
//!
//! - **Whole-buffer I/O**: [`write_wav`] and [`read_wav`] on interleaved samples
//! - **Streaming output**: [`WavSink`] takes planar blocks straight from the engine
//! - **Inspection**: [`read_wav_info`] reads the header only
//!
//! ```rust,no_run
//! use polyanalog_io::{WavSink, WavSpec};
//!
//! let spec = WavSpec { channels: 2, ..Default::default() };
//! let mut sink = WavSink::create("out.wav", spec)?;
//! let left = vec![0.0f32; 256];
//! let right = vec![0.0f32; 256];
//! sink.write_planar(&[left.as_slice(), right.as_slice()])?;
//! sink.finalize()?;
//! # Ok::<(), polyanalog_io::Error>(())
//! ```

mod wav;

pub use wav::{
    WavFormat, WavInfo, WavSink, WavSpec, deinterleave, interleave, read_wav, read_wav_info,
    write_wav,
};

/// Error types for WAV I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// A spec the writer cannot produce.
    #[error("Unsupported WAV spec: {0}")]
    UnsupportedSpec(String),

    /// Planar block with the wrong channel count or ragged lengths.
    #[error("Channel layout mismatch: {0}")]
    ChannelMismatch(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for WAV I/O.
pub type Result<T> = std::result::Result<T, Error>;
