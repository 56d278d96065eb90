//! WAV file I/O for porthost.
//!
//! This crate provides:
//!
//! - **WAV helpers**: [`read_wav`], [`write_wav`] and [`read_wav_info`] for
//!   whole-file access to interleaved samples
//! - **Streaming sinks and sources**: [`WavSink`] and [`WavSource`], which
//!   move channel-major blocks to and from disk one render tick at a time
//! - **The file collaborator**: [`WavFiles`], the [`porthost_core::AudioFiles`]
//!   implementation the render command uses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use porthost_core::{Host, HostRequest};
//! use porthost_io::{WavFiles, read_wav_info};
//! use porthost_registry::BuiltinWorld;
//!
//! let mut world = BuiltinWorld::new();
//! let mut files = WavFiles::new();
//! Host::new(&mut world, &mut files).run(&HostRequest::new("urn:porthost:sine", "out.wav"))?;
//!
//! let info = read_wav_info("out.wav")?;
//! println!("{} frames at {} Hz", info.num_frames, info.sample_rate);
//! ```

mod files;
mod sink;
mod source;
mod wav;

pub use files::WavFiles;
pub use sink::WavSink;
pub use source::WavSource;
pub use wav::{WavFormat, WavInfo, WavSpec, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// A file with zero channels was requested.
    #[error("cannot create a WAV file with no channels")]
    NoChannels,

    /// The requested bit depth is not one porthost writes.
    #[error("unsupported bit depth: {0} (expected 16, 24 or 32)")]
    UnsupportedBitDepth(u16),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
