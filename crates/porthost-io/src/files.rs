//! The WAV-backed file collaborator.

use std::path::Path;

use porthost_core::{AudioFiles, AudioSink, AudioSource, BoxError, SinkFormat};

use crate::wav::WavSpec;
use crate::{Error, WavSink, WavSource};

/// Opens [`WavSink`]s and [`WavSource`]s for the host.
#[derive(Debug, Default)]
pub struct WavFiles;

impl WavFiles {
    /// Create the collaborator.
    pub fn new() -> Self {
        Self
    }
}

impl AudioFiles for WavFiles {
    fn open_sink(&mut self, path: &Path, format: SinkFormat) -> Result<Box<dyn AudioSink>, BoxError> {
        if format.channels == 0 {
            return Err(Error::NoChannels.into());
        }
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
        };
        let sink = WavSink::create(path, spec)?;
        tracing::debug!(
            path = %path.display(),
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits = spec.bits_per_sample,
            frames = format.frames,
            "opened WAV sink"
        );
        Ok(Box::new(sink))
    }

    fn open_source(&mut self, path: &Path) -> Result<Box<dyn AudioSource>, BoxError> {
        let source = WavSource::open(path)?;
        tracing::debug!(
            path = %path.display(),
            channels = source.channels(),
            frames = source.frames(),
            "opened WAV source"
        );
        Ok(Box::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn format(channels: u16) -> SinkFormat {
        SinkFormat {
            sample_rate: 44100,
            channels,
            frames: 10,
            bits_per_sample: 24,
        }
    }

    #[test]
    fn test_zero_channel_sink_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("silent.wav");
        let err = WavFiles::new().open_sink(&path, format(0)).err().unwrap();
        assert!(err.to_string().contains("no channels"));
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_source_is_a_wav_error() {
        let dir = tempdir().unwrap();
        let err = WavFiles::new()
            .open_source(&dir.path().join("nope.wav"))
            .err()
            .unwrap();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Wav(_))));
    }

    #[test]
    fn test_unsupported_bit_depth_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.wav");
        let err = WavFiles::new()
            .open_sink(
                &path,
                SinkFormat {
                    bits_per_sample: 12,
                    ..format(1)
                },
            )
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedBitDepth(12))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_sink_in_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(WavFiles::new().open_sink(&path, format(1)).is_err());
    }
}
