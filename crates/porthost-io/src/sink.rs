//! Block-streaming WAV writer.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use hound::WavWriter;
use porthost_core::{AudioSink, BoxError};

use crate::wav::{WavSpec, pcm_scale, to_pcm};
use crate::Result;

/// Writes channel-major render blocks to a WAV file as interleaved frames.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    spec: WavSpec,
    scale: f32,
    frames_written: u64,
}

impl WavSink {
    /// Create the file at `path`, truncating any existing file.
    pub fn create<P: AsRef<Path>>(path: P, spec: WavSpec) -> Result<Self> {
        spec.validate()?;
        let writer = WavWriter::create(path, hound::WavSpec::from(spec))?;
        Ok(Self {
            writer,
            spec,
            scale: pcm_scale(spec.bits_per_sample),
            frames_written: 0,
        })
    }

    /// The format being written.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn write_frames(&mut self, samples: &[f32], stride: usize, frames: usize) -> Result<usize> {
        let channels = self.spec.channels as usize;
        for frame in 0..frames {
            for c in 0..channels {
                let sample = samples[c * stride + frame];
                if self.spec.bits_per_sample == 32 {
                    self.writer.write_sample(sample)?;
                } else {
                    self.writer.write_sample(to_pcm(sample, self.scale))?;
                }
            }
        }
        self.frames_written += frames as u64;
        Ok(frames)
    }

    /// Flush the header and close the file.
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize()?;
        Ok(())
    }
}

impl AudioSink for WavSink {
    fn write_block(
        &mut self,
        samples: &[f32],
        stride: usize,
        frames: usize,
    ) -> std::result::Result<usize, BoxError> {
        Ok(self.write_frames(samples, stride, frames)?)
    }

    fn close(self: Box<Self>) -> std::result::Result<(), BoxError> {
        tracing::debug!(frames = self.frames_written, "closing WAV sink");
        Ok((*self).finalize()?)
    }
}
