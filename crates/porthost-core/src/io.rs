//! Audio file collaborators.
//!
//! Blocks cross this boundary in the same channel-major layout the channel
//! buffers use: channel `c` of a block is `samples[c * stride..c * stride + frames]`.

use std::path::Path;

use crate::error::BoxError;

/// Format of the file a render writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count, one per audio output port.
    pub channels: u16,
    /// Total frames the render will write.
    pub frames: u64,
    /// PCM bit depth (16 or 24), or 32 for IEEE float.
    pub bits_per_sample: u16,
}

/// Destination for rendered blocks.
pub trait AudioSink {
    /// Write `frames` frames. Returns how many frames were written.
    fn write_block(&mut self, samples: &[f32], stride: usize, frames: usize)
    -> Result<usize, BoxError>;

    /// Flush and close the file.
    fn close(self: Box<Self>) -> Result<(), BoxError>;
}

/// Origin of audio input blocks.
pub trait AudioSource {
    /// Channel count.
    fn channels(&self) -> usize;

    /// Total frames available.
    fn frames(&self) -> u64;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Read up to `frames` frames. Returns how many frames were read.
    fn read_block(
        &mut self,
        samples: &mut [f32],
        stride: usize,
        frames: usize,
    ) -> Result<usize, BoxError>;
}

/// Opens sinks and sources by path.
pub trait AudioFiles {
    /// Create the output file.
    fn open_sink(&mut self, path: &Path, format: SinkFormat) -> Result<Box<dyn AudioSink>, BoxError>;

    /// Open an input file.
    fn open_source(&mut self, path: &Path) -> Result<Box<dyn AudioSource>, BoxError>;
}

/// Sink that keeps rendered audio in memory as interleaved frames.
#[derive(Debug, Default)]
pub struct MemorySink {
    channels: usize,
    samples: Vec<f32>,
}

impl MemorySink {
    /// Create a sink for `channels` channels with room for `frames` frames.
    pub fn with_capacity(channels: usize, frames: usize) -> Self {
        Self {
            channels,
            samples: Vec::with_capacity(channels * frames),
        }
    }

    /// Channel count.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Frames written so far.
    pub fn frames(&self) -> usize {
        self.samples.len().checked_div(self.channels).unwrap_or(0)
    }

    /// Interleaved samples written so far.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Samples of one channel.
    pub fn channel(&self, channel: usize) -> Vec<f32> {
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.channels.max(1))
            .copied()
            .collect()
    }
}

impl AudioSink for MemorySink {
    fn write_block(
        &mut self,
        samples: &[f32],
        stride: usize,
        frames: usize,
    ) -> Result<usize, BoxError> {
        for frame in 0..frames {
            for c in 0..self.channels {
                self.samples.push(samples[c * stride + frame]);
            }
        }
        Ok(frames)
    }

    fn close(self: Box<Self>) -> Result<(), BoxError> {
        Ok(())
    }
}
