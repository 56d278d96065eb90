//! Block-streaming WAV reader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader};
use porthost_core::{AudioSource, BoxError};

use crate::wav::{WavSpec, pcm_scale};
use crate::Result;

/// Reads interleaved WAV frames into channel-major render blocks.
pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
    format: SampleFormat,
    frames: u64,
    position: u64,
}

impl WavSource {
    /// Open the file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path)?;
        let hound_spec = reader.spec();
        let frames = reader.len() as u64 / hound_spec.channels.max(1) as u64;
        Ok(Self {
            spec: WavSpec::from(hound_spec),
            format: hound_spec.sample_format,
            frames,
            position: 0,
            reader,
        })
    }

    /// Format of the file.
    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    fn read_frames(&mut self, samples: &mut [f32], stride: usize, frames: usize) -> Result<usize> {
        let channels = self.spec.channels as usize;
        let available = (self.frames - self.position).min(frames as u64) as usize;

        match self.format {
            SampleFormat::Float => {
                let mut iter = self.reader.samples::<f32>();
                for frame in 0..available {
                    for c in 0..channels {
                        if let Some(s) = iter.next() {
                            samples[c * stride + frame] = s?;
                        }
                    }
                }
            }
            SampleFormat::Int => {
                let scale = pcm_scale(self.spec.bits_per_sample);
                let mut iter = self.reader.samples::<i32>();
                for frame in 0..available {
                    for c in 0..channels {
                        if let Some(s) = iter.next() {
                            samples[c * stride + frame] = s? as f32 / scale;
                        }
                    }
                }
            }
        }

        self.position += available as u64;
        Ok(available)
    }
}

impl AudioSource for WavSource {
    fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    fn frames(&self) -> u64 {
        self.frames
    }

    fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    fn read_block(
        &mut self,
        samples: &mut [f32],
        stride: usize,
        frames: usize,
    ) -> std::result::Result<usize, BoxError> {
        Ok(self.read_frames(samples, stride, frames)?)
    }
}
