//! Channel buffer allocation.
//!
//! All audio storage for a session is allocated here, once, before the
//! plugin is instantiated. Channel `c` of a direction occupies the contiguous
//! region `[c * block, (c + 1) * block)`, so with a block size of one the
//! buffers hold exactly one interleaved frame.
//!
//! The boxed slices are never resized: bound regions stay valid for the whole
//! session.

/// Audio input and output storage for one session.
#[derive(Debug)]
pub struct ChannelBuffers {
    audio_in: Box<[f32]>,
    audio_out: Box<[f32]>,
    n_in: usize,
    n_out: usize,
    block: usize,
}

impl ChannelBuffers {
    /// Allocate zeroed buffers for `n_in` input and `n_out` output channels
    /// of `block` frames each.
    ///
    /// Each direction gets at least one channel of storage so a plugin
    /// without audio ports in that direction never sees a zero-length
    /// allocation.
    pub fn allocate(n_in: usize, n_out: usize, block: usize) -> Self {
        let block = block.max(1);
        Self {
            audio_in: vec![0.0; n_in.max(1) * block].into_boxed_slice(),
            audio_out: vec![0.0; n_out.max(1) * block].into_boxed_slice(),
            n_in,
            n_out,
            block,
        }
    }

    /// Frames per channel region.
    pub fn block_size(&self) -> usize {
        self.block
    }

    /// Number of audio input channels.
    pub fn input_channels(&self) -> usize {
        self.n_in
    }

    /// Number of audio output channels.
    pub fn output_channels(&self) -> usize {
        self.n_out
    }

    /// Whole input buffer, channel-major with stride [`block_size`](Self::block_size).
    pub fn audio_in(&self) -> &[f32] {
        &self.audio_in
    }

    /// Mutable input buffer, for refilling from a source.
    pub fn audio_in_mut(&mut self) -> &mut [f32] {
        &mut self.audio_in
    }

    /// Whole output buffer, channel-major with stride [`block_size`](Self::block_size).
    pub fn audio_out(&self) -> &[f32] {
        &self.audio_out
    }

    pub(crate) fn input_channel(&self, channel: usize, frames: usize) -> &[f32] {
        if channel >= self.n_in {
            return &[];
        }
        let start = channel * self.block;
        &self.audio_in[start..start + frames]
    }

    pub(crate) fn output_channel_mut(&mut self, channel: usize, frames: usize) -> &mut [f32] {
        if channel >= self.n_out {
            return &mut [];
        }
        let start = channel * self.block;
        &mut self.audio_out[start..start + frames]
    }

    pub(crate) fn split_mut(&mut self) -> ((&[f32], usize), (&mut [f32], usize)) {
        let in_len = self.n_in * self.block;
        let out_len = self.n_out * self.block;
        (
            (&self.audio_in[..in_len], self.block),
            (&mut self.audio_out[..out_len], self.block),
        )
    }

    /// Address of the first sample of each buffer. Used to check that
    /// storage never moves while ports are bound.
    pub fn addresses(&self) -> (*const f32, *const f32) {
        (self.audio_in.as_ptr(), self.audio_out.as_ptr())
    }
}
