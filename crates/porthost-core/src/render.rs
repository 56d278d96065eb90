//! Block render loop.
//!
//! A [`RenderSession`] borrows a bound instance together with the port table
//! and channel buffers its regions resolve to, and moves through
//! `Idle → Activated → Running → Deactivated → Closed`.
//!
//! Each tick reads the input block (when the plugin has audio inputs and a
//! source is attached), runs the plugin for exactly one block and writes the
//! output block. File I/O happens strictly before and after `run`, never
//! inside it, and nothing on the tick path allocates unless it is reporting
//! an error.
//!
//! Dropping a session that is still active deactivates the instance, so an
//! early return can never leave a plugin activated.

use std::path::Path;

use crate::buffer::ChannelBuffers;
use crate::error::{HostError, Result};
use crate::io::{AudioSink, AudioSource};
use crate::plugin::{PluginInstance, PortIo};
use crate::port::PortTable;

/// Lifecycle state of a [`RenderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ports bound, not yet activated.
    Idle,
    /// Activated, no block processed yet.
    Activated,
    /// At least one block processed.
    Running,
    /// Deactivated after the last block.
    Deactivated,
    /// Finished; the borrowed resources are released to the owner.
    Closed,
}

/// Counters for a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Blocks written to the sink.
    pub blocks: u64,
    /// Frames written to the sink.
    pub frames: u64,
    /// Invocations of the plugin's `run`.
    pub runs: u64,
}

/// Notified after every block reaches the sink.
pub trait RenderObserver {
    /// `done` of `total` frames have been written.
    fn block_rendered(&mut self, done: u64, total: u64);
}

impl<F: FnMut(u64, u64)> RenderObserver for F {
    fn block_rendered(&mut self, done: u64, total: u64) {
        self(done, total);
    }
}

/// A sink or source together with the path it was opened from.
pub struct Stream<'a, T: ?Sized> {
    /// File path, for diagnostics.
    pub path: &'a Path,
    /// The open stream.
    pub io: &'a mut T,
}

/// An activated plugin instance and the storage its ports are bound to.
pub struct RenderSession<'a> {
    instance: &'a mut dyn PluginInstance,
    ports: &'a mut PortTable,
    buffers: &'a mut ChannelBuffers,
    state: SessionState,
    stats: RenderStats,
}

impl<'a> RenderSession<'a> {
    /// Wrap an instance whose ports have already been bound.
    pub fn new(
        instance: &'a mut dyn PluginInstance,
        ports: &'a mut PortTable,
        buffers: &'a mut ChannelBuffers,
    ) -> Self {
        Self {
            instance,
            ports,
            buffers,
            state: SessionState::Idle,
            stats: RenderStats::default(),
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Activate the instance.
    pub fn activate(&mut self) {
        debug_assert_eq!(self.state, SessionState::Idle, "session activated twice");
        self.instance.activate();
        self.state = SessionState::Activated;
    }

    /// Process one block of `frames` frames.
    pub fn tick(
        &mut self,
        source: Option<&mut Stream<'_, dyn AudioSource>>,
        sink: &mut Stream<'_, dyn AudioSink>,
        frames: usize,
    ) -> Result<()> {
        debug_assert!(
            matches!(self.state, SessionState::Activated | SessionState::Running),
            "tick outside an active session"
        );
        self.state = SessionState::Running;

        let block = self.buffers.block_size();
        let frames = frames.min(block);
        let index = self.stats.blocks;

        if self.buffers.input_channels() > 0 {
            if let Some(source) = source {
                match source.io.read_block(self.buffers.audio_in_mut(), block, frames) {
                    Ok(n) if n == frames => {}
                    Ok(n) => {
                        return Err(HostError::SourceRead {
                            path: source.path.to_path_buf(),
                            block: index,
                            reason: format!("short read, {n} of {frames} frames"),
                        });
                    }
                    Err(e) => {
                        return Err(HostError::SourceRead {
                            path: source.path.to_path_buf(),
                            block: index,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        {
            let mut io = PortIo::new(self.ports.ports_mut(), self.buffers, frames);
            self.instance.run(&mut io);
        }
        self.stats.runs += 1;

        match sink.io.write_block(self.buffers.audio_out(), block, frames) {
            Ok(n) if n == frames => {}
            Ok(n) => {
                return Err(HostError::SinkWrite {
                    path: sink.path.to_path_buf(),
                    block: index,
                    reason: format!("short write, {n} of {frames} frames"),
                });
            }
            Err(e) => {
                return Err(HostError::SinkWrite {
                    path: sink.path.to_path_buf(),
                    block: index,
                    reason: e.to_string(),
                });
            }
        }

        self.stats.blocks += 1;
        self.stats.frames += frames as u64;
        Ok(())
    }

    /// Tick until `total_frames` frames are written or a block fails.
    ///
    /// The last block is shortened when `total_frames` is not a multiple of
    /// the block size.
    pub fn render(
        &mut self,
        mut source: Option<&mut Stream<'_, dyn AudioSource>>,
        sink: &mut Stream<'_, dyn AudioSink>,
        total_frames: u64,
        observer: &mut dyn RenderObserver,
    ) -> Result<RenderStats> {
        let block = self.buffers.block_size() as u64;
        let mut remaining = total_frames.saturating_sub(self.stats.frames);
        while remaining > 0 {
            let frames = remaining.min(block) as usize;
            self.tick(source.as_deref_mut(), sink, frames)?;
            remaining -= frames as u64;
            observer.block_rendered(self.stats.frames, total_frames);
        }
        Ok(self.stats)
    }

    /// Deactivate the instance if it is active. Safe to call repeatedly.
    pub fn deactivate(&mut self) {
        if matches!(self.state, SessionState::Activated | SessionState::Running) {
            self.instance.deactivate();
            self.state = SessionState::Deactivated;
        }
    }

    /// Deactivate if needed and release the borrowed resources.
    pub fn close(mut self) -> RenderStats {
        self.deactivate();
        self.state = SessionState::Closed;
        self.stats
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
