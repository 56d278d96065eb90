//! Lifecycle controller.
//!
//! [`Host::run`] drives one render from plugin lookup to file close:
//!
//! 1. load the world, validate and resolve the plugin URI
//! 2. classify ports, apply control overrides
//! 3. open the input (if any) and the output file
//! 4. allocate channel buffers, instantiate, bind ports
//! 5. activate, render every block, deactivate
//! 6. release everything in reverse acquisition order
//!
//! Stages live on [`Session`], which holds every resource as "not yet
//! acquired" until its stage succeeds. [`Session::cleanup`] releases only
//! what was acquired and can be called any number of times, so every failure
//! path goes through the same teardown.

use std::path::PathBuf;

use crate::binder::BindingMap;
use crate::buffer::ChannelBuffers;
use crate::error::{HostError, Result};
use crate::io::{AudioFiles, AudioSink, AudioSource, SinkFormat};
use crate::plugin::{Plugin, PluginInstance, PluginWorld, is_valid_uri};
use crate::port::{ParamOverride, PortTable, UnsupportedPortPolicy};
use crate::render::{RenderObserver, RenderSession, RenderStats, Stream};

/// Sample rate used when none is configured.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Render length used when none is configured and there is no input file.
pub const DEFAULT_RENDER_SECS: f64 = 4.0;

/// PCM bit depth used when none is configured.
pub const DEFAULT_BITS_PER_SAMPLE: u16 = 24;

/// How long to render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderLength {
    /// Exact frame count.
    Frames(u64),
    /// Seconds at the render sample rate.
    Seconds(f64),
    /// Length of the input file, or [`DEFAULT_RENDER_SECS`] without one.
    MatchInput,
}

/// Everything a render needs from the caller.
#[derive(Debug, Clone)]
pub struct HostRequest {
    /// URI of the plugin to host.
    pub plugin_uri: String,
    /// Control overrides, applied in order.
    pub overrides: Vec<ParamOverride>,
    /// Output file path.
    pub output: PathBuf,
    /// Optional input file feeding the audio inputs.
    pub input: Option<PathBuf>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Render length.
    pub length: RenderLength,
    /// Frames per `run` call.
    pub block_size: usize,
    /// Output bit depth.
    pub bits_per_sample: u16,
    /// Handling of non-optional ports that are neither control nor audio.
    pub unsupported_ports: UnsupportedPortPolicy,
}

impl HostRequest {
    /// A request with default rate, length, block size and bit depth.
    pub fn new(plugin_uri: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            plugin_uri: plugin_uri.into(),
            overrides: Vec::new(),
            output: output.into(),
            input: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            length: RenderLength::MatchInput,
            block_size: 1,
            bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            unsupported_ports: UnsupportedPortPolicy::Skip,
        }
    }

    /// Add a control override.
    pub fn with_override(mut self, symbol: impl Into<String>, value: f32) -> Self {
        self.overrides.push(ParamOverride::new(symbol, value));
        self
    }

    /// Feed audio inputs from a file.
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Set the render length.
    pub fn with_length(mut self, length: RenderLength) -> Self {
        self.length = length;
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Set the output bit depth.
    pub fn with_bits_per_sample(mut self, bits: u16) -> Self {
        self.bits_per_sample = bits;
        self
    }

    /// Set the unsupported port policy.
    pub fn with_unsupported_ports(mut self, policy: UnsupportedPortPolicy) -> Self {
        self.unsupported_ports = policy;
        self
    }
}

/// Outcome of a successful render.
#[derive(Debug)]
pub struct RenderReport {
    /// URI of the hosted plugin.
    pub plugin_uri: String,
    /// Output file path.
    pub output: PathBuf,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channels in the output file.
    pub channels: usize,
    /// Block and frame counters.
    pub stats: RenderStats,
    /// Failure to finalize the output file, reported without failing the render.
    pub close_error: Option<HostError>,
}

/// Hosts one plugin from a world, rendering through an [`AudioFiles`] codec.
pub struct Host<'h> {
    world: &'h mut dyn PluginWorld,
    files: &'h mut dyn AudioFiles,
}

impl<'h> Host<'h> {
    /// Create a host over a world and a file codec.
    pub fn new(world: &'h mut dyn PluginWorld, files: &'h mut dyn AudioFiles) -> Self {
        Self { world, files }
    }

    /// Run one render.
    pub fn run(&mut self, request: &HostRequest) -> Result<RenderReport> {
        self.run_with(request, &mut |_: u64, _: u64| {})
    }

    /// Run one render, reporting progress after every block.
    pub fn run_with(
        &mut self,
        request: &HostRequest,
        observer: &mut dyn RenderObserver,
    ) -> Result<RenderReport> {
        self.world.load_all();

        let uri = request.plugin_uri.as_str();
        if !is_valid_uri(uri) {
            return Err(fail(HostError::InvalidIdentifier { uri: uri.to_owned() }));
        }
        let Some(plugin) = self.world.plugin_by_uri(uri) else {
            return Err(fail(HostError::NotFound { uri: uri.to_owned() }));
        };
        tracing::info!(uri, name = plugin.name(), "plugin resolved");

        let mut session = Session::new(plugin, request);
        let outcome = session.execute(self.files, observer);
        let close_error = session.cleanup();

        match outcome {
            Ok(stats) => {
                if let Some(err) = &close_error {
                    tracing::debug!(stage = %err.stage(), "{err}");
                }
                Ok(RenderReport {
                    plugin_uri: uri.to_owned(),
                    output: request.output.clone(),
                    sample_rate: request.sample_rate,
                    channels: session.channels,
                    stats,
                    close_error,
                })
            }
            Err(err) => {
                if let Some(close) = close_error {
                    tracing::warn!(stage = %close.stage(), "{close}");
                }
                Err(fail(err))
            }
        }
    }
}

/// Callers report the returned error themselves; it is only traced here.
fn fail(err: HostError) -> HostError {
    tracing::debug!(stage = %err.stage(), code = err.exit_code(), "{err}");
    err
}

/// Resources of one render, each held only once its stage has succeeded.
pub struct Session<'p> {
    plugin: &'p dyn Plugin,
    request: &'p HostRequest,
    ports: Option<PortTable>,
    source: Option<Box<dyn AudioSource>>,
    sink: Option<Box<dyn AudioSink>>,
    buffers: Option<ChannelBuffers>,
    instance: Option<Box<dyn PluginInstance>>,
    bindings: Option<BindingMap>,
    total_frames: u64,
    channels: usize,
}

impl<'p> Session<'p> {
    /// Start a session for a resolved plugin.
    pub fn new(plugin: &'p dyn Plugin, request: &'p HostRequest) -> Self {
        Self {
            plugin,
            request,
            ports: None,
            source: None,
            sink: None,
            buffers: None,
            instance: None,
            bindings: None,
            total_frames: 0,
            channels: 0,
        }
    }

    /// Run every stage after plugin resolution, stopping at the first failure.
    pub fn execute(
        &mut self,
        files: &mut dyn AudioFiles,
        observer: &mut dyn RenderObserver,
    ) -> Result<RenderStats> {
        self.classify()?;
        self.apply_overrides()?;
        self.open_source(files)?;
        self.open_sink(files)?;
        self.allocate();
        self.instantiate()?;
        self.bind();
        self.render(observer)
    }

    /// Build the port descriptor table.
    pub fn classify(&mut self) -> Result<()> {
        let table = PortTable::classify(self.plugin, self.request.unsupported_ports)?;
        tracing::info!(
            ports = table.len(),
            audio_in = table.n_audio_in(),
            audio_out = table.n_audio_out(),
            "ports classified"
        );
        self.channels = table.n_audio_out();
        self.ports = Some(table);
        Ok(())
    }

    /// Apply the request's control overrides.
    pub fn apply_overrides(&mut self) -> Result<()> {
        let Some(table) = self.ports.as_mut() else {
            unreachable!("overrides applied before classification");
        };
        table.apply_overrides(self.plugin, &self.request.overrides)
    }

    /// Open the input file, if one was requested, and fix the render length.
    pub fn open_source(&mut self, files: &mut dyn AudioFiles) -> Result<()> {
        let Some(table) = self.ports.as_ref() else {
            unreachable!("input opened before classification");
        };
        let sample_rate = self.request.sample_rate;

        if let Some(path) = &self.request.input {
            let source = files.open_source(path).map_err(|e| HostError::SourceOpen {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if source.channels() != table.n_audio_in() {
                return Err(HostError::SourceChannelMismatch {
                    path: path.clone(),
                    expected: table.n_audio_in(),
                    found: source.channels(),
                });
            }
            if source.sample_rate() != sample_rate {
                tracing::warn!(
                    path = %path.display(),
                    file_rate = source.sample_rate(),
                    sample_rate,
                    "input sample rate differs from render rate, not resampling"
                );
            }
            tracing::info!(path = %path.display(), frames = source.frames(), "input opened");
            self.source = Some(source);
        }

        self.total_frames = match self.request.length {
            RenderLength::Frames(frames) => frames,
            RenderLength::Seconds(secs) => (secs * f64::from(sample_rate)).round() as u64,
            RenderLength::MatchInput => match &self.source {
                Some(source) => source.frames(),
                None => (DEFAULT_RENDER_SECS * f64::from(sample_rate)).round() as u64,
            },
        };
        Ok(())
    }

    /// Create the output file.
    pub fn open_sink(&mut self, files: &mut dyn AudioFiles) -> Result<()> {
        let Some(table) = self.ports.as_ref() else {
            unreachable!("output opened before classification");
        };
        let path = &self.request.output;
        let channels = u16::try_from(table.n_audio_out()).map_err(|_| HostError::SinkOpen {
            path: path.clone(),
            reason: format!("{} audio outputs exceed the WAV channel limit", table.n_audio_out()),
        })?;
        let format = SinkFormat {
            sample_rate: self.request.sample_rate,
            channels,
            frames: self.total_frames,
            bits_per_sample: self.request.bits_per_sample,
        };
        let sink = files
            .open_sink(path, format)
            .map_err(|e| HostError::SinkOpen {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        tracing::info!(path = %path.display(), channels = format.channels, frames = format.frames, "output opened");
        self.sink = Some(sink);
        Ok(())
    }

    /// Allocate channel buffers sized from the port table.
    pub fn allocate(&mut self) {
        let Some(table) = self.ports.as_ref() else {
            unreachable!("buffers allocated before classification");
        };
        self.buffers = Some(ChannelBuffers::allocate(
            table.n_audio_in(),
            table.n_audio_out(),
            self.request.block_size,
        ));
    }

    /// Create the plugin instance.
    pub fn instantiate(&mut self) -> Result<()> {
        let instance = self
            .plugin
            .instantiate(f64::from(self.request.sample_rate))
            .ok_or_else(|| HostError::InstantiationFailure {
                uri: self.plugin.uri().to_owned(),
            })?;
        self.instance = Some(instance);
        Ok(())
    }

    /// Connect every port of the instance.
    pub fn bind(&mut self) {
        let (Some(table), Some(instance)) = (self.ports.as_ref(), self.instance.as_deref_mut())
        else {
            unreachable!("ports bound before instantiation");
        };
        self.bindings = Some(BindingMap::bind(table, instance));
    }

    /// Activate, render every block, deactivate.
    ///
    /// Deactivation happens whether or not a block failed.
    pub fn render(&mut self, observer: &mut dyn RenderObserver) -> Result<RenderStats> {
        let (Some(instance), Some(ports), Some(buffers), Some(sink)) = (
            self.instance.as_deref_mut(),
            self.ports.as_mut(),
            self.buffers.as_mut(),
            self.sink.as_deref_mut(),
        ) else {
            unreachable!("render before binding");
        };

        let mut sink = Stream {
            path: &self.request.output,
            io: sink,
        };
        let mut source = match (self.source.as_deref_mut(), self.request.input.as_deref()) {
            (Some(io), Some(path)) => Some(Stream { path, io }),
            _ => None,
        };

        let mut session = RenderSession::new(instance, ports, buffers);
        session.activate();
        tracing::info!(frames = self.total_frames, block_size = self.request.block_size, "render started");
        let result = session.render(source.as_mut(), &mut sink, self.total_frames, observer);
        let stats = session.close();
        tracing::info!(blocks = stats.blocks, frames = stats.frames, "instance deactivated");
        result
    }

    /// Port table, once classified.
    pub fn ports(&self) -> Option<&PortTable> {
        self.ports.as_ref()
    }

    /// Port bindings, once bound.
    pub fn bindings(&self) -> Option<&BindingMap> {
        self.bindings.as_ref()
    }

    /// Release everything acquired so far, newest first.
    ///
    /// Returns the error from closing the output file, if any. Calling this
    /// again after it has run does nothing.
    pub fn cleanup(&mut self) -> Option<HostError> {
        self.bindings = None;
        if self.instance.take().is_some() {
            tracing::debug!("instance freed");
        }
        self.buffers = None;
        let close_error = self.sink.take().and_then(|sink| {
            sink.close().err().map(|e| HostError::SinkClose {
                path: self.request.output.clone(),
                reason: e.to_string(),
            })
        });
        self.source = None;
        self.ports = None;
        close_error
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(err) = self.cleanup() {
            tracing::error!(stage = %err.stage(), "{err}");
        }
    }
}
