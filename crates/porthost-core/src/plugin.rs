//! Plugin world, introspection and instance contracts.
//!
//! These traits are the boundary between the host core and whatever provides
//! plugins. The core only ever asks the questions an LV2-style host asks:
//! how many ports, what class is port `i`, which properties does it carry,
//! what are its declared ranges, and which index has symbol `s`.
//!
//! ## Bound regions
//!
//! Instead of handing the plugin raw buffer addresses, the host connects each
//! port to a [`PortRegion`]: a handle naming a slot in host-owned storage.
//! During [`PluginInstance::run`] the plugin resolves its regions through a
//! [`PortIo`] view that borrows the storage for exactly one block. The host
//! keeps ownership of every buffer and the borrow checker enforces that no
//! binding outlives the session.

use crate::buffer::ChannelBuffers;
use crate::port::PortDescriptor;

/// Class of a port, mirroring the LV2 core port classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// Data flows from host to plugin.
    Input,
    /// Data flows from plugin to host.
    Output,
    /// A single scalar per block.
    Control,
    /// One sample per frame.
    Audio,
    /// Control-voltage signal (audio-rate control).
    Cv,
    /// Structured event or message buffer.
    Atom,
}

impl PortClass {
    /// Canonical class URI.
    pub const fn uri(self) -> &'static str {
        match self {
            PortClass::Input => "http://lv2plug.in/ns/lv2core#InputPort",
            PortClass::Output => "http://lv2plug.in/ns/lv2core#OutputPort",
            PortClass::Control => "http://lv2plug.in/ns/lv2core#ControlPort",
            PortClass::Audio => "http://lv2plug.in/ns/lv2core#AudioPort",
            PortClass::Cv => "http://lv2plug.in/ns/lv2core#CVPort",
            PortClass::Atom => "http://lv2plug.in/ns/ext/atom#AtomPort",
        }
    }
}

/// Declared property of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortProperty {
    /// The plugin runs correctly with the port left unconnected.
    ConnectionOptional,
    /// Control values are integers.
    Integer,
    /// Control values are boolean (0 or 1).
    Toggled,
}

impl PortProperty {
    /// Canonical property URI.
    pub const fn uri(self) -> &'static str {
        match self {
            PortProperty::ConnectionOptional => "http://lv2plug.in/ns/lv2core#connectionOptional",
            PortProperty::Integer => "http://lv2plug.in/ns/lv2core#integer",
            PortProperty::Toggled => "http://lv2plug.in/ns/lv2core#toggled",
        }
    }
}

/// Declared value range of a port. Undefined bounds are NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
    /// Default value.
    pub default: f32,
}

impl PortRange {
    /// A range with every bound undefined.
    pub const UNDEFINED: Self = Self {
        min: f32::NAN,
        max: f32::NAN,
        default: f32::NAN,
    };

    /// Create a range.
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }
}

/// Introspection of one discovered plugin.
pub trait Plugin {
    /// Plugin URI.
    fn uri(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Number of ports.
    fn port_count(&self) -> u32;

    /// Symbol of the port at `index`.
    fn port_symbol(&self, index: u32) -> Option<&str>;

    /// Declared ranges for all ports, indexed by port index.
    fn port_ranges(&self) -> Vec<PortRange>;

    /// Whether the port at `index` declares `property`.
    fn port_has_property(&self, index: u32, property: PortProperty) -> bool;

    /// Whether the port at `index` is an instance of `class`.
    fn port_is_a(&self, index: u32, class: PortClass) -> bool;

    /// Index of the port with the given symbol.
    fn port_index_of_symbol(&self, symbol: &str) -> Option<u32>;

    /// Create an instance running at `sample_rate`, or `None` if the plugin
    /// refuses.
    fn instantiate(&self, sample_rate: f64) -> Option<Box<dyn PluginInstance>>;
}

/// The plugin registry.
pub trait PluginWorld {
    /// Discover every available plugin. Lookups before this call find nothing.
    fn load_all(&mut self);

    /// Look up a plugin by URI.
    fn plugin_by_uri(&self, uri: &str) -> Option<&dyn Plugin>;

    /// All discovered plugins, in registry order.
    fn plugins(&self) -> Vec<&dyn Plugin>;
}

/// A running plugin instance.
///
/// Dropping the instance frees it. Hosts must deactivate before dropping an
/// activated instance.
pub trait PluginInstance {
    /// Connect the port at `index` to a host-owned region.
    fn connect_port(&mut self, index: u32, region: PortRegion);

    /// Prepare for processing. Called once after all ports are connected.
    fn activate(&mut self) {}

    /// Process one block of `io.frames()` frames.
    ///
    /// Must not allocate, block, or perform I/O.
    fn run(&mut self, io: &mut PortIo<'_>);

    /// Stop processing. Called once after the last block.
    fn deactivate(&mut self) {}
}

/// Host-owned storage a port is connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortRegion {
    /// The control value slot of the port at this index.
    Control(u32),
    /// Audio input channel.
    AudioIn(usize),
    /// Audio output channel.
    AudioOut(usize),
    /// Connected to nothing.
    #[default]
    Unbound,
}

/// One block's view of the host storage a plugin's regions resolve to.
///
/// Built by the render loop for every tick from buffers allocated before
/// activation; constructing it never allocates.
pub struct PortIo<'a> {
    ports: &'a mut [PortDescriptor],
    buffers: &'a mut ChannelBuffers,
    frames: usize,
}

impl<'a> PortIo<'a> {
    pub(crate) fn new(
        ports: &'a mut [PortDescriptor],
        buffers: &'a mut ChannelBuffers,
        frames: usize,
    ) -> Self {
        debug_assert!(frames <= buffers.block_size());
        Self {
            ports,
            buffers,
            frames,
        }
    }

    /// Frames in this block.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Value of a control region, or 0.0 for any other region.
    pub fn control(&self, region: PortRegion) -> f32 {
        match region {
            PortRegion::Control(index) => self
                .ports
                .get(index as usize)
                .map_or(0.0, |port| port.value),
            _ => 0.0,
        }
    }

    /// Store a value into a control region. Other regions are ignored.
    pub fn set_control(&mut self, region: PortRegion, value: f32) {
        if let PortRegion::Control(index) = region {
            if let Some(port) = self.ports.get_mut(index as usize) {
                port.value = value;
            }
        }
    }

    /// Samples of an audio input region; empty for any other region.
    pub fn input(&self, region: PortRegion) -> &[f32] {
        match region {
            PortRegion::AudioIn(channel) => self.buffers.input_channel(channel, self.frames),
            _ => &[],
        }
    }

    /// Samples of an audio output region; empty for any other region.
    pub fn output(&mut self, region: PortRegion) -> &mut [f32] {
        match region {
            PortRegion::AudioOut(channel) => self.buffers.output_channel_mut(channel, self.frames),
            _ => &mut [],
        }
    }

    /// Input and output slices at once, for in-place style processors.
    pub fn input_output(&mut self, input: PortRegion, output: PortRegion) -> (&[f32], &mut [f32]) {
        let frames = self.frames;
        let (audio_in, audio_out) = self.buffers.split_mut();
        let src: &[f32] = match input {
            PortRegion::AudioIn(channel) => channel_slice(audio_in, channel, frames),
            _ => &[],
        };
        let dst: &mut [f32] = match output {
            PortRegion::AudioOut(channel) => channel_slice_mut(audio_out, channel, frames),
            _ => &mut [],
        };
        (src, dst)
    }
}

fn channel_slice(data: (&[f32], usize), channel: usize, frames: usize) -> &[f32] {
    let (samples, block) = data;
    samples
        .get(channel * block..channel * block + frames)
        .unwrap_or(&[])
}

fn channel_slice_mut(data: (&mut [f32], usize), channel: usize, frames: usize) -> &mut [f32] {
    let (samples, block) = data;
    samples
        .get_mut(channel * block..channel * block + frames)
        .unwrap_or(&mut [])
}

/// Whether `uri` is a well-formed absolute URI (`scheme:rest`).
pub fn is_valid_uri(uri: &str) -> bool {
    let Some((scheme, rest)) = uri.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok
        && !rest.is_empty()
        && !uri
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"'))
}
