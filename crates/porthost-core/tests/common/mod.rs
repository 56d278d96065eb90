//! Scripted plugin world and file codec shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use porthost_core::{
    AudioFiles, AudioSink, AudioSource, BoxError, Plugin, PluginInstance, PluginWorld, PortClass,
    PortIo, PortProperty, PortRange, PortRegion, SinkFormat,
};

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

/// Declared facts about one mock port.
#[derive(Debug, Clone)]
pub struct PortSpec {
    pub symbol: &'static str,
    pub classes: Vec<PortClass>,
    pub optional: bool,
    pub default: f32,
}

impl PortSpec {
    pub fn new(symbol: &'static str, classes: &[PortClass]) -> Self {
        Self {
            symbol,
            classes: classes.to_vec(),
            optional: false,
            default: f32::NAN,
        }
    }

    pub fn control_in(symbol: &'static str, default: f32) -> Self {
        Self::new(symbol, &[PortClass::Input, PortClass::Control]).with_default(default)
    }

    pub fn control_out(symbol: &'static str) -> Self {
        Self::new(symbol, &[PortClass::Output, PortClass::Control])
    }

    pub fn audio_in(symbol: &'static str) -> Self {
        Self::new(symbol, &[PortClass::Input, PortClass::Audio])
    }

    pub fn audio_out(symbol: &'static str) -> Self {
        Self::new(symbol, &[PortClass::Output, PortClass::Audio])
    }

    pub fn with_default(mut self, default: f32) -> Self {
        self.default = default;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// What the host did to instances of a mock plugin.
#[derive(Debug, Default)]
pub struct InstanceLog {
    pub instantiations: u32,
    pub connections: Vec<(u32, PortRegion)>,
    pub activations: u32,
    pub deactivations: u32,
    pub runs: u64,
    pub frames: u64,
    /// Control values seen by the last `run`, one per control region in index order.
    pub controls: Vec<f32>,
    pub frees: u32,
}

pub struct MockPlugin {
    pub uri: &'static str,
    pub ports: Vec<PortSpec>,
    pub refuse_instantiation: bool,
    pub log: Rc<RefCell<InstanceLog>>,
}

impl MockPlugin {
    pub fn new(uri: &'static str, ports: Vec<PortSpec>) -> Self {
        Self {
            uri,
            ports,
            refuse_instantiation: false,
            log: Rc::default(),
        }
    }
}

impl Plugin for MockPlugin {
    fn uri(&self) -> &str {
        self.uri
    }

    fn name(&self) -> &str {
        "Mock"
    }

    fn port_count(&self) -> u32 {
        self.ports.len() as u32
    }

    fn port_symbol(&self, index: u32) -> Option<&str> {
        self.ports.get(index as usize).map(|p| p.symbol)
    }

    fn port_ranges(&self) -> Vec<PortRange> {
        self.ports
            .iter()
            .map(|p| PortRange::new(f32::NAN, f32::NAN, p.default))
            .collect()
    }

    fn port_has_property(&self, index: u32, property: PortProperty) -> bool {
        property == PortProperty::ConnectionOptional
            && self.ports.get(index as usize).is_some_and(|p| p.optional)
    }

    fn port_is_a(&self, index: u32, class: PortClass) -> bool {
        self.ports
            .get(index as usize)
            .is_some_and(|p| p.classes.contains(&class))
    }

    fn port_index_of_symbol(&self, symbol: &str) -> Option<u32> {
        self.ports
            .iter()
            .position(|p| p.symbol == symbol)
            .map(|i| i as u32)
    }

    fn instantiate(&self, _sample_rate: f64) -> Option<Box<dyn PluginInstance>> {
        self.log.borrow_mut().instantiations += 1;
        if self.refuse_instantiation {
            return None;
        }
        Some(Box::new(MockInstance {
            regions: vec![PortRegion::Unbound; self.ports.len()],
            log: Rc::clone(&self.log),
        }))
    }
}

/// Copies audio input channel 0 to every output, or writes the block number
/// when there is no input.
struct MockInstance {
    regions: Vec<PortRegion>,
    log: Rc<RefCell<InstanceLog>>,
}

impl PluginInstance for MockInstance {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        self.regions[index as usize] = region;
        self.log.borrow_mut().connections.push((index, region));
    }

    fn activate(&mut self) {
        self.log.borrow_mut().activations += 1;
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let mut log = self.log.borrow_mut();
        let block_number = log.runs as f32;
        log.runs += 1;
        log.frames += io.frames() as u64;
        log.controls = self
            .regions
            .iter()
            .filter(|r| matches!(r, PortRegion::Control(_)))
            .map(|r| io.control(*r))
            .collect();

        let input = self
            .regions
            .iter()
            .find(|r| matches!(r, PortRegion::AudioIn(_)))
            .copied();
        for region in &self.regions {
            if let PortRegion::AudioOut(_) = region {
                match input {
                    Some(input) => {
                        let (src, dst) = io.input_output(input, *region);
                        dst.copy_from_slice(src);
                    }
                    None => io.output(*region).fill(block_number),
                }
            }
        }
    }

    fn deactivate(&mut self) {
        self.log.borrow_mut().deactivations += 1;
    }
}

impl Drop for MockInstance {
    fn drop(&mut self) {
        self.log.borrow_mut().frees += 1;
    }
}

#[derive(Default)]
pub struct MockWorld {
    pub plugins: Vec<MockPlugin>,
    pub loaded: bool,
}

impl MockWorld {
    pub fn with(plugin: MockPlugin) -> Self {
        Self {
            plugins: vec![plugin],
            loaded: false,
        }
    }
}

impl PluginWorld for MockWorld {
    fn load_all(&mut self) {
        self.loaded = true;
    }

    fn plugin_by_uri(&self, uri: &str) -> Option<&dyn Plugin> {
        if !self.loaded {
            return None;
        }
        self.plugins
            .iter()
            .find(|p| p.uri == uri)
            .map(|p| p as &dyn Plugin)
    }

    fn plugins(&self) -> Vec<&dyn Plugin> {
        self.plugins.iter().map(|p| p as &dyn Plugin).collect()
    }
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// What the host did to the mock files.
#[derive(Debug, Default)]
pub struct FileLog {
    pub sink_opens: u32,
    pub source_opens: u32,
    pub format: Option<SinkFormat>,
    pub writes: u64,
    pub closes: u32,
    /// Interleaved frames that reached the sink.
    pub written: Vec<f32>,
}

#[derive(Default)]
pub struct MockFiles {
    pub log: Rc<RefCell<FileLog>>,
    /// Block index whose write comes up short.
    pub short_write_at: Option<u64>,
    pub refuse_sink: bool,
    pub fail_close: bool,
    /// Channel count and interleaved samples served by `open_source`.
    pub source: Option<(usize, Vec<f32>)>,
}

impl AudioFiles for MockFiles {
    fn open_sink(&mut self, _path: &Path, format: SinkFormat) -> Result<Box<dyn AudioSink>, BoxError> {
        let mut log = self.log.borrow_mut();
        log.sink_opens += 1;
        log.format = Some(format);
        if self.refuse_sink {
            return Err("permission denied".into());
        }
        Ok(Box::new(MockSink {
            channels: format.channels as usize,
            short_write_at: self.short_write_at,
            fail_close: self.fail_close,
            log: Rc::clone(&self.log),
        }))
    }

    fn open_source(&mut self, _path: &Path) -> Result<Box<dyn AudioSource>, BoxError> {
        self.log.borrow_mut().source_opens += 1;
        let (channels, samples) = self.source.clone().ok_or("no such file")?;
        Ok(Box::new(MockSource {
            channels,
            samples,
            position: 0,
        }))
    }
}

struct MockSink {
    channels: usize,
    short_write_at: Option<u64>,
    fail_close: bool,
    log: Rc<RefCell<FileLog>>,
}

impl AudioSink for MockSink {
    fn write_block(&mut self, samples: &[f32], stride: usize, frames: usize) -> Result<usize, BoxError> {
        let mut log = self.log.borrow_mut();
        if self.short_write_at == Some(log.writes) {
            log.writes += 1;
            return Ok(0);
        }
        log.writes += 1;
        for frame in 0..frames {
            for c in 0..self.channels {
                log.written.push(samples[c * stride + frame]);
            }
        }
        Ok(frames)
    }

    fn close(self: Box<Self>) -> Result<(), BoxError> {
        self.log.borrow_mut().closes += 1;
        if self.fail_close {
            return Err("disk full".into());
        }
        Ok(())
    }
}

struct MockSource {
    channels: usize,
    samples: Vec<f32>,
    position: usize,
}

impl AudioSource for MockSource {
    fn channels(&self) -> usize {
        self.channels
    }

    fn frames(&self) -> u64 {
        (self.samples.len() / self.channels.max(1)) as u64
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn read_block(&mut self, samples: &mut [f32], stride: usize, frames: usize) -> Result<usize, BoxError> {
        let available = self.samples.len() / self.channels.max(1) - self.position;
        let n = frames.min(available);
        for frame in 0..n {
            for c in 0..self.channels {
                samples[c * stride + frame] = self.samples[(self.position + frame) * self.channels + c];
            }
        }
        self.position += n;
        Ok(n)
    }
}
