//! Renders each built-in plugin through the core render loop.

use std::path::Path;

use porthost_core::{
    AudioSink, AudioSource, BindingMap, BoxError, ChannelBuffers, MemorySink, ParamOverride,
    PluginWorld, PortTable, RenderSession, Stream, UnsupportedPortPolicy,
};
use porthost_registry::BuiltinWorld;
use porthost_registry::plugins::{amp, meter, noise, pan, sine};

/// Mono source serving a fixed buffer.
struct VecSource {
    samples: Vec<f32>,
    position: usize,
}

impl AudioSource for VecSource {
    fn channels(&self) -> usize {
        1
    }

    fn frames(&self) -> u64 {
        self.samples.len() as u64
    }

    fn sample_rate(&self) -> u32 {
        48_000
    }

    fn read_block(&mut self, samples: &mut [f32], _stride: usize, frames: usize) -> Result<usize, BoxError> {
        let n = frames.min(self.samples.len() - self.position);
        samples[..n].copy_from_slice(&self.samples[self.position..self.position + n]);
        self.position += n;
        Ok(n)
    }
}

struct Rendered {
    sink: MemorySink,
    ports: PortTable,
}

fn render(uri: &str, overrides: &[ParamOverride], input: Option<Vec<f32>>, frames: u64, block: usize) -> Rendered {
    let world = BuiltinWorld::loaded();
    let plugin = world.plugin_by_uri(uri).unwrap();

    let mut ports = PortTable::classify(plugin, UnsupportedPortPolicy::Skip).unwrap();
    ports.apply_overrides(plugin, overrides).unwrap();
    let mut buffers = ChannelBuffers::allocate(ports.n_audio_in(), ports.n_audio_out(), block);
    let mut instance = plugin.instantiate(48_000.0).unwrap();
    BindingMap::bind(&ports, instance.as_mut());

    let mut sink = MemorySink::with_capacity(ports.n_audio_out(), frames as usize);
    let mut source = input.map(|samples| VecSource { samples, position: 0 });
    {
        let path = Path::new("memory");
        let mut out: Stream<'_, dyn AudioSink> = Stream { path, io: &mut sink };
        let mut src: Option<Stream<'_, dyn AudioSource>> =
            source.as_mut().map(|s| Stream { path, io: s as &mut dyn AudioSource });

        let mut session = RenderSession::new(instance.as_mut(), &mut ports, &mut buffers);
        session.activate();
        session
            .render(src.as_mut(), &mut out, frames, &mut |_: u64, _: u64| {})
            .unwrap();
        session.close();
    }
    Rendered { sink, ports }
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |m, x| m.max(x.abs()))
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[test]
fn sine_defaults_to_half_level() {
    let out = render(sine::URI, &[], None, 4_800, 64);
    assert_eq!(out.sink.frames(), 4_800);
    let p = peak(out.sink.samples());
    assert!((p - 0.5).abs() < 0.01, "peak {p}");
    assert_eq!(out.sink.samples()[0], 0.0);
}

#[test]
fn sine_frequency_override_sets_zero_crossings() {
    // 1 kHz at 48 kHz: 48 samples per cycle, two sign changes per cycle.
    let out = render(
        sine::URI,
        &[ParamOverride::new("frequency", 1_000.0), ParamOverride::new("level", 1.0)],
        None,
        4_800,
        1,
    );
    let samples = out.sink.samples();
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();
    assert!((198..=202).contains(&crossings), "crossings {crossings}");
}

#[test]
fn block_size_does_not_change_the_signal() {
    let a = render(sine::URI, &[], None, 1_000, 1);
    let b = render(sine::URI, &[], None, 1_000, 256);
    assert_eq!(a.sink.samples(), b.sink.samples());
}

#[test]
fn noise_is_bounded_and_reproducible() {
    let a = render(noise::URI, &[], None, 2_000, 128);
    let b = render(noise::URI, &[], None, 2_000, 128);
    assert_eq!(a.sink.samples(), b.sink.samples());
    assert!(peak(a.sink.samples()) <= 0.25);

    let c = render(noise::URI, &[ParamOverride::new("seed", 7.0)], None, 2_000, 128);
    assert_ne!(a.sink.samples(), c.sink.samples());
}

// ---------------------------------------------------------------------------
// Processors
// ---------------------------------------------------------------------------

#[test]
fn amp_applies_gain_in_decibels() {
    let input = vec![0.5; 256];
    let out = render(amp::URI, &[ParamOverride::new("gain", -6.02)], Some(input), 256, 32);
    for &x in out.sink.samples() {
        assert!((x - 0.25).abs() < 0.005);
    }
}

#[test]
fn amp_clamps_out_of_range_gain() {
    let input = vec![0.1; 16];
    let out = render(amp::URI, &[ParamOverride::new("gain", 100.0)], Some(input), 16, 16);
    // Clamped to +24 dB (x15.85)
    assert!((out.sink.samples()[0] - 1.585).abs() < 0.01);
}

#[test]
fn amp_invert_flips_polarity() {
    let input = vec![0.5; 32];
    let on = [ParamOverride::new("gain", 0.0), ParamOverride::new("invert", 1.0)];
    let out = render(amp::URI, &on, Some(input.clone()), 32, 8);
    assert!(out.sink.samples().iter().all(|&x| (x + 0.5).abs() < 1e-6));

    let off = render(amp::URI, &[ParamOverride::new("invert", 0.0)], Some(input), 32, 8);
    assert!(off.sink.samples().iter().all(|&x| (x - 0.5).abs() < 1e-6));
}

#[test]
fn pan_writes_two_channels() {
    let input = vec![1.0; 64];
    let out = render(pan::URI, &[ParamOverride::new("pan", -1.0)], Some(input), 64, 16);
    assert_eq!(out.sink.channels(), 2);
    assert!(out.sink.channel(0).iter().all(|&x| (x - 1.0).abs() < 1e-5));
    assert!(out.sink.channel(1).iter().all(|&x| x.abs() < 1e-5));
}

#[test]
fn meter_passes_audio_and_reports_peak() {
    let mut input = vec![0.1; 500];
    input[100] = -0.8;
    let out = render(meter::URI, &[ParamOverride::new("release", 1.0)], Some(input.clone()), 500, 50);

    assert_eq!(out.sink.samples(), input.as_slice());
    let peak = out.ports.by_symbol("peak").unwrap().value;
    assert!((peak - 0.8).abs() < 1e-6);
}

#[test]
fn meter_notify_port_is_left_unbound() {
    let world = BuiltinWorld::loaded();
    let plugin = world.plugin_by_uri(meter::URI).unwrap();
    let ports = PortTable::classify(plugin, UnsupportedPortPolicy::Reject).unwrap();
    let map = BindingMap::plan(&ports);
    let notify = ports.by_symbol("notify").unwrap().index;
    assert_eq!(map.region(notify), Some(porthost_core::PortRegion::Unbound));
    assert_eq!(ports.n_audio_in(), 1);
    assert_eq!(ports.n_audio_out(), 1);
}
