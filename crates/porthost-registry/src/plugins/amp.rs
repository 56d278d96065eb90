//! Mono gain stage with optional polarity inversion.

use porthost_core::{PluginInstance, PortIo, PortProperty, PortRegion};

use super::{clamp_control, db_to_linear};
use crate::{PluginCategory, PluginManifest, PortSpec};

/// Plugin URI.
pub const URI: &str = "urn:porthost:amp";

const PORTS: &[PortSpec] = &[
    PortSpec::control_input("gain", "Gain (dB)", -90.0, 24.0, 0.0),
    PortSpec::audio_input("in", "In"),
    PortSpec::audio_output("out", "Out"),
    PortSpec::control_input("invert", "Invert Polarity", 0.0, 1.0, 0.0)
        .with_properties(&[PortProperty::Toggled]),
];

/// Catalog entry.
pub const MANIFEST: PluginManifest = PluginManifest {
    uri: URI,
    name: "Amplifier",
    description: "Applies a fixed gain in decibels",
    category: PluginCategory::Utility,
    ports: PORTS,
};

/// Create an instance.
pub fn instantiate(_sample_rate: f64) -> Box<dyn PluginInstance> {
    Box::new(Amp {
        gain: PortRegion::Unbound,
        input: PortRegion::Unbound,
        output: PortRegion::Unbound,
        invert: PortRegion::Unbound,
    })
}

struct Amp {
    gain: PortRegion,
    input: PortRegion,
    output: PortRegion,
    invert: PortRegion,
}

impl PluginInstance for Amp {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        match index {
            0 => self.gain = region,
            1 => self.input = region,
            2 => self.output = region,
            3 => self.invert = region,
            _ => {}
        }
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let mut gain = db_to_linear(clamp_control(io.control(self.gain), -90.0, 24.0, 0.0));
        // Toggled: anything at or above the midpoint counts as on.
        if io.control(self.invert) >= 0.5 {
            gain = -gain;
        }
        let (src, dst) = io.input_output(self.input, self.output);
        if src.len() == dst.len() {
            for (out, &x) in dst.iter_mut().zip(src) {
                *out = x * gain;
            }
        } else {
            dst.fill(0.0);
        }
    }
}
