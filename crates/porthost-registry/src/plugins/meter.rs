//! Pass-through peak meter.
//!
//! Copies its input to its output and reports the decaying peak level on a
//! control output. The `notify` atom port is optional and never written;
//! hosts without event support leave it unconnected.

use porthost_core::{PluginInstance, PortClass, PortIo, PortProperty, PortRegion};

use super::clamp_control;
use crate::{PluginCategory, PluginManifest, PortSpec};

/// Plugin URI.
pub const URI: &str = "urn:porthost:meter";

const PORTS: &[PortSpec] = &[
    PortSpec::audio_input("in", "In"),
    PortSpec::audio_output("out", "Out"),
    PortSpec::control_input("release", "Release", 0.0, 1.0, 0.999),
    PortSpec::control_output("peak", "Peak"),
    PortSpec::control_output("notify", "Notify")
        .with_classes(&[PortClass::Output, PortClass::Atom])
        .with_properties(&[PortProperty::ConnectionOptional]),
];

/// Catalog entry.
pub const MANIFEST: PluginManifest = PluginManifest {
    uri: URI,
    name: "Peak Meter",
    description: "Passes audio through and reports its peak level",
    category: PluginCategory::Analysis,
    ports: PORTS,
};

/// Create an instance.
pub fn instantiate(_sample_rate: f64) -> Box<dyn PluginInstance> {
    Box::new(Meter {
        peak: 0.0,
        input: PortRegion::Unbound,
        output: PortRegion::Unbound,
        release: PortRegion::Unbound,
        peak_port: PortRegion::Unbound,
    })
}

struct Meter {
    peak: f32,
    input: PortRegion,
    output: PortRegion,
    release: PortRegion,
    peak_port: PortRegion,
}

impl PluginInstance for Meter {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        match index {
            0 => self.input = region,
            1 => self.output = region,
            2 => self.release = region,
            3 => self.peak_port = region,
            // 4: notify, never written
            _ => {}
        }
    }

    fn activate(&mut self) {
        self.peak = 0.0;
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let release = clamp_control(io.control(self.release), 0.0, 1.0, 0.999);
        let mut peak = self.peak;
        {
            let (src, dst) = io.input_output(self.input, self.output);
            if src.len() == dst.len() {
                dst.copy_from_slice(src);
            } else {
                dst.fill(0.0);
            }
            for &x in src {
                peak = (peak * release).max(x.abs());
            }
        }
        self.peak = peak;
        io.set_control(self.peak_port, peak);
    }
}
