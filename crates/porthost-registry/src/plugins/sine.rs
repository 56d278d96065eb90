//! Sine oscillator.

use std::f64::consts::TAU;

use porthost_core::{PluginInstance, PortIo, PortRegion};

use super::clamp_control;
use crate::{PluginCategory, PluginManifest, PortSpec};

/// Plugin URI.
pub const URI: &str = "urn:porthost:sine";

const PORTS: &[PortSpec] = &[
    PortSpec::control_input("frequency", "Frequency", 20.0, 20_000.0, 440.0),
    PortSpec::control_input("level", "Level", 0.0, 1.0, 0.5),
    PortSpec::audio_output("out", "Out"),
];

/// Catalog entry.
pub const MANIFEST: PluginManifest = PluginManifest {
    uri: URI,
    name: "Sine Oscillator",
    description: "Mono sine tone at a fixed frequency and level",
    category: PluginCategory::Generator,
    ports: PORTS,
};

/// Create an instance.
pub fn instantiate(sample_rate: f64) -> Box<dyn PluginInstance> {
    Box::new(Sine {
        sample_rate,
        phase: 0.0,
        frequency: PortRegion::Unbound,
        level: PortRegion::Unbound,
        out: PortRegion::Unbound,
    })
}

struct Sine {
    sample_rate: f64,
    /// Normalized phase in [0, 1).
    phase: f64,
    frequency: PortRegion,
    level: PortRegion,
    out: PortRegion,
}

impl PluginInstance for Sine {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        match index {
            0 => self.frequency = region,
            1 => self.level = region,
            2 => self.out = region,
            _ => {}
        }
    }

    fn activate(&mut self) {
        self.phase = 0.0;
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let frequency = f64::from(clamp_control(io.control(self.frequency), 20.0, 20_000.0, 440.0));
        let level = clamp_control(io.control(self.level), 0.0, 1.0, 0.5);
        let increment = frequency / self.sample_rate;

        for sample in io.output(self.out) {
            *sample = (self.phase * TAU).sin() as f32 * level;
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }
}
