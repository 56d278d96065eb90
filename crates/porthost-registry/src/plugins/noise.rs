//! White noise generator.
//!
//! Output is deterministic for a given `seed`, so renders are reproducible.

use porthost_core::{PluginInstance, PortIo, PortProperty, PortRegion};

use super::clamp_control;
use crate::{PluginCategory, PluginManifest, PortSpec};

/// Plugin URI.
pub const URI: &str = "urn:porthost:noise";

const PORTS: &[PortSpec] = &[
    PortSpec::control_input("level", "Level", 0.0, 1.0, 0.25),
    PortSpec::control_input("seed", "Seed", 1.0, 65_535.0, 1.0)
        .with_properties(&[PortProperty::Integer]),
    PortSpec::audio_output("out", "Out"),
];

/// Catalog entry.
pub const MANIFEST: PluginManifest = PluginManifest {
    uri: URI,
    name: "White Noise",
    description: "Uniform white noise from a seeded xorshift generator",
    category: PluginCategory::Generator,
    ports: PORTS,
};

/// Create an instance.
pub fn instantiate(_sample_rate: f64) -> Box<dyn PluginInstance> {
    Box::new(Noise {
        state: 0,
        seed: 0,
        level: PortRegion::Unbound,
        seed_port: PortRegion::Unbound,
        out: PortRegion::Unbound,
    })
}

struct Noise {
    state: u32,
    /// Seed the generator was last reset from; 0 means not yet seeded.
    seed: u32,
    level: PortRegion,
    seed_port: PortRegion,
    out: PortRegion,
}

impl Noise {
    #[inline]
    fn next(&mut self) -> f32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;

        // Convert to float in [-1, 1]
        (x as i32 as f32) / (i32::MAX as f32)
    }
}

impl PluginInstance for Noise {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        match index {
            0 => self.level = region,
            1 => self.seed_port = region,
            2 => self.out = region,
            _ => {}
        }
    }

    fn activate(&mut self) {
        self.seed = 0;
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let seed = clamp_control(io.control(self.seed_port), 1.0, 65_535.0, 1.0).round() as u32;
        if seed != self.seed {
            self.seed = seed;
            self.state = seed.wrapping_mul(0x9E37_79B9) | 1;
        }
        let level = clamp_control(io.control(self.level), 0.0, 1.0, 0.25);

        let out = io.output(self.out);
        for sample in out {
            *sample = self.next() * level;
        }
    }
}
