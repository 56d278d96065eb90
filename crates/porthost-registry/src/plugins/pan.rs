//! Constant-power mono to stereo panner.

use std::f32::consts::FRAC_PI_4;

use porthost_core::{PluginInstance, PortIo, PortRegion};

use super::clamp_control;
use crate::{PluginCategory, PluginManifest, PortSpec};

/// Plugin URI.
pub const URI: &str = "urn:porthost:pan";

const PORTS: &[PortSpec] = &[
    PortSpec::control_input("pan", "Pan", -1.0, 1.0, 0.0),
    PortSpec::audio_input("in", "In"),
    PortSpec::audio_output("left", "Left"),
    PortSpec::audio_output("right", "Right"),
];

/// Catalog entry.
pub const MANIFEST: PluginManifest = PluginManifest {
    uri: URI,
    name: "Panner",
    description: "Places a mono input in the stereo field with a constant-power law",
    category: PluginCategory::Utility,
    ports: PORTS,
};

/// Create an instance.
pub fn instantiate(_sample_rate: f64) -> Box<dyn PluginInstance> {
    Box::new(Pan {
        pan: PortRegion::Unbound,
        input: PortRegion::Unbound,
        left: PortRegion::Unbound,
        right: PortRegion::Unbound,
    })
}

struct Pan {
    pan: PortRegion,
    input: PortRegion,
    left: PortRegion,
    right: PortRegion,
}

/// Left and right gains for a pan position in [-1, 1].
pub fn pan_gains(pan: f32) -> (f32, f32) {
    // -1 → angle 0 (hard left), +1 → angle π/2 (hard right)
    let angle = (pan + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

fn scale_into(io: &mut PortIo<'_>, input: PortRegion, output: PortRegion, gain: f32) {
    let (src, dst) = io.input_output(input, output);
    if src.len() == dst.len() {
        for (out, &x) in dst.iter_mut().zip(src) {
            *out = x * gain;
        }
    } else {
        dst.fill(0.0);
    }
}

impl PluginInstance for Pan {
    fn connect_port(&mut self, index: u32, region: PortRegion) {
        match index {
            0 => self.pan = region,
            1 => self.input = region,
            2 => self.left = region,
            3 => self.right = region,
            _ => {}
        }
    }

    fn run(&mut self, io: &mut PortIo<'_>) {
        let (left, right) = pan_gains(clamp_control(io.control(self.pan), -1.0, 1.0, 0.0));
        scale_into(io, self.input, self.left, left);
        scale_into(io, self.input, self.right, right);
    }
}
