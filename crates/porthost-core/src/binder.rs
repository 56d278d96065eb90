//! Port binding.
//!
//! Audio channels are handed out in ascending port index, so the first audio
//! output port always lands in output channel 0, the second in channel 1 and
//! so on. The render loop and the file codec rely on that mapping.

use crate::plugin::{PluginInstance, PortRegion};
use crate::port::{Direction, PortTable, SignalKind};

/// One port's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBinding {
    /// Port index.
    pub index: u32,
    /// Region the port is connected to.
    pub region: PortRegion,
}

/// Index-ordered connections for every port of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingMap {
    bindings: Vec<PortBinding>,
}

impl BindingMap {
    /// Compute the connection of every port in `table`.
    pub fn plan(table: &PortTable) -> Self {
        let mut next_in = 0;
        let mut next_out = 0;
        let bindings = table
            .ports()
            .iter()
            .map(|port| {
                let region = match (port.kind, port.direction) {
                    (SignalKind::Control, _) => PortRegion::Control(port.index),
                    (SignalKind::Audio, Some(Direction::Input)) => {
                        next_in += 1;
                        PortRegion::AudioIn(next_in - 1)
                    }
                    (SignalKind::Audio, Some(Direction::Output)) => {
                        next_out += 1;
                        PortRegion::AudioOut(next_out - 1)
                    }
                    _ => PortRegion::Unbound,
                };
                PortBinding {
                    index: port.index,
                    region,
                }
            })
            .collect();
        Self { bindings }
    }

    /// Plan and connect every port of `instance`, in index order.
    pub fn bind(table: &PortTable, instance: &mut dyn PluginInstance) -> Self {
        let map = Self::plan(table);
        for binding in &map.bindings {
            tracing::trace!(index = binding.index, region = ?binding.region, "connect port");
            instance.connect_port(binding.index, binding.region);
        }
        map
    }

    /// All bindings in index order.
    pub fn bindings(&self) -> &[PortBinding] {
        &self.bindings
    }

    /// Region of the port at `index`.
    pub fn region(&self, index: u32) -> Option<PortRegion> {
        self.bindings.get(index as usize).map(|b| b.region)
    }

    /// Port index bound to an output channel.
    pub fn output_port(&self, channel: usize) -> Option<u32> {
        self.bindings
            .iter()
            .find(|b| b.region == PortRegion::AudioOut(channel))
            .map(|b| b.index)
    }
}
