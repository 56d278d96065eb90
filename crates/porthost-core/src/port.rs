//! Port descriptor table.
//!
//! Classification walks a plugin's ports in index order and records, for
//! each one, its direction, signal kind, optionality and initial control
//! value. The resulting [`PortTable`] also carries the audio channel counts
//! the buffer allocator sizes its storage from.
//!
//! Classification is all-or-nothing: the first port that cannot be
//! classified aborts with [`HostError::PortClassification`] and no table is
//! produced.

use std::fmt;
use std::str::FromStr;

use crate::error::{ClassifyFault, HostError, Result};
use crate::plugin::{Plugin, PortClass, PortProperty};

/// Direction of data flow through a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to plugin.
    Input,
    /// Plugin to host.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Kind of signal a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// One scalar per block.
    Control,
    /// One sample per frame.
    Audio,
    /// Anything else; left unconnected.
    Unsupported,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Control => write!(f, "control"),
            SignalKind::Audio => write!(f, "audio"),
            SignalKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// What to do with a non-optional port that is neither control nor audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPortPolicy {
    /// Leave the port unconnected and carry on.
    #[default]
    Skip,
    /// Fail classification.
    Reject,
}

/// Classified port.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDescriptor {
    /// Position among the plugin's ports.
    pub index: u32,
    /// Port symbol, if the plugin reports one.
    pub symbol: Option<String>,
    /// Data direction. `None` only for optional ports declaring neither.
    pub direction: Option<Direction>,
    /// Signal kind.
    pub kind: SignalKind,
    /// Whether the plugin allows the port to stay unconnected.
    pub optional: bool,
    /// Current control value.
    pub value: f32,
}

impl PortDescriptor {
    /// Whether this is an audio port with the given direction.
    pub fn is_audio(&self, direction: Direction) -> bool {
        self.kind == SignalKind::Audio && self.direction == Some(direction)
    }
}

/// Descriptor per port plus aggregate audio channel counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PortTable {
    ports: Vec<PortDescriptor>,
    n_audio_in: usize,
    n_audio_out: usize,
}

impl PortTable {
    /// Classify every port of `plugin`.
    pub fn classify(plugin: &dyn Plugin, policy: UnsupportedPortPolicy) -> Result<Self> {
        let n_ports = plugin.port_count();
        let ranges = plugin.port_ranges();
        let mut table = Self {
            ports: Vec::with_capacity(n_ports as usize),
            n_audio_in: 0,
            n_audio_out: 0,
        };

        for index in 0..n_ports {
            let default = ranges
                .get(index as usize)
                .map_or(f32::NAN, |range| range.default);
            let value = if default.is_nan() { 0.0 } else { default };
            let optional = plugin.port_has_property(index, PortProperty::ConnectionOptional);

            let direction = if plugin.port_is_a(index, PortClass::Input) {
                Some(Direction::Input)
            } else if plugin.port_is_a(index, PortClass::Output) {
                Some(Direction::Output)
            } else if optional {
                None
            } else {
                return Err(HostError::PortClassification {
                    index,
                    fault: ClassifyFault::NoDirection,
                });
            };

            let kind = if plugin.port_is_a(index, PortClass::Control) {
                SignalKind::Control
            } else if plugin.port_is_a(index, PortClass::Audio) {
                match direction {
                    Some(Direction::Input) => table.n_audio_in += 1,
                    Some(Direction::Output) => table.n_audio_out += 1,
                    None => {}
                }
                SignalKind::Audio
            } else {
                if policy == UnsupportedPortPolicy::Reject && !optional {
                    return Err(HostError::PortClassification {
                        index,
                        fault: ClassifyFault::UnsupportedKind,
                    });
                }
                tracing::debug!(index, "port has unsupported type, leaving unconnected");
                SignalKind::Unsupported
            };

            table.ports.push(PortDescriptor {
                index,
                symbol: plugin.port_symbol(index).map(str::to_owned),
                direction,
                kind,
                optional,
                value,
            });
        }

        Ok(table)
    }

    /// Apply control overrides in order.
    ///
    /// Stops at the first symbol the plugin does not know; overrides before
    /// it stay applied.
    pub fn apply_overrides(
        &mut self,
        plugin: &dyn Plugin,
        overrides: &[ParamOverride],
    ) -> Result<()> {
        for param in overrides {
            let Some(port) = plugin
                .port_index_of_symbol(&param.symbol)
                .and_then(|index| self.ports.get_mut(index as usize))
            else {
                return Err(HostError::UnknownOverrideSymbol {
                    symbol: param.symbol.clone(),
                });
            };
            if port.kind != SignalKind::Control {
                tracing::warn!(symbol = %param.symbol, kind = %port.kind, "override targets a non-control port");
            }
            tracing::debug!(symbol = %param.symbol, value = param.value, "control override");
            port.value = param.value;
        }
        Ok(())
    }

    /// All descriptors in index order.
    pub fn ports(&self) -> &[PortDescriptor] {
        &self.ports
    }

    pub(crate) fn ports_mut(&mut self) -> &mut [PortDescriptor] {
        &mut self.ports
    }

    /// Descriptor at `index`.
    pub fn get(&self, index: u32) -> Option<&PortDescriptor> {
        self.ports.get(index as usize)
    }

    /// Descriptor with the given symbol.
    pub fn by_symbol(&self, symbol: &str) -> Option<&PortDescriptor> {
        self.ports
            .iter()
            .find(|port| port.symbol.as_deref() == Some(symbol))
    }

    /// Number of ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    /// Whether the plugin has no ports.
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Number of audio input ports.
    pub fn n_audio_in(&self) -> usize {
        self.n_audio_in
    }

    /// Number of audio output ports.
    pub fn n_audio_out(&self) -> usize {
        self.n_audio_out
    }
}

/// A `symbol=value` control override.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamOverride {
    /// Port symbol.
    pub symbol: String,
    /// New control value.
    pub value: f32,
}

impl ParamOverride {
    /// Create an override.
    pub fn new(symbol: impl Into<String>, value: f32) -> Self {
        Self {
            symbol: symbol.into(),
            value,
        }
    }
}

impl FromStr for ParamOverride {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (symbol, value) = s
            .split_once('=')
            .ok_or_else(|| format!("invalid override '{s}' (expected symbol=value)"))?;
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(format!("invalid override '{s}' (empty symbol)"));
        }
        let value: f32 = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid override '{s}' (value is not a number)"))?;
        Ok(Self::new(symbol, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_symbol_value_pairs() {
        let param: ParamOverride = "gain=-6.5".parse().unwrap();
        assert_eq!(param, ParamOverride::new("gain", -6.5));

        let spaced: ParamOverride = " frequency = 220 ".parse().unwrap();
        assert_eq!(spaced.symbol, "frequency");
        assert_eq!(spaced.value, 220.0);
    }

    #[test]
    fn rejects_malformed_overrides() {
        assert!("gain".parse::<ParamOverride>().is_err());
        assert!("=1.0".parse::<ParamOverride>().is_err());
        assert!("gain=loud".parse::<ParamOverride>().is_err());
    }

    #[test]
    fn audio_predicate_requires_resolved_direction() {
        let port = PortDescriptor {
            index: 0,
            symbol: None,
            direction: None,
            kind: SignalKind::Audio,
            optional: true,
            value: 0.0,
        };
        assert!(!port.is_audio(Direction::Input));
        assert!(!port.is_audio(Direction::Output));
    }
}
