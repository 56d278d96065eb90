//! Introspection of one installed LV2 plugin.

use lilv::World;
use lilv::node::Node;
use porthost_core::{Plugin, PluginInstance, PortClass, PortProperty, PortRange};

use crate::instance::Lv2Instance;
use crate::urid::UridMap;

const CLASSES: [PortClass; 6] = [
    PortClass::Input,
    PortClass::Output,
    PortClass::Control,
    PortClass::Audio,
    PortClass::Cv,
    PortClass::Atom,
];

const PROPERTIES: [PortProperty; 3] = [
    PortProperty::ConnectionOptional,
    PortProperty::Integer,
    PortProperty::Toggled,
];

/// URI nodes for every port class and property the core asks about.
pub(crate) struct Vocabulary {
    classes: Vec<(PortClass, Node)>,
    properties: Vec<(PortProperty, Node)>,
}

impl Vocabulary {
    pub(crate) fn new(world: &World) -> Self {
        Self {
            classes: CLASSES.iter().map(|&c| (c, world.new_uri(c.uri()))).collect(),
            properties: PROPERTIES
                .iter()
                .map(|&p| (p, world.new_uri(p.uri())))
                .collect(),
        }
    }
}

/// What the world learned about one port.
#[derive(Debug, Clone)]
struct PortInfo {
    index: usize,
    symbol: Option<String>,
    classes: Vec<PortClass>,
    properties: Vec<PortProperty>,
    range: PortRange,
}

/// An installed LV2 plugin with its ports read up front.
pub struct Lv2Plugin {
    plugin: lilv::plugin::Plugin,
    uri: String,
    name: String,
    ports: Vec<PortInfo>,
}

impl Lv2Plugin {
    /// Read the URI, name and every port of `plugin`. `None` if the plugin
    /// has no URI.
    pub(crate) fn describe(plugin: lilv::plugin::Plugin, vocabulary: &Vocabulary) -> Option<Self> {
        let uri = plugin.uri().as_uri()?.to_owned();
        let name = plugin.name().as_str().unwrap_or(&uri).to_owned();

        let mut ports: Vec<PortInfo> = plugin
            .iter_ports()
            .map(|port| {
                let range = port.range();
                PortInfo {
                    index: port.index(),
                    symbol: port
                        .symbol()
                        .and_then(|node| node.as_str().map(str::to_owned)),
                    classes: vocabulary
                        .classes
                        .iter()
                        .filter(|(_, node)| port.is_a(node))
                        .map(|&(class, _)| class)
                        .collect(),
                    properties: vocabulary
                        .properties
                        .iter()
                        .filter(|(_, node)| port.has_property(node))
                        .map(|&(property, _)| property)
                        .collect(),
                    range: PortRange::new(
                        float(range.minimum),
                        float(range.maximum),
                        float(range.default),
                    ),
                }
            })
            .collect();
        ports.sort_by_key(|port| port.index);

        Some(Self {
            plugin,
            uri,
            name,
            ports,
        })
    }

    fn port(&self, index: u32) -> Option<&PortInfo> {
        self.ports.get(index as usize)
    }
}

/// Numeric value of a range node; NaN when absent or not a number.
fn float(node: Option<Node>) -> f32 {
    node.and_then(|n| n.as_float().or_else(|| n.as_int().map(|i| i as f32)))
        .unwrap_or(f32::NAN)
}

impl Plugin for Lv2Plugin {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn port_count(&self) -> u32 {
        self.ports.len() as u32
    }

    fn port_symbol(&self, index: u32) -> Option<&str> {
        self.port(index).and_then(|p| p.symbol.as_deref())
    }

    fn port_ranges(&self) -> Vec<PortRange> {
        self.ports.iter().map(|p| p.range).collect()
    }

    fn port_has_property(&self, index: u32, property: PortProperty) -> bool {
        self.port(index)
            .is_some_and(|p| p.properties.contains(&property))
    }

    fn port_is_a(&self, index: u32, class: PortClass) -> bool {
        self.port(index).is_some_and(|p| p.classes.contains(&class))
    }

    fn port_index_of_symbol(&self, symbol: &str) -> Option<u32> {
        self.ports
            .iter()
            .position(|p| p.symbol.as_deref() == Some(symbol))
            .map(|i| i as u32)
    }

    fn instantiate(&self, sample_rate: f64) -> Option<Box<dyn PluginInstance>> {
        let urid = UridMap::new();
        #[allow(unsafe_code)]
        // SAFETY: lilv copies the feature array; the map it points to lives on
        // the heap inside `urid`, which the instance owns and drops last.
        let instance = unsafe { self.plugin.instantiate(sample_rate, [urid.feature()]) };
        let Some(instance) = instance else {
            tracing::warn!(uri = self.uri, sample_rate, "lilv refused to instantiate");
            return None;
        };
        Some(Box::new(Lv2Instance::new(instance, self.ports.len(), urid)))
    }
}
