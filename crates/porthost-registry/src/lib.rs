//! Built-in plugin world for porthost.
//!
//! This crate provides a [`PluginWorld`] whose plugins are compiled into the
//! binary. Each plugin is described by a static [`PluginManifest`] (URI,
//! name, category and per-port classes, properties and ranges) and created
//! through a factory function, the same way an LV2 world pairs a bundle's
//! manifest with its shared object.
//!
//! # Example
//!
//! ```rust
//! use porthost_core::{Plugin, PluginWorld};
//! use porthost_registry::{BuiltinWorld, PluginCategory};
//!
//! let mut world = BuiltinWorld::new();
//! world.load_all();
//!
//! for manifest in world.all_plugins() {
//!     println!("{} <{}>", manifest.name, manifest.uri);
//! }
//!
//! let sine = world.plugin_by_uri("urn:porthost:sine").unwrap();
//! assert_eq!(sine.port_count(), 3);
//!
//! assert_eq!(world.plugins_in_category(PluginCategory::Generator).len(), 2);
//! ```

pub mod plugins;

use porthost_core::{Plugin, PluginInstance, PluginWorld, PortClass, PortProperty, PortRange};

/// Category of a built-in plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginCategory {
    /// Oscillators and noise sources (no audio inputs)
    Generator,
    /// Gain stages and panners
    Utility,
    /// Meters and analyzers
    Analysis,
}

impl PluginCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            PluginCategory::Generator => "Generator",
            PluginCategory::Utility => "Utility",
            PluginCategory::Analysis => "Analysis",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            PluginCategory::Generator => "Oscillators and noise sources",
            PluginCategory::Utility => "Gain stages, panners, and routing helpers",
            PluginCategory::Analysis => "Meters that report measurements on control outputs",
        }
    }
}

/// Static description of one port.
#[derive(Debug, Clone, Copy)]
pub struct PortSpec {
    /// Port symbol, unique within the plugin.
    pub symbol: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Classes the port is an instance of.
    pub classes: &'static [PortClass],
    /// Declared properties.
    pub properties: &'static [PortProperty],
    /// Declared value range.
    pub range: PortRange,
}

impl PortSpec {
    /// Control input with a range and default.
    pub const fn control_input(
        symbol: &'static str,
        name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            symbol,
            name,
            classes: &[PortClass::Input, PortClass::Control],
            properties: &[],
            range: PortRange::new(min, max, default),
        }
    }

    /// Control output with no declared range.
    pub const fn control_output(symbol: &'static str, name: &'static str) -> Self {
        Self {
            symbol,
            name,
            classes: &[PortClass::Output, PortClass::Control],
            properties: &[],
            range: PortRange::UNDEFINED,
        }
    }

    /// Audio input.
    pub const fn audio_input(symbol: &'static str, name: &'static str) -> Self {
        Self {
            symbol,
            name,
            classes: &[PortClass::Input, PortClass::Audio],
            properties: &[],
            range: PortRange::UNDEFINED,
        }
    }

    /// Audio output.
    pub const fn audio_output(symbol: &'static str, name: &'static str) -> Self {
        Self {
            symbol,
            name,
            classes: &[PortClass::Output, PortClass::Audio],
            properties: &[],
            range: PortRange::UNDEFINED,
        }
    }

    /// Replace the declared properties.
    pub const fn with_properties(mut self, properties: &'static [PortProperty]) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the declared classes.
    pub const fn with_classes(mut self, classes: &'static [PortClass]) -> Self {
        self.classes = classes;
        self
    }
}

/// Describes a plugin in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct PluginManifest {
    /// Plugin URI.
    pub uri: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Category for organization.
    pub category: PluginCategory,
    /// Ports in index order.
    pub ports: &'static [PortSpec],
}

/// Factory function type for creating instances.
type PluginFactory = fn(f64) -> Box<dyn PluginInstance>;

/// A catalog entry: manifest plus factory.
pub struct BuiltinPlugin {
    manifest: PluginManifest,
    factory: PluginFactory,
}

impl BuiltinPlugin {
    /// The plugin's manifest.
    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    fn port(&self, index: u32) -> Option<&PortSpec> {
        self.manifest.ports.get(index as usize)
    }
}

impl Plugin for BuiltinPlugin {
    fn uri(&self) -> &str {
        self.manifest.uri
    }

    fn name(&self) -> &str {
        self.manifest.name
    }

    fn port_count(&self) -> u32 {
        self.manifest.ports.len() as u32
    }

    fn port_symbol(&self, index: u32) -> Option<&str> {
        self.port(index).map(|p| p.symbol)
    }

    fn port_ranges(&self) -> Vec<PortRange> {
        self.manifest.ports.iter().map(|p| p.range).collect()
    }

    fn port_has_property(&self, index: u32, property: PortProperty) -> bool {
        self.port(index)
            .is_some_and(|p| p.properties.contains(&property))
    }

    fn port_is_a(&self, index: u32, class: PortClass) -> bool {
        self.port(index).is_some_and(|p| p.classes.contains(&class))
    }

    fn port_index_of_symbol(&self, symbol: &str) -> Option<u32> {
        self.manifest
            .ports
            .iter()
            .position(|p| p.symbol == symbol)
            .map(|i| i as u32)
    }

    fn instantiate(&self, sample_rate: f64) -> Option<Box<dyn PluginInstance>> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            tracing::warn!(uri = self.manifest.uri, sample_rate, "refusing to instantiate");
            return None;
        }
        Some((self.factory)(sample_rate))
    }
}

/// World of every built-in plugin.
///
/// The catalog is empty until [`PluginWorld::load_all`] is called.
#[derive(Default)]
pub struct BuiltinWorld {
    entries: Vec<BuiltinPlugin>,
}

impl BuiltinWorld {
    /// Create an unloaded world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a world with every built-in plugin already loaded.
    pub fn loaded() -> Self {
        let mut world = Self::new();
        world.load_all();
        world
    }

    /// Register all built-in plugins.
    fn register_builtin_plugins(&mut self) {
        self.register(plugins::sine::MANIFEST, plugins::sine::instantiate);
        self.register(plugins::noise::MANIFEST, plugins::noise::instantiate);
        self.register(plugins::amp::MANIFEST, plugins::amp::instantiate);
        self.register(plugins::pan::MANIFEST, plugins::pan::instantiate);
        self.register(plugins::meter::MANIFEST, plugins::meter::instantiate);
    }

    /// Register a plugin with the world.
    fn register(&mut self, manifest: PluginManifest, factory: PluginFactory) {
        tracing::debug!(uri = manifest.uri, "registered plugin");
        self.entries.push(BuiltinPlugin { manifest, factory });
    }

    /// Returns manifests for all loaded plugins.
    pub fn all_plugins(&self) -> Vec<&PluginManifest> {
        self.entries.iter().map(|e| &e.manifest).collect()
    }

    /// Returns manifests for plugins in a specific category.
    pub fn plugins_in_category(&self, category: PluginCategory) -> Vec<&PluginManifest> {
        self.entries
            .iter()
            .filter(|e| e.manifest.category == category)
            .map(|e| &e.manifest)
            .collect()
    }

    /// Get a manifest by URI.
    pub fn get(&self, uri: &str) -> Option<&PluginManifest> {
        self.entries
            .iter()
            .find(|e| e.manifest.uri == uri)
            .map(|e| &e.manifest)
    }

    /// Returns the number of loaded plugins.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no plugins are loaded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PluginWorld for BuiltinWorld {
    fn load_all(&mut self) {
        if self.entries.is_empty() {
            self.register_builtin_plugins();
        }
    }

    fn plugin_by_uri(&self, uri: &str) -> Option<&dyn Plugin> {
        self.entries
            .iter()
            .find(|e| e.manifest.uri == uri)
            .map(|e| e as &dyn Plugin)
    }

    fn plugins(&self) -> Vec<&dyn Plugin> {
        self.entries.iter().map(|e| e as &dyn Plugin).collect()
    }
}
