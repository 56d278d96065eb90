//! Installed LV2 plugins for porthost.
//!
//! [`Lv2World`] implements [`PluginWorld`] over the system's LV2 bundles
//! through `lilv`. Discovery follows the usual LV2 search path (`LV2_PATH`,
//! falling back to the platform defaults). Each verified plugin's ports are
//! read once during [`PluginWorld::load_all`], so the core's classification
//! questions never go back to the RDF model.
//!
//! Instances keep their own control slots and audio scratch buffers; the
//! plugin is connected to those, and each block is copied between them and
//! the host's [`porthost_core::PortIo`] regions. Raw pointers never leave
//! this crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use porthost_core::{Host, HostRequest, RenderLength};
//! use porthost_io::WavFiles;
//! use porthost_lv2::{DEFAULT_PLUGIN_URI, Lv2World};
//!
//! let mut world = Lv2World::new();
//! let mut files = WavFiles::new();
//! let request = HostRequest::new(DEFAULT_PLUGIN_URI, "helm.wav")
//!     .with_length(RenderLength::Seconds(1.0));
//! Host::new(&mut world, &mut files).run(&request)?;
//! # Ok::<(), porthost_core::HostError>(())
//! ```

mod instance;
mod plugin;
mod urid;

pub use instance::{Lv2Instance, SCRATCH_FRAMES};
pub use plugin::Lv2Plugin;

use porthost_core::{Plugin, PluginWorld};

/// Plugin rendered when an LV2 render names no plugin.
pub const DEFAULT_PLUGIN_URI: &str = "http://tytel.org/helm";

/// World of every LV2 plugin installed on the system.
///
/// Empty until [`PluginWorld::load_all`] is called.
pub struct Lv2World {
    world: lilv::World,
    plugins: Vec<Lv2Plugin>,
    loaded: bool,
}

impl Lv2World {
    /// Create an unloaded world.
    pub fn new() -> Self {
        Self {
            world: lilv::World::new(),
            plugins: Vec::new(),
            loaded: false,
        }
    }

    /// Number of usable plugins found by the last load.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no usable plugin was found.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl Default for Lv2World {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginWorld for Lv2World {
    fn load_all(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        self.world.load_all();

        let vocabulary = plugin::Vocabulary::new(&self.world);
        for lilv_plugin in self.world.plugins().iter() {
            if !lilv_plugin.verify() {
                let uri = lilv_plugin.uri();
                tracing::warn!(uri = uri.as_uri().unwrap_or("?"), "plugin failed verification, skipping");
                continue;
            }
            match Lv2Plugin::describe(lilv_plugin, &vocabulary) {
                Some(described) => {
                    tracing::debug!(uri = described.uri(), ports = described.port_count(), "discovered plugin");
                    self.plugins.push(described);
                }
                None => tracing::warn!("plugin without a URI, skipping"),
            }
        }
        tracing::info!(plugins = self.plugins.len(), "LV2 world loaded");
    }

    fn plugin_by_uri(&self, uri: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|p| p.uri() == uri)
            .map(|p| p as &dyn Plugin)
    }

    fn plugins(&self) -> Vec<&dyn Plugin> {
        self.plugins.iter().map(|p| p as &dyn Plugin).collect()
    }
}
