//! Shared CLI helpers used across multiple commands.

use clap::ValueEnum;
use porthost_core::{HostError, ParamOverride, Plugin, PluginWorld, is_valid_uri};
use porthost_registry::BuiltinWorld;

/// Where plugins are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WorldKind {
    /// Plugins compiled into porthost
    #[default]
    Builtin,
    /// LV2 bundles installed on this system (LV2_PATH)
    Lv2,
}

/// Create an unloaded world of the given kind.
pub fn open_world(kind: WorldKind) -> anyhow::Result<Box<dyn PluginWorld>> {
    match kind {
        WorldKind::Builtin => Ok(Box::new(BuiltinWorld::new())),
        #[cfg(feature = "lv2")]
        WorldKind::Lv2 => Ok(Box::new(porthost_lv2::Lv2World::new())),
        #[cfg(not(feature = "lv2"))]
        WorldKind::Lv2 => anyhow::bail!(
            "this porthost was built without LV2 support (rebuild with --features lv2)"
        ),
    }
}

/// Plugin a render uses when neither the settings nor the command line name one.
pub fn default_plugin(kind: WorldKind) -> Option<&'static str> {
    match kind {
        WorldKind::Builtin => None,
        #[cfg(feature = "lv2")]
        WorldKind::Lv2 => Some(porthost_lv2::DEFAULT_PLUGIN_URI),
        #[cfg(not(feature = "lv2"))]
        WorldKind::Lv2 => None,
    }
}

/// Parse a `symbol=value` override for clap's `value_parser`.
pub fn parse_param(s: &str) -> Result<ParamOverride, String> {
    s.parse()
}

/// Validate `uri` and look it up in a loaded world.
pub fn resolve_plugin<'w>(world: &'w dyn PluginWorld, uri: &str) -> Result<&'w dyn Plugin, HostError> {
    if !is_valid_uri(uri) {
        return Err(HostError::InvalidIdentifier { uri: uri.to_owned() });
    }
    world
        .plugin_by_uri(uri)
        .ok_or_else(|| HostError::NotFound { uri: uri.to_owned() })
}

/// Render an optional control value for tables, `-` when undefined.
pub fn format_value(value: f32) -> String {
    if value.is_nan() {
        "-".to_owned()
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_param_accepts_symbol_value() {
        assert_eq!(
            parse_param("gain=-3").unwrap(),
            ParamOverride::new("gain", -3.0)
        );
        assert!(parse_param("gain").is_err());
    }

    #[test]
    fn resolve_distinguishes_malformed_from_missing() {
        let world = BuiltinWorld::loaded();
        assert!(matches!(
            resolve_plugin(&world, "sine"),
            Err(HostError::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            resolve_plugin(&world, "urn:porthost:nope"),
            Err(HostError::NotFound { .. })
        ));
        assert!(resolve_plugin(&world, "urn:porthost:sine").is_ok());
    }

    #[test]
    fn builtin_world_opens_unloaded() {
        let mut world = open_world(WorldKind::Builtin).unwrap();
        assert!(world.plugins().is_empty());
        world.load_all();
        assert!(resolve_plugin(&*world, "urn:porthost:amp").is_ok());
        assert_eq!(default_plugin(WorldKind::Builtin), None);
    }

    #[cfg(not(feature = "lv2"))]
    #[test]
    fn lv2_world_needs_the_feature() {
        let err = open_world(WorldKind::Lv2).err().unwrap();
        assert!(err.to_string().contains("without LV2 support"));
    }

    #[cfg(feature = "lv2")]
    #[test]
    fn lv2_renders_default_to_helm() {
        assert_eq!(default_plugin(WorldKind::Lv2), Some("http://tytel.org/helm"));
    }

    #[test]
    fn undefined_values_print_as_dash() {
        assert_eq!(format_value(f32::NAN), "-");
        assert_eq!(format_value(0.5), "0.5");
    }
}
