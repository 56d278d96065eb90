//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/porthost/` (Linux), `~/Library/Application Support/porthost/` (macOS), `%APPDATA%\porthost\` (Windows)
//! - **Default render settings**: `render.toml` inside the user config directory

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "porthost";

/// File name of the default render settings.
const RENDER_CONFIG_FILE: &str = "render.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the default render settings file.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(RENDER_CONFIG_FILE)
}
