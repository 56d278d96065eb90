//! Render configuration for porthost.
//!
//! - [`RenderConfig`] - serde/TOML render settings with range validation and
//!   conversion into a [`porthost_core::HostRequest`]
//! - [`paths`] - platform-specific location of the default settings file
//! - [`ConfigError`] - everything that can go wrong loading or validating
//!
//! # Example
//!
//! ```rust
//! use porthost_config::RenderConfig;
//!
//! let config = RenderConfig::from_toml(r#"
//!     plugin = "urn:porthost:sine"
//!     duration_secs = 1.0
//!
//!     [params]
//!     frequency = 220.0
//! "#).unwrap();
//!
//! let request = config.to_request(&[]).unwrap();
//! assert_eq!(request.overrides.len(), 1);
//! ```

mod error;
pub mod paths;
mod render;

pub use error::ConfigError;
pub use render::{BLOCK_SIZE_RANGE, DEFAULT_OUTPUT, RenderConfig, SAMPLE_RATE_RANGE};
