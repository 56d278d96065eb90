//! Render settings.
//!
//! A [`RenderConfig`] collects everything a render needs before it becomes a
//! [`HostRequest`]. Settings come from three layers, later layers winning:
//! built-in defaults, a TOML file, then command-line flags.
//!
//! ```toml
//! plugin = "urn:porthost:sine"
//! output = "tone.wav"
//! sample_rate = 48000
//! duration_secs = 2.0
//! block_size = 256
//!
//! [params]
//! frequency = 220.0
//! level = 0.8
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use porthost_core::{
    DEFAULT_BITS_PER_SAMPLE, DEFAULT_SAMPLE_RATE, HostRequest, ParamOverride, RenderLength,
    UnsupportedPortPolicy,
};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Output path used when neither the file nor the command line names one.
pub const DEFAULT_OUTPUT: &str = "out.wav";

/// Accepted sample rates in Hz.
pub const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8_000..=384_000;

/// Accepted block sizes in frames.
pub const BLOCK_SIZE_RANGE: std::ops::RangeInclusive<usize> = 1..=8192;

/// Settings for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Plugin URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Output WAV path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Input WAV path feeding the plugin's audio inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Render length in seconds. Unset means the input's length, or 4 seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    /// Frames per plugin `run`.
    pub block_size: usize,
    /// Output bit depth: 16, 24 or 32 (float).
    pub bit_depth: u16,
    /// Fail on required ports that are neither control nor audio.
    pub strict_ports: bool,
    /// Control overrides by port symbol, applied in file order.
    pub params: IndexMap<String, f32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            plugin: None,
            output: None,
            input: None,
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration_secs: None,
            block_size: 1,
            bit_depth: DEFAULT_BITS_PER_SAMPLE,
            strict_ports: false,
            params: IndexMap::new(),
        }
    }
}

impl RenderConfig {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from the file at `path` if it exists, else the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save settings to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every setting against its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(ConfigError::invalid(
                "sample_rate",
                format!(
                    "must be between {} and {} Hz, got {}",
                    SAMPLE_RATE_RANGE.start(),
                    SAMPLE_RATE_RANGE.end(),
                    self.sample_rate
                ),
            ));
        }
        if !BLOCK_SIZE_RANGE.contains(&self.block_size) {
            return Err(ConfigError::invalid(
                "block_size",
                format!(
                    "must be between {} and {}, got {}",
                    BLOCK_SIZE_RANGE.start(),
                    BLOCK_SIZE_RANGE.end(),
                    self.block_size
                ),
            ));
        }
        if !matches!(self.bit_depth, 16 | 24 | 32) {
            return Err(ConfigError::invalid(
                "bit_depth",
                format!("must be 16, 24 or 32, got {}", self.bit_depth),
            ));
        }
        if let Some(secs) = self.duration_secs
            && !(secs.is_finite() && secs > 0.0)
        {
            return Err(ConfigError::invalid(
                "duration_secs",
                format!("must be a positive number of seconds, got {secs}"),
            ));
        }
        if let Some((symbol, value)) = self.params.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::invalid(
                "params",
                format!("value for '{symbol}' is not finite: {value}"),
            ));
        }
        Ok(())
    }

    /// Validate and convert into a host request.
    ///
    /// `extra` overrides are applied after the file's `params`, so a symbol
    /// given in both ends up with the later value.
    pub fn to_request(&self, extra: &[ParamOverride]) -> Result<HostRequest, ConfigError> {
        self.validate()?;
        let plugin = self.plugin.as_deref().ok_or(ConfigError::MissingPlugin)?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        let length = match self.duration_secs {
            Some(secs) => RenderLength::Seconds(secs),
            None => RenderLength::MatchInput,
        };
        let policy = if self.strict_ports {
            UnsupportedPortPolicy::Reject
        } else {
            UnsupportedPortPolicy::Skip
        };

        let mut request = HostRequest::new(plugin, output)
            .with_sample_rate(self.sample_rate)
            .with_length(length)
            .with_block_size(self.block_size)
            .with_bits_per_sample(self.bit_depth)
            .with_unsupported_ports(policy);
        if let Some(input) = &self.input {
            request = request.with_input(input);
        }
        request.overrides = self
            .params
            .iter()
            .map(|(symbol, &value)| ParamOverride::new(symbol, value))
            .chain(extra.iter().cloned())
            .collect();
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.bit_depth, 24);
        assert_eq!(config.block_size, 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = RenderConfig::from_toml(
            r#"
            plugin = "urn:porthost:amp"
            block_size = 64

            [params]
            gain = -3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.plugin.as_deref(), Some("urn:porthost:amp"));
        assert_eq!(config.block_size, 64);
        assert_eq!(config.sample_rate, 44_100);
        assert_eq!(config.params.get("gain"), Some(&-3.0));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let cases = [
            RenderConfig {
                sample_rate: 1_000,
                ..Default::default()
            },
            RenderConfig {
                block_size: 0,
                ..Default::default()
            },
            RenderConfig {
                block_size: 10_000,
                ..Default::default()
            },
            RenderConfig {
                bit_depth: 8,
                ..Default::default()
            },
            RenderConfig {
                duration_secs: Some(0.0),
                ..Default::default()
            },
            RenderConfig {
                duration_secs: Some(f64::INFINITY),
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn request_needs_a_plugin() {
        let err = RenderConfig::default().to_request(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingPlugin));
    }

    #[test]
    fn request_carries_every_setting() {
        let config = RenderConfig {
            plugin: Some("urn:porthost:pan".into()),
            input: Some("in.wav".into()),
            sample_rate: 48_000,
            duration_secs: Some(1.5),
            block_size: 128,
            bit_depth: 16,
            strict_ports: true,
            params: IndexMap::from([("pan".to_owned(), 0.25)]),
            ..Default::default()
        };
        let request = config
            .to_request(&[ParamOverride::new("pan", -0.5)])
            .unwrap();

        assert_eq!(request.plugin_uri, "urn:porthost:pan");
        assert_eq!(request.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(request.input, Some(PathBuf::from("in.wav")));
        assert_eq!(request.sample_rate, 48_000);
        assert!(matches!(request.length, RenderLength::Seconds(s) if s == 1.5));
        assert_eq!(request.block_size, 128);
        assert_eq!(request.bits_per_sample, 16);
        assert_eq!(request.unsupported_ports, UnsupportedPortPolicy::Reject);
        assert_eq!(
            request.overrides,
            vec![
                ParamOverride::new("pan", 0.25),
                ParamOverride::new("pan", -0.5)
            ]
        );
    }

    #[test]
    fn file_params_keep_their_written_order() {
        let config = RenderConfig::from_toml(
            r#"
            plugin = "urn:porthost:amp"

            [params]
            invert = 1.0
            gain = -3.0
            nope = 2.0
            "#,
        )
        .unwrap();
        let request = config.to_request(&[]).unwrap();
        let symbols: Vec<&str> = request.overrides.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["invert", "gain", "nope"]);

        let saved = RenderConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert!(saved.params.keys().eq(["invert", "gain", "nope"]));
    }

    #[test]
    fn missing_duration_matches_input() {
        let config = RenderConfig {
            plugin: Some("urn:porthost:sine".into()),
            ..Default::default()
        };
        let request = config.to_request(&[]).unwrap();
        assert!(matches!(request.length, RenderLength::MatchInput));
    }
}
