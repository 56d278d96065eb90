//! Error taxonomy for the host lifecycle.
//!
//! Every variant is fatal to a render. [`HostError::exit_code`] maps each
//! one to the process status the CLI reports, and [`HostError::stage`] names
//! the lifecycle stage that produced it for diagnostics.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by collaborator implementations (codecs, registries).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a port could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyFault {
    /// The port declares neither an input nor an output class.
    NoDirection,
    /// The port is neither control nor audio and unsupported ports are rejected.
    UnsupportedKind,
}

impl fmt::Display for ClassifyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyFault::NoDirection => write!(f, "port is neither input nor output"),
            ClassifyFault::UnsupportedKind => write!(f, "port has unsupported type"),
        }
    }
}

/// Lifecycle stage, used to tag diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// URI parsing and plugin lookup.
    Discovery,
    /// Port descriptor classification.
    Classification,
    /// Control overrides from the caller.
    Overrides,
    /// Opening the input file.
    SourceOpen,
    /// Opening the output file.
    SinkOpen,
    /// Creating the plugin instance.
    Instantiation,
    /// The per-block render loop.
    Render,
    /// Closing the output file.
    SinkClose,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Discovery => write!(f, "discovery"),
            Stage::Classification => write!(f, "port classification"),
            Stage::Overrides => write!(f, "control overrides"),
            Stage::SourceOpen => write!(f, "opening input"),
            Stage::SinkOpen => write!(f, "opening output"),
            Stage::Instantiation => write!(f, "instantiation"),
            Stage::Render => write!(f, "render"),
            Stage::SinkClose => write!(f, "closing output"),
        }
    }
}

/// Errors that abort a render.
#[derive(Debug, Error)]
pub enum HostError {
    /// The plugin identifier is not a well-formed URI.
    #[error("invalid plugin URI <{uri}>")]
    InvalidIdentifier {
        /// The rejected identifier.
        uri: String,
    },

    /// No plugin with this URI exists in the world.
    #[error("plugin <{uri}> not found")]
    NotFound {
        /// The URI that was looked up.
        uri: String,
    },

    /// A port could not be classified.
    #[error("port {index}: {fault}")]
    PortClassification {
        /// Index of the offending port.
        index: u32,
        /// What was wrong with it.
        fault: ClassifyFault,
    },

    /// A control override names a symbol the plugin does not have.
    #[error("unknown port `{symbol}'")]
    UnknownOverrideSymbol {
        /// The unresolved port symbol.
        symbol: String,
    },

    /// The input file could not be opened.
    #[error("failed to open input {path} ({reason})")]
    SourceOpen {
        /// Path of the input file.
        path: PathBuf,
        /// Codec or I/O diagnostic.
        reason: String,
    },

    /// The input file's channel count does not match the plugin's audio inputs.
    #[error("input {path} has {found} channel(s) but the plugin has {expected} audio input(s)")]
    SourceChannelMismatch {
        /// Path of the input file.
        path: PathBuf,
        /// Number of audio input ports on the plugin.
        expected: usize,
        /// Number of channels in the file.
        found: usize,
    },

    /// Reading a block from the input file failed or came up short.
    #[error("failed to read block {block} from input {path} ({reason})")]
    SourceRead {
        /// Path of the input file.
        path: PathBuf,
        /// Zero-based block index.
        block: u64,
        /// Codec diagnostic or short-read description.
        reason: String,
    },

    /// The output file could not be opened.
    #[error("failed to open {path} ({reason})")]
    SinkOpen {
        /// Path of the output file.
        path: PathBuf,
        /// Codec or I/O diagnostic.
        reason: String,
    },

    /// The plugin refused to instantiate.
    #[error("failed to instantiate plugin <{uri}>")]
    InstantiationFailure {
        /// URI of the plugin.
        uri: String,
    },

    /// Writing a block to the output file failed or came up short.
    #[error("failed to write block {block} to output file {path} ({reason})")]
    SinkWrite {
        /// Path of the output file.
        path: PathBuf,
        /// Zero-based block index.
        block: u64,
        /// Codec diagnostic or short-write description.
        reason: String,
    },

    /// Finalizing the output file failed.
    #[error("failed to close {path} ({reason})")]
    SinkClose {
        /// Path of the output file.
        path: PathBuf,
        /// Codec or I/O diagnostic.
        reason: String,
    },
}

impl HostError {
    /// Process exit status for this error.
    pub const fn exit_code(&self) -> i32 {
        match self {
            HostError::InvalidIdentifier { .. } => 2,
            HostError::NotFound { .. } => 3,
            HostError::SourceOpen { .. } | HostError::SourceChannelMismatch { .. } => 4,
            HostError::PortClassification { .. } => 5,
            HostError::SourceRead { .. } => 6,
            HostError::UnknownOverrideSymbol { .. } => 7,
            HostError::SinkOpen { .. } => 8,
            HostError::SinkWrite { .. } => 9,
            HostError::InstantiationFailure { .. } => 10,
            HostError::SinkClose { .. } => 11,
        }
    }

    /// Lifecycle stage that raised this error.
    pub const fn stage(&self) -> Stage {
        match self {
            HostError::InvalidIdentifier { .. } | HostError::NotFound { .. } => Stage::Discovery,
            HostError::PortClassification { .. } => Stage::Classification,
            HostError::UnknownOverrideSymbol { .. } => Stage::Overrides,
            HostError::SourceOpen { .. } | HostError::SourceChannelMismatch { .. } => {
                Stage::SourceOpen
            }
            HostError::SinkOpen { .. } => Stage::SinkOpen,
            HostError::InstantiationFailure { .. } => Stage::Instantiation,
            HostError::SourceRead { .. } | HostError::SinkWrite { .. } => Stage::Render,
            HostError::SinkClose { .. } => Stage::SinkClose,
        }
    }
}

/// Convenience result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
