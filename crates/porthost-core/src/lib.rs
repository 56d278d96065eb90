//! porthost core - port classification, buffer binding and the render loop
//! for hosting a single audio plugin offline.
//!
//! # Pipeline
//!
//! - [`PortTable`] - classifies every port by direction and signal kind
//! - [`ChannelBuffers`] - allocates audio storage once, before instantiation
//! - [`BindingMap`] - connects ports to control slots and audio channels in
//!   index order
//! - [`RenderSession`] - activates the instance and runs it block by block
//! - [`Host`] / [`Session`] - the lifecycle controller tying the stages
//!   together and releasing resources on every exit path
//!
//! # Collaborators
//!
//! Plugin discovery ([`PluginWorld`], [`Plugin`], [`PluginInstance`]) and
//! audio file access ([`AudioFiles`], [`AudioSink`], [`AudioSource`]) are
//! traits. `porthost-registry` and `porthost-io` provide the stock
//! implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use porthost_core::{Host, HostRequest, RenderLength};
//!
//! let mut world = porthost_registry::BuiltinWorld::new();
//! let mut files = porthost_io::WavFiles::new();
//! let request = HostRequest::new("urn:porthost:sine", "out.wav")
//!     .with_override("frequency", 220.0)
//!     .with_length(RenderLength::Seconds(2.0));
//! let report = Host::new(&mut world, &mut files).run(&request)?;
//! println!("wrote {} frames", report.stats.frames);
//! ```

pub mod binder;
pub mod buffer;
pub mod error;
pub mod host;
pub mod io;
pub mod plugin;
pub mod port;
pub mod render;

pub use binder::{BindingMap, PortBinding};
pub use buffer::ChannelBuffers;
pub use error::{BoxError, ClassifyFault, HostError, Result, Stage};
pub use host::{
    DEFAULT_BITS_PER_SAMPLE, DEFAULT_RENDER_SECS, DEFAULT_SAMPLE_RATE, Host, HostRequest,
    RenderLength, RenderReport, Session,
};
pub use io::{AudioFiles, AudioSink, AudioSource, MemorySink, SinkFormat};
pub use plugin::{
    Plugin, PluginInstance, PluginWorld, PortClass, PortIo, PortProperty, PortRange, PortRegion,
    is_valid_uri,
};
pub use port::{
    Direction, ParamOverride, PortDescriptor, PortTable, SignalKind, UnsupportedPortPolicy,
};
pub use render::{RenderObserver, RenderSession, RenderStats, SessionState, Stream};
