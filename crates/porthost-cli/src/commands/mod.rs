//! CLI command implementations.

pub mod common;
pub mod info;
pub mod plugins;
pub mod ports;
pub mod render;
