//! scaffold: host for external scaffolding plugins.
//!
//! A plugin is an executable that reads one JSON [`PluginRequest`] on stdin
//! and writes one JSON [`PluginResponse`] on stdout. The host runs it inside
//! the project directory and writes the returned universe back to disk.

pub mod bridge;
pub mod descriptor;
pub mod plugin;
pub mod runner;
pub mod universe;

pub use bridge::codec::CodecError;
pub use bridge::protocol::{PluginReportedError, PluginRequest, PluginResponse, Universe};
pub use descriptor::ExternalPlugin;
pub use runner::{
    InvocationId, PluginRunner, PluginSpawner, ProcessSpawner, RunError, RunnerConfig,
};
pub use universe::{MaterializeReport, Materializer, WriteError, materialize};

/// Version from Cargo.toml
pub const SCAFFOLD_VERSION: &str = env!("CARGO_PKG_VERSION");
