//! Host-plugin message bridge.
//!
//! - **protocol**: PluginRequest / PluginResponse and the Universe map
//! - **codec**: JSON encode/decode for both sides of the pipe

pub mod codec;
pub mod protocol;
