//! Plugin side of the protocol.
//!
//! The host-side counterpart lives in runner.rs. A plugin reads exactly one
//! request from stdin until EOF, writes exactly one response to stdout and
//! exits zero. Diagnostics belong on stderr, which the host forwards verbatim.

use std::io::{self, Read, Write};

use crate::bridge::codec::{CodecError, decode_request, encode_response};
use crate::bridge::protocol::{PluginRequest, PluginResponse, Universe};

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("plugin stdio failed: {0}")]
    Io(#[from] io::Error),
}

/// Serve one request over the process's stdin/stdout.
///
/// The handler returns the complete universe to materialize. `Err(msg)` is
/// reported back to the host as `error: true` with `error_msg: msg`; only
/// protocol failures come back as `Err` here, and the plugin should then exit
/// non-zero.
pub fn serve<F>(handler: F) -> Result<PluginResponse, ServeError>
where
    F: FnOnce(&PluginRequest) -> Result<Universe, String>,
{
    serve_with(io::stdin().lock(), io::stdout().lock(), handler)
}

/// [`serve`] over arbitrary streams.
pub fn serve_with<R, W, F>(
    mut reader: R,
    mut writer: W,
    handler: F,
) -> Result<PluginResponse, ServeError>
where
    R: Read,
    W: Write,
    F: FnOnce(&PluginRequest) -> Result<Universe, String>,
{
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;
    let request = decode_request(&input)?;

    let response = match handler(&request) {
        Ok(universe) => PluginResponse::success(&request.command, universe),
        Err(message) => PluginResponse::failure(&request.command, message),
    };

    writer.write_all(&encode_response(&response)?)?;
    writer.flush()?;
    Ok(response)
}

/// Value of `--name value` or `--name=value` in a plugin's args.
pub fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == name {
            return iter.next().map(String::as_str);
        }
        if let Some(value) = arg
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value);
        }
    }
    None
}
