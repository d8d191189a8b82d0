//! JSON codec for plugin messages.
//!
//! Each direction carries exactly one document, so there is no framing: the
//! writer closes its stream after the message and the reader consumes to EOF.

use super::protocol::{PluginRequest, PluginResponse};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    fn encode(kind: &'static str, source: serde_json::Error) -> Self {
        Self::Encode { kind, source }
    }

    fn decode(kind: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { kind, source }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Host side: serialize the request written to the plugin's stdin.
pub fn encode_request(request: &PluginRequest) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(request).map_err(|e| CodecError::encode("request", e))?;
    tracing::trace!(json_size_bytes = json.len(), "Encoded plugin request");
    Ok(json)
}

/// Host side: parse the plugin's stdout.
pub fn decode_response(bytes: &[u8]) -> Result<PluginResponse, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::decode("response", e))
}

/// Plugin side: parse the request read from stdin.
pub fn decode_request(bytes: &[u8]) -> Result<PluginRequest, CodecError> {
    serde_json::from_slice(bytes).map_err(|e| CodecError::decode("request", e))
}

/// Plugin side: serialize the response written to stdout.
pub fn encode_response(response: &PluginResponse) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(response).map_err(|e| CodecError::encode("response", e))
}
