//! Wire protocol types for host-plugin communication.
//!
//! One message each way:
//! - **PluginRequest** (host → plugin stdin): command, args, current universe
//! - **PluginResponse** (plugin stdout → host): full desired universe or an error

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Relative file path → file content.
///
/// Ordered so that serialization and materialization are deterministic.
pub type Universe = BTreeMap<String, String>;

/// Request sent to a plugin on its stdin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRequest {
    /// Operation name, e.g. `init` or `create api`.
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Vec<String>,
    /// Project state accumulated so far. Advisory only.
    #[serde(default, deserialize_with = "null_as_default")]
    pub universe: Universe,
}

impl PluginRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            universe: Universe::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_universe(mut self, universe: Universe) -> Self {
        self.universe = universe;
        self
    }
}

/// Response written by a plugin to its stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Echoed command, for traceability.
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: String,
    /// Complete file state the plugin wants materialized (not a delta).
    #[serde(default, deserialize_with = "null_as_default")]
    pub universe: Universe,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub error: bool,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub error_msg: String,
}

impl PluginResponse {
    pub fn success(command: impl Into<String>, universe: Universe) -> Self {
        Self {
            command: command.into(),
            universe,
            error: false,
            error_msg: String::new(),
        }
    }

    pub fn failure(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            universe: Universe::new(),
            error: true,
            error_msg: message.into(),
        }
    }

    /// Split a transport-level success into the plugin's own verdict.
    ///
    /// A response with `error = true` is a logical failure even though the
    /// plugin exited cleanly; its `error_msg` is the authoritative message.
    pub fn into_result(self) -> Result<Self, PluginReportedError> {
        if self.error {
            return Err(PluginReportedError {
                command: self.command,
                message: self.error_msg,
            });
        }
        Ok(self)
    }
}

/// Plugin exited zero but set `error` in its response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("plugin reported an error for '{command}': {message}")]
pub struct PluginReportedError {
    pub command: String,
    pub message: String,
}

/// Plugins written against loosely-typed encoders send `null` for empty or
/// zero values.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format() {
        let req = PluginRequest::new("init").with_args(["--domain", "example.com"]);
        insta::assert_json_snapshot!(req, @r#"
        {
          "command": "init",
          "args": [
            "--domain",
            "example.com"
          ],
          "universe": {}
        }
        "#);
    }

    #[test]
    fn success_response_omits_error_fields() {
        let mut universe = Universe::new();
        universe.insert("PROJECT".to_string(), "domain: example.com\n".to_string());
        let resp = PluginResponse::success("init", universe);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "command": "init",
                "universe": {"PROJECT": "domain: example.com\n"}
            })
        );
    }

    #[test]
    fn failure_response_wire_format() {
        let resp = PluginResponse::failure("create api", "missing --kind");
        insta::assert_json_snapshot!(resp, @r#"
        {
          "command": "create api",
          "universe": {},
          "error": true,
          "error_msg": "missing --kind"
        }
        "#);
    }

    #[test]
    fn into_result_passes_success_through() {
        let resp = PluginResponse::success("init", Universe::new());
        let ok = resp.clone().into_result().unwrap();
        assert_eq!(ok, resp);
    }

    #[test]
    fn into_result_surfaces_error_msg() {
        let err = PluginResponse::failure("init", "boom")
            .into_result()
            .unwrap_err();
        assert_eq!(err.command, "init");
        assert_eq!(err.message, "boom");
        assert_eq!(
            err.to_string(),
            "plugin reported an error for 'init': boom"
        );
    }

    #[test]
    fn response_tolerates_null_scalars() {
        let resp: PluginResponse = serde_json::from_str(
            r#"{"command":null,"universe":null,"error":null,"error_msg":null}"#,
        )
        .unwrap();
        assert_eq!(resp, PluginResponse::default());

        let resp: PluginResponse =
            serde_json::from_str(r#"{"command":"init","error":true,"error_msg":null}"#).unwrap();
        assert!(resp.error);
        assert_eq!(resp.error_msg, "");
    }

    #[test]
    fn request_tolerates_null_collections() {
        let req: PluginRequest =
            serde_json::from_str(r#"{"command":"init","args":null,"universe":null}"#).unwrap();
        assert_eq!(req, PluginRequest::new("init"));
    }
}
