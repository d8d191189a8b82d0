//! Descriptor for an external plugin executable.

use std::path::{Path, PathBuf};

/// An external plugin program and the project directory it runs against.
///
/// `dir_context` is both the subprocess working directory and the root that
/// returned universe paths are resolved against. Callers must make sure it
/// exists and is a directory before invoking any command other than `init`,
/// and that it did not exist before an `init`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPlugin {
    pub name: String,
    pub version: Option<String>,
    pub path: PathBuf,
    pub dir_context: PathBuf,
}

impl ExternalPlugin {
    /// Name defaults to the executable's file stem.
    pub fn new(path: impl Into<PathBuf>, dir_context: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            version: None,
            path,
            dir_context: dir_context.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn dir_context(&self) -> &Path {
        &self.dir_context
    }
}

impl std::fmt::Display for ExternalPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}/{}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}
