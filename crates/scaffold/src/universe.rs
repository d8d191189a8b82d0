//! Universe materialization - writes a plugin's file set under a project root.
//!
//! Entries are independent and written in map order. Parent directories are
//! created as needed and existing files are overwritten. Writing is not
//! transactional: files committed before a failure stay on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::bridge::protocol::Universe;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("refusing to write '{path}': universe paths must be relative and stay inside the project root")]
    UnsafePath { path: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl WriteError {
    pub fn path(&self) -> &Path {
        match self {
            Self::UnsafePath { path } => Path::new(path),
            Self::Io { path, .. } => path,
        }
    }
}

/// Files written by a successful materialization, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub written: Vec<PathBuf>,
}

/// Writes universes under a fixed root directory.
#[derive(Debug, Clone)]
pub struct Materializer {
    root: PathBuf,
    allow_unsafe_paths: bool,
}

impl Materializer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            allow_unsafe_paths: false,
        }
    }

    /// Skip key validation. Keys are then joined onto the root as-is, so a
    /// plugin can write anywhere the host can.
    pub fn allow_unsafe_paths(mut self, allow: bool) -> Self {
        self.allow_unsafe_paths = allow;
        self
    }

    pub fn materialize(&self, universe: &Universe) -> Result<MaterializeReport, WriteError> {
        if !self.allow_unsafe_paths
            && let Some(bad) = universe.keys().find(|key| !is_safe_relative_path(key))
        {
            tracing::warn!(path = %bad, "Rejecting universe path outside project root");
            return Err(WriteError::UnsafePath { path: bad.clone() });
        }

        let mut report = MaterializeReport::default();
        for (relative, content) in universe {
            let target = self.root.join(relative);
            write_entry(&target, content).map_err(|source| WriteError::Io {
                path: target.clone(),
                source,
            })?;
            tracing::debug!(
                path = %target.display(),
                bytes = content.len(),
                "Wrote project file"
            );
            report.written.push(target);
        }

        tracing::info!(
            root = %self.root.display(),
            files = report.written.len(),
            "Materialized universe"
        );
        Ok(report)
    }
}

/// Write `universe` under `root` with default (sandboxed) settings.
pub fn materialize(root: &Path, universe: &Universe) -> Result<MaterializeReport, WriteError> {
    Materializer::new(root).materialize(universe)
}

/// Relative, non-empty, and free of `..`, root, or prefix components.
pub fn is_safe_relative_path(relative: &str) -> bool {
    let path = Path::new(relative);
    if relative.is_empty() || path.is_absolute() {
        return false;
    }
    let mut has_normal = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    has_normal
}

fn write_entry(target: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dirs(parent)?;
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(FILE_MODE);
    }
    let mut file = opts.open(target)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn create_dirs(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir)
}
