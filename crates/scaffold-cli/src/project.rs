//! Project directory preconditions checked before a plugin runs.

use std::fs;
use std::io;
use std::path::Path;

use crate::args::CommandKind;
use crate::error::{ProjectError, Result};

/// `init` needs a fresh directory, which is created here. Every other command
/// needs an existing one.
pub fn prepare_project_dir(kind: CommandKind, dir: &Path) -> Result<()> {
    match kind {
        CommandKind::Init => create_fresh(dir),
        CommandKind::Create => require_existing(dir),
    }
}

fn create_fresh(dir: &Path) -> Result<()> {
    let exists = dir.try_exists().map_err(|source| ProjectError::Inspect {
        path: dir.to_path_buf(),
        source,
    })?;
    if exists {
        return Err(ProjectError::AlreadyExists(dir.to_path_buf()));
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir).map_err(|source| ProjectError::Create {
        path: dir.to_path_buf(),
        source,
    })?;
    tracing::debug!(dir = %dir.display(), "Created project directory");
    Ok(())
}

fn require_existing(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ProjectError::NotADirectory(dir.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ProjectError::Missing(dir.to_path_buf()))
        }
        Err(source) => Err(ProjectError::Inspect {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
