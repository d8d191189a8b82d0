use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project directory {} must not exist", .0.display())]
    AlreadyExists(PathBuf),

    #[error("project directory {} does not exist", .0.display())]
    Missing(PathBuf),

    #[error("project directory {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to create project directory {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to inspect project directory {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ProjectError>;
