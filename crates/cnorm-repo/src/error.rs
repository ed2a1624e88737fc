//! Repository error types.
//!
//! Per-document failures carry the path of the offending file so a caller
//! can report it and move on; only enumeration failures abort a whole run.

use std::path::PathBuf;

use thiserror::Error;

use cnorm_core::{CoreError, DocumentId};
use cnorm_policy::PolicyError;

/// Errors raised by repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The repository root does not exist or is not a directory.
    #[error("repository root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file is not valid JSON.
    #[error("{} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A file is valid JSON but not a valid document.
    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        source: PolicyError,
    },

    /// `cnorm.yaml` could not be parsed.
    #[error("invalid repository configuration {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("{} is outside the repository {}", path.display(), root.display())]
    OutsideRepository { path: PathBuf, root: PathBuf },

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("no document with identity {0}")]
    NotFound(DocumentId),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl RepoError {
    /// True if the file parsed but describes an inconsistent policy.
    pub fn is_inconsistency(&self) -> bool {
        matches!(
            self,
            RepoError::Document {
                source: PolicyError::InconsistentPolicy { .. },
                ..
            }
        )
    }
}

/// Result type alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
