//! # cnorm-cli: Command-Line Tool for Codified Norms
//!
//! Provides the `cnorm` binary, a thin layer over `cnorm-repo`.
//!
//! ## Subcommands
//!
//! - `cnorm list`: Every loadable document: identity, kind, proper name.
//! - `cnorm check`: Validate every document file and report `OK`/`NOK`.
//! - `cnorm fix`: Restamp stale identities and propagate renames.
//! - `cnorm new`: Write an empty document of a given kind.
//!
//! ## Exit Codes
//!
//! `0` on success, `1` when the command found problems (a failed check, a
//! skipped document), `2` when the command itself could not run.
//!
//! ```bash
//! cnorm --repository ./repository check
//! cnorm list --kind Policy
//! cnorm new PolicySet --dir repository/org
//! ```

pub mod check;
pub mod fix;
pub mod list;
pub mod new;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cnorm_repo::Repository;

/// Conventional name of the repository directory.
pub const REPOSITORY_DIR: &str = "repository";

/// Walk up from `start` to the first directory named `repository`, or
/// containing one.
pub fn find_repository_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.file_name().is_some_and(|name| name == REPOSITORY_DIR) {
            return Some(dir.to_path_buf());
        }
        let nested = dir.join(REPOSITORY_DIR);
        if nested.is_dir() {
            return Some(nested);
        }
        dir = dir.parent()?;
    }
}

/// Open the repository at `repo_root`.
pub fn open_repository(repo_root: &Path) -> Result<Repository> {
    Repository::open(repo_root)
        .with_context(|| format!("failed to open repository at {}", repo_root.display()))
}
