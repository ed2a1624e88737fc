//! # New Subcommand
//!
//! Writes an empty document of the requested kind, with placeholder header
//! values to be filled in by hand, then run `cnorm fix` to restamp it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use cnorm_policy::DocumentKind;

/// Arguments for the `cnorm new` subcommand.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Kind of document to create (Policy, PolicySet, Config, Target, Param, Value, Values).
    #[arg(value_name = "KIND")]
    pub kind: DocumentKind,

    /// Directory to create the document in. Defaults to the current
    /// directory, which must lie inside the repository.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Execute the new subcommand.
pub fn run_new(args: &NewArgs, repo_root: &Path) -> Result<u8> {
    let repo = crate::open_repository(repo_root)?;
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("failed to read the current directory")?,
    };
    let created = repo
        .create(args.kind, &dir)
        .with_context(|| format!("failed to create {} in {}", args.kind, dir.display()))?;

    println!(
        "created empty {} \"{}\" and saved as \"{}\"",
        args.kind,
        created.id,
        created.path.display()
    );
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_into_a_repository_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("org")).unwrap();
        let args = NewArgs {
            kind: DocumentKind::Config,
            dir: Some(tmp.path().join("org")),
        };
        assert_eq!(run_new(&args, tmp.path()).unwrap(), 0);

        let created: Vec<_> = std::fs::read_dir(tmp.path().join("org"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(created.len(), 1);
        assert!(created[0].starts_with("Config_"), "{created:?}");
    }

    #[test]
    fn refuses_directories_outside_the_repository() {
        let repo = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        let args = NewArgs {
            kind: DocumentKind::Policy,
            dir: Some(elsewhere.path().to_path_buf()),
        };
        let err = run_new(&args, repo.path()).unwrap_err();
        assert!(format!("{err:#}").contains("outside the repository"));
    }
}
