//! # Fix Subcommand
//!
//! Runs the reconciliation pass and prints one line per rewritten file:
//!
//! ```text
//! updated file "<path>" id "<old>" -> "<new>"
//! updated file "<path>" -> "<new>"
//! ```
//!
//! The second form is for files that carried no identity yet. Files that
//! could not be processed are reported and make the command exit with `1`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use cnorm_repo::{Rewrite, Skipped};

/// Arguments for the `cnorm fix` subcommand.
#[derive(Args, Debug)]
pub struct FixArgs {}

/// Execute the fix subcommand.
pub fn run_fix(_args: &FixArgs, repo_root: &Path) -> Result<u8> {
    let repo = crate::open_repository(repo_root)?;
    let report = repo.fix().context("reconciliation failed")?;

    for rewrite in &report.rewrites {
        println!("{}", format_rewrite(rewrite));
    }
    for skipped in &report.skipped {
        println!("{}", format_skipped(skipped));
    }
    if report.rewrites.is_empty() && report.skipped.is_empty() {
        println!("OK: nothing to fix");
    }

    Ok(if report.skipped.is_empty() { 0 } else { 1 })
}

fn format_rewrite(rewrite: &Rewrite) -> String {
    let path = rewrite.path.display();
    match &rewrite.previous {
        Some(old) => format!("updated file \"{path}\" id \"{old}\" -> \"{}\"", rewrite.id),
        None => format!("updated file \"{path}\" -> \"{}\"", rewrite.id),
    }
}

fn format_skipped(skipped: &Skipped) -> String {
    format!("skipped file \"{}\": {}", skipped.path.display(), skipped.reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use cnorm_core::DocumentId;

    #[test]
    fn rewrites_show_old_and_new_identity() {
        let rewrite = Rewrite {
            path: PathBuf::from("p.json"),
            previous: Some(DocumentId::new("old")),
            id: DocumentId::new("new"),
        };
        assert_eq!(format_rewrite(&rewrite), r#"updated file "p.json" id "old" -> "new""#);

        let fresh = Rewrite {
            previous: None,
            ..rewrite
        };
        assert_eq!(format_rewrite(&fresh), r#"updated file "p.json" -> "new""#);
    }

    #[test]
    fn second_run_has_nothing_to_fix() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("t.json"),
            r#"{"type": "Target", "name": "web", "target": "web"}"#,
        )
        .unwrap();
        assert_eq!(run_fix(&FixArgs {}, tmp.path()).unwrap(), 0);

        let repo = cnorm_repo::Repository::open(tmp.path()).unwrap();
        assert!(repo.fix().unwrap().is_clean());
    }

    #[test]
    fn unreadable_files_fail_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("bad.json"), "[").unwrap();
        assert_eq!(run_fix(&FixArgs {}, tmp.path()).unwrap(), 1);
    }
}
