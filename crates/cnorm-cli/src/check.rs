//! # Check Subcommand
//!
//! Validates every document file in the repository and prints one line per
//! file, or one per violation for configs that break their policy:
//!
//! ```text
//! OK <path> <id>
//! NOK <path> [<id>] "<reason>"
//! ```
//!
//! Exits with `1` if any file failed.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use cnorm_repo::{CheckEntry, CheckStatus};

/// Arguments for the `cnorm check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print only failures.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, repo_root: &Path) -> Result<u8> {
    let repo = crate::open_repository(repo_root)?;
    let entries = repo.check().context("failed to check repository")?;

    let mut failed = 0usize;
    for entry in &entries {
        if entry.status.is_ok() {
            if !args.quiet {
                println!("{}", format_entry(entry).join("\n"));
            }
        } else {
            failed += 1;
            println!("{}", format_entry(entry).join("\n"));
        }
    }

    if failed > 0 {
        tracing::info!(failed, total = entries.len(), "check found problems");
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Report lines for one checked file.
fn format_entry(entry: &CheckEntry) -> Vec<String> {
    let path = entry.path.display();
    let id = entry
        .id
        .as_ref()
        .map(|id| format!(" {id}"))
        .unwrap_or_default();
    match &entry.status {
        CheckStatus::Ok => vec![format!("OK {path}{id}")],
        CheckStatus::Violations(violations) => violations
            .iter()
            .map(|v| format!("NOK {path}{id} {v:?}"))
            .collect(),
        other => vec![format!("NOK {path}{id} {:?}", other.reason())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use cnorm_core::DocumentId;

    fn entry(id: Option<&str>, status: CheckStatus) -> CheckEntry {
        CheckEntry {
            path: PathBuf::from("org/p.json"),
            id: id.map(DocumentId::new),
            status,
        }
    }

    #[test]
    fn ok_lines_carry_the_identity() {
        assert_eq!(
            format_entry(&entry(Some("org:ab"), CheckStatus::Ok)),
            vec!["OK org/p.json org:ab"]
        );
    }

    #[test]
    fn corrupted_files_have_no_identity() {
        assert_eq!(
            format_entry(&entry(None, CheckStatus::Corrupted("eof".into()))),
            vec!["NOK org/p.json \"corrupted or not a policy\""]
        );
    }

    #[test]
    fn each_violation_gets_its_own_line() {
        let lines = format_entry(&entry(
            Some("org:ab"),
            CheckStatus::Violations(vec!["first".into(), "second".into()]),
        ));
        assert_eq!(
            lines,
            vec![
                "NOK org/p.json org:ab \"first\"",
                "NOK org/p.json org:ab \"second\"",
            ]
        );
    }

    #[test]
    fn empty_documents_fail_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("p.json"),
            r#"{"type": "Policy", "name": "P", "target": "web"}"#,
        )
        .unwrap();
        assert_eq!(run_check(&CheckArgs { quiet: true }, tmp.path()).unwrap(), 1);
    }

    #[test]
    fn an_empty_repository_passes() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(run_check(&CheckArgs { quiet: false }, tmp.path()).unwrap(), 0);
    }
}
