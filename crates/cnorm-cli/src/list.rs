//! # List Subcommand
//!
//! Prints every document that loads, one per line:
//!
//! ```text
//! <id> <type> "<proper name>"
//! ```
//!
//! Files that fail to load are skipped with a warning; `cnorm check`
//! reports them.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use cnorm_policy::DocumentKind;
use cnorm_repo::ListEntry;

/// Arguments for the `cnorm list` subcommand.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list documents of this kind (e.g. Policy, PolicySet, Config).
    #[arg(long, value_name = "KIND")]
    pub kind: Option<DocumentKind>,

    /// Print a JSON array instead of one line per document.
    #[arg(long)]
    pub json: bool,
}

/// Execute the list subcommand.
pub fn run_list(args: &ListArgs, repo_root: &Path) -> Result<u8> {
    let repo = crate::open_repository(repo_root)?;
    let entries = repo.list(args.kind).context("failed to list documents")?;

    if args.json {
        let rows: Vec<serde_json::Value> = entries.iter().map(entry_json).collect();
        let text = serde_json::to_string_pretty(&rows).context("failed to encode listing")?;
        println!("{text}");
    } else {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    }
    tracing::debug!(count = entries.len(), "listed documents");
    Ok(0)
}

fn format_entry(entry: &ListEntry) -> String {
    format!("{} {} \"{}\"", entry.id, entry.kind, entry.proper_name)
}

fn entry_json(entry: &ListEntry) -> serde_json::Value {
    json!({
        "id": entry.id,
        "type": entry.kind,
        "name": entry.proper_name,
        "path": entry.path.as_ref().map(|p| p.display().to_string()),
    })
}
