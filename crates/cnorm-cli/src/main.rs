//! # cnorm CLI entry point
//!
//! Parses command-line arguments, locates the repository and dispatches to
//! subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cnorm_cli::check::{run_check, CheckArgs};
use cnorm_cli::fix::{run_fix, FixArgs};
use cnorm_cli::list::{run_list, ListArgs};
use cnorm_cli::new::{run_new, NewArgs};

/// Codified Norms: governance policies as content-addressed documents.
///
/// Lists, validates, reconciles and creates policy, policy set and config
/// documents stored in a repository directory.
#[derive(Parser, Debug)]
#[command(name = "cnorm", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Repository root. Defaults to the nearest `repository` directory.
    #[arg(long, global = true, value_name = "DIR")]
    repository: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every document in the repository.
    List(ListArgs),

    /// Validate every document and report OK/NOK per file.
    Check(CheckArgs),

    /// Restamp stale identities and propagate renamed references.
    Fix(FixArgs),

    /// Create an empty document of a given kind.
    New(NewArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let repo_root = cli
        .repository
        .clone()
        .or_else(resolve_repo_root)
        .unwrap_or_else(|| {
            tracing::warn!("Could not locate a repository directory; using current directory");
            std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        });

    tracing::debug!(repo_root = %repo_root.display(), "resolved repository root");

    let result = match cli.command {
        Commands::List(args) => run_list(&args, &repo_root),
        Commands::Check(args) => run_check(&args, &repo_root),
        Commands::Fix(args) => run_fix(&args, &repo_root),
        Commands::New(args) => run_new(&args, &repo_root),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn resolve_repo_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    cnorm_cli::find_repository_root(&cwd)
}
