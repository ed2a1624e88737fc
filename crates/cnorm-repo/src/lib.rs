//! # cnorm-repo: Filesystem Document Repository
//!
//! A directory tree of JSON documents, one per file, exposed through an
//! explicit [`Repository`] handle:
//!
//! - **Store** (`store.rs`): enumeration, reading and writing of document
//!   files. A document's namespace is derived from its directory.
//!
//! - **Repository** (`repository.rs`): identity-keyed document cache and
//!   the [`DocumentResolver`](cnorm_policy::DocumentResolver) used to fold
//!   policy sets and resolve configs.
//!
//! - **Check** (`check.rs`): per-file validation report.
//!
//! - **Reconciliation** (`reconcile.rs`): the `fix` pass that restamps
//!   stale identities and propagates renames to referring documents.
//!
//! - **New** (`new.rs`): empty documents with placeholder headers.
//!
//! ## Crate Policy
//!
//! - The library never prints. Report lines are the caller's concern;
//!   diagnostics go through `tracing`.
//! - A bad document never aborts a whole-tree operation. Only failing to
//!   enumerate the tree does.

pub mod check;
pub mod config;
pub mod error;
pub mod new;
pub mod reconcile;
pub mod repository;
pub mod store;

pub use check::{CheckEntry, CheckStatus};
pub use config::{RepositoryConfig, CONFIG_FILE};
pub use error::{RepoError, RepoResult};
pub use new::{empty_document, Created};
pub use reconcile::{FixReport, Rewrite, Skipped};
pub use repository::{ListEntry, Repository};
pub use store::{DocumentStore, LoadedDocument};
