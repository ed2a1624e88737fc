//! # Repository Check
//!
//! Loads every document file and reports one [`CheckEntry`] per file.
//! Nothing here aborts on a bad document; only a failure to enumerate the
//! tree is an error.

use std::path::PathBuf;

use tracing::{debug, info};

use cnorm_core::DocumentId;
use cnorm_policy::Document;

use crate::error::RepoResult;
use crate::repository::Repository;

/// Outcome of checking one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    /// The file could not be read or decoded.
    Corrupted(String),
    /// The file decoded but breaks a policy invariant.
    Inconsistent(String),
    Empty,
    /// A policy set or config whose effective policy cannot be computed.
    InvalidEffectivePolicy(String),
    /// A config whose assignment breaks its policy.
    Violations(Vec<String>),
}

impl CheckStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok)
    }

    /// Human-readable reason for a failed check; empty for [`CheckStatus::Ok`].
    pub fn reason(&self) -> String {
        match self {
            CheckStatus::Ok => String::new(),
            CheckStatus::Corrupted(_) => "corrupted or not a policy".to_string(),
            CheckStatus::Inconsistent(reason) => reason.clone(),
            CheckStatus::Empty => "is empty".to_string(),
            CheckStatus::InvalidEffectivePolicy(reason) => reason.clone(),
            CheckStatus::Violations(violations) => violations.join("; "),
        }
    }
}

/// One checked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// Identity computed from content, when the file decoded.
    pub id: Option<DocumentId>,
    pub status: CheckStatus,
}

impl Repository {
    /// Check every document file under the root, in path order.
    pub fn check(&self) -> RepoResult<Vec<CheckEntry>> {
        let files = self.store().enumerate()?;
        let mut entries = Vec::with_capacity(files.len());
        for path in files {
            let relative = self.store().relative(&path).to_path_buf();
            let entry = match self.load_path(&path) {
                Ok(loaded) => CheckEntry {
                    status: self.check_document(&loaded.document),
                    path: relative,
                    id: Some(loaded.id),
                },
                Err(err) => {
                    let status = if err.is_inconsistency() {
                        CheckStatus::Inconsistent(err.to_string())
                    } else {
                        CheckStatus::Corrupted(err.to_string())
                    };
                    CheckEntry {
                        path: relative,
                        id: None,
                        status,
                    }
                }
            };
            debug!(path = %entry.path.display(), ok = entry.status.is_ok(), "checked document");
            entries.push(entry);
        }
        let failed = entries.iter().filter(|e| !e.status.is_ok()).count();
        info!(checked = entries.len(), failed, "check complete");
        Ok(entries)
    }

    fn check_document(&self, document: &Document) -> CheckStatus {
        if document.is_empty() {
            return CheckStatus::Empty;
        }
        match document {
            Document::PolicySet(set) => match set.effective_policy(self) {
                Ok(_) => CheckStatus::Ok,
                Err(err) => CheckStatus::InvalidEffectivePolicy(err.to_string()),
            },
            Document::Config(config) => {
                if config.applicable().is_some() {
                    if let Err(err) = config.policy(self) {
                        return CheckStatus::InvalidEffectivePolicy(err.to_string());
                    }
                }
                let violations = config.violations(self);
                if violations.is_empty() {
                    CheckStatus::Ok
                } else {
                    CheckStatus::Violations(violations)
                }
            }
            _ => CheckStatus::Ok,
        }
    }
}
