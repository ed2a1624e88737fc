//! # Reconciliation
//!
//! Brings every file's recorded identity and namespace back in line with
//! its content and location, and propagates renames to the documents that
//! refer to them.
//!
//! ## Passes
//!
//! 1. Leaf documents (policies, targets, params, values).
//! 2. Policy sets, repeated until no set is renamed, since a set may
//!    refer to another set.
//! 3. Configs.
//!
//! Each pass substitutes references through the renames recorded so far
//! before recomputing identities, so a renamed policy renames the sets
//! and configs that refer to it. A converged tree produces no rewrites.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use cnorm_core::DocumentId;
use cnorm_policy::{Document, DocumentKind};

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;
use crate::store::LoadedDocument;

/// A file written back under a new identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// The identity recorded before the rewrite, if there was one.
    pub previous: Option<DocumentId>,
    pub id: DocumentId,
}

/// A file left untouched because it could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of [`Repository::fix`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixReport {
    pub rewrites: Vec<Rewrite>,
    pub skipped: Vec<Skipped>,
}

impl FixReport {
    /// True when nothing needed rewriting and nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.rewrites.is_empty() && self.skipped.is_empty()
    }
}

/// Old identity to current identity.
#[derive(Debug, Default)]
struct Renames(HashMap<DocumentId, DocumentId>);

impl Renames {
    /// Record `old -> new`, redirecting earlier renames that ended at `old`.
    fn record(&mut self, old: DocumentId, new: DocumentId) {
        if old == new {
            return;
        }
        for target in self.0.values_mut() {
            if *target == old {
                *target = new.clone();
            }
        }
        self.0.insert(old, new);
    }
}

impl Repository {
    /// Rewrite every stale document and propagate the renames.
    ///
    /// Documents that fail to decode, or whose rewrite fails, are reported
    /// in [`FixReport::skipped`] and do not stop the run. The cache is
    /// cleared afterwards.
    pub fn fix(&self) -> RepoResult<FixReport> {
        let mut report = FixReport::default();
        let mut leaves = Vec::new();
        let mut sets = Vec::new();
        let mut configs = Vec::new();

        for path in self.store().enumerate()? {
            match self.store().read(&path) {
                Ok(loaded) => match loaded.document.kind() {
                    DocumentKind::PolicySet => sets.push(loaded),
                    DocumentKind::Config => configs.push(loaded),
                    _ => leaves.push(loaded),
                },
                Err(err) => self.skip(&mut report, path, &err),
            }
        }

        let mut renames = Renames::default();
        for loaded in &mut leaves {
            self.reconcile(loaded, &mut renames, &mut report);
        }

        // Bounded: each productive round settles at least one more level of nesting.
        for _ in 0..=sets.len() {
            let mut changed = false;
            for loaded in &mut sets {
                changed |= self.reconcile(loaded, &mut renames, &mut report);
            }
            if !changed {
                break;
            }
        }

        for loaded in &mut configs {
            self.reconcile(loaded, &mut renames, &mut report);
        }

        self.clear();
        info!(
            rewritten = report.rewrites.len(),
            skipped = report.skipped.len(),
            "reconciliation complete"
        );
        Ok(report)
    }

    /// Rewrite one document if needed. Returns true if it was rewritten.
    fn reconcile(
        &self,
        loaded: &mut LoadedDocument,
        renames: &mut Renames,
        report: &mut FixReport,
    ) -> bool {
        let substituted = loaded.document.substitute_references(&renames.0);
        if substituted.is_none() && !loaded.is_stale() {
            return false;
        }
        let document = substituted.unwrap_or_else(|| Document::clone(&loaded.document));

        let id = match self.store().write(&loaded.path, &document) {
            Ok(id) => id,
            Err(err) => {
                self.skip(report, loaded.path.clone(), &err);
                return false;
            }
        };

        let relative = self.store().relative(&loaded.path).to_path_buf();
        match &loaded.recorded_id {
            Some(old) => info!(path = %relative.display(), %old, new = %id, "rewrote document"),
            None => info!(path = %relative.display(), new = %id, "stamped document"),
        }

        if let Some(old) = loaded.recorded_id.clone() {
            renames.record(old, id.clone());
        }
        renames.record(loaded.id.clone(), id.clone());

        report.rewrites.push(Rewrite {
            path: relative,
            previous: loaded.recorded_id.clone(),
            id: id.clone(),
        });

        loaded.recorded_namespace = document.meta().namespace.clone();
        loaded.document = Arc::new(document);
        loaded.recorded_id = Some(id.clone());
        loaded.id = id;
        true
    }

    fn skip(&self, report: &mut FixReport, path: PathBuf, err: &RepoError) {
        let relative = self.store().relative(&path).to_path_buf();
        warn!(path = %relative.display(), error = %err, "skipping document");
        report.skipped.push(Skipped {
            path: relative,
            reason: err.to_string(),
        });
    }
}
