//! Policy-specific error types.
//!
//! Construction-time failures (`InconsistentPolicy`, `ConflictingEnforcement`,
//! `InvalidExemption`) are fatal: a caller either receives a valid `Policy`
//! or one of these. Ordinary rule mismatches in an assignment are never
//! errors; they are reported as violation strings.

use thiserror::Error;

use cnorm_core::{CanonicalizationError, DocumentId, Param, Target, Value};

use crate::document::DocumentKind;

/// Errors raised while building, combining or resolving policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A policy violates one of its consistency invariants.
    #[error("inconsistent policy {policy:?} for target {target}: param {param}: {rule}")]
    InconsistentPolicy {
        /// Proper name of the offending policy.
        policy: String,
        /// Target of the offending policy.
        target: Target,
        /// The param whose rules conflict.
        param: Param,
        /// Which invariant failed, in words.
        rule: String,
    },

    /// Two combined policies enforce different values for the same param.
    #[error("param {param} enforced to be {first} and {second}")]
    ConflictingEnforcement {
        param: Param,
        first: Value,
        second: Value,
    },

    /// An exemption carries rules other than `allowed`, or an empty `allowed`.
    #[error("invalid exemption {exemption:?}: only a non-empty \"allowed\" may be set, offending: {}", .fields.join(", "))]
    InvalidExemption {
        exemption: String,
        fields: Vec<&'static str>,
    },

    /// A same-target operation was given policies for different targets.
    #[error("policies apply to different targets: {left} and {right}")]
    TargetMismatch { left: Target, right: Target },

    /// A referenced identity could not be resolved.
    #[error("unresolved reference {id}: {reason}")]
    Unresolved { id: DocumentId, reason: String },

    /// A reference resolved to a document of the wrong kind.
    #[error("document {id} is a {kind}, not a Policy or PolicySet")]
    NotAPolicy { id: DocumentId, kind: DocumentKind },

    /// A config names no applicable policy.
    #[error("config {config:?} has no applicable policy")]
    MissingApplicable { config: String },

    /// A step failed while folding the referenced document `id`.
    #[error("in document {id}: {source}")]
    Document {
        id: DocumentId,
        source: Box<PolicyError>,
    },

    /// A stored document is not well-formed for its declared kind.
    #[error("malformed document: {0}")]
    Decode(#[source] serde_json::Error),

    /// Identity computation failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

impl PolicyError {
    /// Attach the identity of the document being folded when this error surfaced.
    pub fn in_document(self, id: &DocumentId) -> Self {
        match self {
            already @ PolicyError::Document { .. } => already,
            other => PolicyError::Document {
                id: id.clone(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
