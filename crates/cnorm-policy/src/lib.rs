//! # cnorm-policy: Policy Algebra and Document Model
//!
//! Governance rules as immutable documents:
//!
//! - **Policy** (`policy.rs`): per-target allowed/blocked/enforced/required/
//!   possible rules, validated on construction, with the `combine` and
//!   `exempt` algebra and assignment `violations`.
//!
//! - **EffectivePolicy** (`effective.rs`): one combined policy per target.
//!
//! - **PolicySet** (`policy_set.rs`): ordered references to policies and
//!   exemptions, folded per target into an effective policy.
//!
//! - **Config** (`config.rs`): a concrete assignment per target checked
//!   against an applicable policy or policy set.
//!
//! - **Document** (`document.rs`): the closed sum of document kinds, the
//!   `"type"`-tagged wire codec and canonical identity computation.
//!
//! ## Crate Policy
//!
//! - Depends only on `cnorm-core` internally.
//! - No I/O. References between documents are resolved through the
//!   [`DocumentResolver`] seam; the filesystem implementation lives in
//!   `cnorm-repo`.
//! - No inconsistent `Policy` can be constructed. Every constructor and
//!   every algebraic operation re-checks the invariants.

pub mod config;
pub mod document;
pub mod effective;
pub mod error;
pub mod meta;
pub mod policy;
pub mod policy_set;
pub mod resolver;

pub use config::{Config, ConfigResolution};
pub use document::{
    Document, DocumentKind, ParamDocument, StoredDocument, TargetDocument, ValueDocument,
    ValuesDocument,
};
pub use effective::EffectivePolicy;
pub use error::{PolicyError, PolicyResult};
pub use meta::DocumentMeta;
pub use policy::{Assignment, Policy, PolicyRules, TargetAssignment};
pub use policy_set::PolicySet;
pub use resolver::{DocumentResolver, InMemoryResolver};
