//! # PolicySet
//!
//! An ordered list of policy references and exemption references. Its
//! effective policy is computed on demand: referenced policies are grouped
//! by target and combined, then every exemption is applied in document
//! order.
//!
//! A reference may name a `Policy` or another `PolicySet`; a nested set
//! contributes its own effective policy. Content addressing rules out
//! reference cycles: a document's identity covers the identities it names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cnorm_core::{DocumentId, Namespace};

use crate::document::Document;
use crate::effective::EffectivePolicy;
use crate::error::{PolicyError, PolicyResult};
use crate::meta::DocumentMeta;
use crate::resolver::DocumentResolver;

/// A named aggregation of policy and exemption references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicySet {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(default)]
    policies: Vec<DocumentId>,
    #[serde(default)]
    exemptions: Vec<DocumentId>,
}

impl PolicySet {
    pub fn new(meta: DocumentMeta, policies: Vec<DocumentId>, exemptions: Vec<DocumentId>) -> Self {
        Self {
            meta,
            policies,
            exemptions,
        }
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn policies(&self) -> &[DocumentId] {
        &self.policies
    }

    pub fn exemptions(&self) -> &[DocumentId] {
        &self.exemptions
    }

    /// True when the set references nothing.
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty() && self.exemptions.is_empty()
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.meta.namespace = namespace;
        self
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &DocumentId> {
        self.policies.iter().chain(self.exemptions.iter())
    }

    /// Copy with every reference found in `renamed` replaced, or `None` if
    /// no reference changed.
    pub(crate) fn substitute(&self, renamed: &HashMap<DocumentId, DocumentId>) -> Option<Self> {
        if !self.references().any(|id| renamed.contains_key(id)) {
            return None;
        }
        let swap = |ids: &[DocumentId]| -> Vec<DocumentId> {
            ids.iter()
                .map(|id| renamed.get(id).unwrap_or(id).clone())
                .collect()
        };
        Some(Self {
            meta: self.meta.clone(),
            policies: swap(&self.policies),
            exemptions: swap(&self.exemptions),
        })
    }

    /// Fold the referenced policies and exemptions into one policy per target.
    ///
    /// # Errors
    ///
    /// Fails on the first reference that cannot be resolved, that names a
    /// document which is not a policy, or whose combination or exemption
    /// breaks an invariant. Fold failures are wrapped in
    /// [`PolicyError::Document`] naming the offending reference.
    pub fn effective_policy(&self, resolver: &dyn DocumentResolver) -> PolicyResult<EffectivePolicy> {
        let mut effective = EffectivePolicy::empty();
        for id in &self.policies {
            let referenced = resolve_effective(resolver, id)?;
            effective = effective
                .combine(&referenced)
                .map_err(|e| e.in_document(id))?;
        }
        for id in &self.exemptions {
            let exemption = resolve_effective(resolver, id)?;
            effective = effective
                .exempt(&exemption)
                .map_err(|e| e.in_document(id))?;
        }
        debug!(
            set = %self.meta.proper_name(),
            targets = effective.len(),
            "computed effective policy"
        );
        Ok(effective)
    }

    /// Combine the effective policies of two sets.
    pub fn combine(
        &self,
        other: &PolicySet,
        resolver: &dyn DocumentResolver,
    ) -> PolicyResult<EffectivePolicy> {
        self.effective_policy(resolver)?
            .combine(&other.effective_policy(resolver)?)
    }

    /// Exempt this set's effective policy by the other set's, per target.
    pub fn exempt(
        &self,
        other: &PolicySet,
        resolver: &dyn DocumentResolver,
    ) -> PolicyResult<EffectivePolicy> {
        self.effective_policy(resolver)?
            .exempt(&other.effective_policy(resolver)?)
    }
}

/// Resolve `id` to the effective policy it denotes.
///
/// A `Policy` denotes itself for its target; a `PolicySet` denotes its
/// effective policy. Anything else is [`PolicyError::NotAPolicy`].
pub(crate) fn resolve_effective(
    resolver: &dyn DocumentResolver,
    id: &DocumentId,
) -> PolicyResult<EffectivePolicy> {
    let document = resolver.resolve(id)?;
    match document.as_ref() {
        Document::Policy(policy) => Ok(EffectivePolicy::from_policy(policy.clone())),
        Document::PolicySet(set) => set.effective_policy(resolver).map_err(|e| e.in_document(id)),
        other => Err(PolicyError::NotAPolicy {
            id: id.clone(),
            kind: other.kind(),
        }),
    }
}
