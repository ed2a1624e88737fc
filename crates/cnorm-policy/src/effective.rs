//! Effective policy: one combined [`Policy`] per target.

use std::collections::btree_map::{self, BTreeMap};

use tracing::debug;

use cnorm_core::Target;

use crate::error::PolicyResult;
use crate::policy::{Policy, TargetAssignment};

/// The per-target result of folding policies and exemptions.
///
/// Only built through [`EffectivePolicy::from_policy`] and the algebra, so
/// every entry is keyed by its own policy's target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePolicy(BTreeMap<Target, Policy>);

impl EffectivePolicy {
    /// An effective policy covering no target.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single policy as a one-target effective policy.
    pub fn from_policy(policy: Policy) -> Self {
        let mut map = BTreeMap::new();
        map.insert(policy.target().clone(), policy);
        Self(map)
    }

    pub fn get(&self, target: &Target) -> Option<&Policy> {
        self.0.get(target)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Target, Policy> {
        self.0.iter()
    }

    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold `policy` into the entry for its target.
    pub fn add(&mut self, policy: Policy) -> PolicyResult<()> {
        let combined = match self.0.get(policy.target()) {
            Some(existing) => existing.combine(&policy)?,
            None => policy,
        };
        self.0.insert(combined.target().clone(), combined);
        Ok(())
    }

    /// Targets present on both sides are combined; the rest pass through.
    pub fn combine(&self, other: &EffectivePolicy) -> PolicyResult<EffectivePolicy> {
        let mut out = self.clone();
        for policy in other.0.values() {
            out.add(policy.clone())?;
        }
        Ok(out)
    }

    /// Exempt every target on the left by the right side's policy for the
    /// same target. Targets without a counterpart pass through unchanged.
    ///
    /// Every policy on the right must be a valid exemption, including those
    /// for targets the left side does not cover.
    pub fn exempt(&self, exemptions: &EffectivePolicy) -> PolicyResult<EffectivePolicy> {
        for exemption in exemptions.0.values() {
            exemption.ensure_exemption()?;
        }
        let mut out = BTreeMap::new();
        for (target, policy) in &self.0 {
            let exempted = match exemptions.get(target) {
                Some(exemption) => policy.exempt(exemption)?,
                None => policy.clone(),
            };
            out.insert(target.clone(), exempted);
        }
        for target in exemptions.targets().filter(|t| !self.0.contains_key(*t)) {
            debug!(target_name = %target, "exemption has no policy to apply to");
        }
        Ok(Self(out))
    }

    /// Violations of `assigned`, each prefixed with its target.
    ///
    /// A target with no policy is itself a violation.
    pub fn violations(&self, assigned: &TargetAssignment) -> Vec<String> {
        let mut out = Vec::new();
        for (target, assignment) in assigned {
            match self.0.get(target) {
                Some(policy) => out.extend(
                    policy
                        .violations(assignment)
                        .into_iter()
                        .map(|v| format!("{target}: {v}")),
                ),
                None => out.push(format!("no policy defined for target {target}")),
            }
        }
        out
    }

    /// `assigned` with every enforced value overlaid. Targets without a
    /// policy keep their assignment as-is.
    pub fn apply_enforcements(&self, assigned: &TargetAssignment) -> TargetAssignment {
        assigned
            .iter()
            .map(|(target, assignment)| {
                let mut resolved = assignment.clone();
                if let Some(policy) = self.0.get(target) {
                    for (param, value) in policy.enforcements() {
                        resolved.insert(param.clone(), value.clone());
                    }
                }
                (target.clone(), resolved)
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a EffectivePolicy {
    type Item = (&'a Target, &'a Policy);
    type IntoIter = btree_map::Iter<'a, Target, Policy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
