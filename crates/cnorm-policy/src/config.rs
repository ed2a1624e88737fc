//! # Config
//!
//! A concrete assignment of values per target, plus the one policy or
//! policy set it must satisfy. Resolution never fails: problems with the
//! applicable reference and rule mismatches alike come back as violation
//! strings, so a configuration author sees every problem in one pass.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use cnorm_core::{DocumentId, Namespace};

use crate::effective::EffectivePolicy;
use crate::error::{PolicyError, PolicyResult};
use crate::meta::DocumentMeta;
use crate::policy::TargetAssignment;
use crate::policy_set::resolve_effective;
use crate::resolver::DocumentResolver;

/// A named assignment checked against an applicable policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(default, serialize_with = "serialize_assigned")]
    assigned: TargetAssignment,
    #[serde(default, deserialize_with = "deserialize_applicable")]
    applicable: Option<DocumentId>,
}

/// Outcome of [`Config::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolution {
    /// The assignment with enforced values overlaid; present only when
    /// there are no violations.
    pub resolved: Option<TargetAssignment>,
    pub violations: Vec<String>,
}

impl ConfigResolution {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

impl Config {
    pub fn new(meta: DocumentMeta, assigned: TargetAssignment, applicable: Option<DocumentId>) -> Self {
        Self {
            meta,
            assigned,
            applicable,
        }
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn assigned(&self) -> &TargetAssignment {
        &self.assigned
    }

    pub fn applicable(&self) -> Option<&DocumentId> {
        self.applicable.as_ref()
    }

    /// True when nothing is assigned and nothing is applicable.
    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty() && self.applicable.is_none()
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.meta.namespace = namespace;
        self
    }

    pub(crate) fn references(&self) -> impl Iterator<Item = &DocumentId> {
        self.applicable.iter()
    }

    pub(crate) fn substitute(&self, renamed: &HashMap<DocumentId, DocumentId>) -> Option<Self> {
        let new_id = renamed.get(self.applicable.as_ref()?)?;
        Some(Self {
            applicable: Some(new_id.clone()),
            ..self.clone()
        })
    }

    /// The effective policy of the applicable document.
    ///
    /// # Errors
    ///
    /// [`PolicyError::MissingApplicable`] when no applicable is set, and
    /// otherwise whatever resolving or folding the applicable raises.
    pub fn policy(&self, resolver: &dyn DocumentResolver) -> PolicyResult<EffectivePolicy> {
        let id = self
            .applicable
            .as_ref()
            .ok_or_else(|| PolicyError::MissingApplicable {
                config: self.meta.proper_name(),
            })?;
        resolve_effective(resolver, id)
    }

    /// Check the assignment and produce the resolved configuration.
    pub fn resolve(&self, resolver: &dyn DocumentResolver) -> ConfigResolution {
        let effective = match self.policy(resolver) {
            Ok(effective) => effective,
            Err(err) => {
                return ConfigResolution {
                    resolved: None,
                    violations: vec![self.describe_policy_failure(&err)],
                }
            }
        };
        let violations = effective.violations(&self.assigned);
        let resolved = violations
            .is_empty()
            .then(|| effective.apply_enforcements(&self.assigned));
        ConfigResolution {
            resolved,
            violations,
        }
    }

    /// Every problem with this config, in target order.
    pub fn violations(&self, resolver: &dyn DocumentResolver) -> Vec<String> {
        self.resolve(resolver).violations
    }

    fn describe_policy_failure(&self, err: &PolicyError) -> String {
        let Some(id) = self.applicable.as_ref() else {
            return "no applicable policy defined".to_string();
        };
        match err {
            PolicyError::NotAPolicy { id: bad, .. } if bad == id => {
                format!("applicable {id} is not a Policy or PolicySet")
            }
            other => format!("applicable {id} could not be resolved: {other}"),
        }
    }
}

/// Targets are written by name so they can be JSON object keys.
fn serialize_assigned<S: Serializer>(assigned: &TargetAssignment, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(assigned.iter().map(|(target, values)| (target.name(), values)))
}

/// An empty string means no applicable policy.
fn deserialize_applicable<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DocumentId>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(DocumentId::new))
}
