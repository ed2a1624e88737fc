//! # Policy
//!
//! A `Policy` is the rule set for one target: which values each param may
//! take (`allowed`), which it may never take (`blocked`), which single value
//! it must take (`enforced`), which params an assignment must set
//! (`required`), and the closed universe of params (`possible`).
//!
//! ## Invariants
//!
//! Checked by [`Policy::new`] and by every operation that produces a policy:
//!
//! 1. For every param with a finite `allowed` set, `allowed ∩ blocked = ∅`.
//!    A universal `allowed` set is treated like an absent one.
//! 2. Every enforced value is concrete (not `Any`/`None`), is a member of
//!    `allowed` when the param has an allowed set, and is not blocked.
//! 3. If `possible` is non-empty, every param named by the other four rule
//!    fields is a member of it.
//!
//! ## Algebra
//!
//! - [`Policy::combine`]: narrows. Allowed sets intersect, blocked sets and
//!   required params union, enforcements must agree.
//! - [`Policy::exempt`]: widens by an allowed-only exemption. Exempted
//!   values join `allowed` and leave `blocked` and `enforced`; exempted params
//!   stop being required.
//!
//! Both are pure and return a freshly validated policy.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::debug;

use cnorm_core::{Namespace, Param, Target, Value, Values, ALL_VALUES, NO_VALUES};

use crate::effective::EffectivePolicy;
use crate::error::{PolicyError, PolicyResult};
use crate::meta::DocumentMeta;

/// Concrete values assigned to params of one target.
pub type Assignment = BTreeMap<Param, Value>;

/// Assignments for several targets.
pub type TargetAssignment = BTreeMap<Target, Assignment>;

/// The unvalidated rule fields of a policy.
///
/// This is the input to [`Policy::new`]; holding a `PolicyRules` says
/// nothing about consistency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRules {
    #[serde(default)]
    pub allowed: BTreeMap<Param, Values>,
    #[serde(default)]
    pub blocked: BTreeMap<Param, Values>,
    #[serde(default)]
    pub enforced: BTreeMap<Param, Value>,
    #[serde(default)]
    pub required: BTreeSet<Param>,
    #[serde(default)]
    pub possible: BTreeSet<Param>,
}

impl PolicyRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, param: Param, values: Values) -> Self {
        self.allowed.insert(param, values);
        self
    }

    pub fn block(mut self, param: Param, values: Values) -> Self {
        self.blocked.insert(param, values);
        self
    }

    pub fn enforce(mut self, param: Param, value: impl Into<Value>) -> Self {
        self.enforced.insert(param, value.into());
        self
    }

    pub fn require(mut self, param: Param) -> Self {
        self.required.insert(param);
        self
    }

    pub fn possible_param(mut self, param: Param) -> Self {
        self.possible.insert(param);
        self
    }

    /// True when no rule field carries anything.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
            && self.blocked.is_empty()
            && self.enforced.is_empty()
            && self.required.is_empty()
            && self.possible.is_empty()
    }

    /// Every param named by `allowed`, `blocked`, `enforced` or `required`.
    pub fn params(&self) -> BTreeSet<Param> {
        self.allowed
            .keys()
            .chain(self.blocked.keys())
            .chain(self.enforced.keys())
            .chain(self.required.iter())
            .cloned()
            .collect()
    }

    /// Fields that disqualify these rules from acting as an exemption.
    fn exemption_offences(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.allowed.is_empty() {
            fields.push("allowed");
        }
        if !self.blocked.is_empty() {
            fields.push("blocked");
        }
        if !self.enforced.is_empty() {
            fields.push("enforced");
        }
        if !self.required.is_empty() {
            fields.push("required");
        }
        if !self.possible.is_empty() {
            fields.push("possible");
        }
        fields
    }
}

/// A validated, immutable rule set for one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub struct Policy {
    meta: DocumentMeta,
    rules: PolicyRules,
}

/// Wire form: header and rule fields side by side in one object.
#[derive(Serialize, Deserialize)]
struct PolicyRepr {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(flatten)]
    rules: PolicyRules,
}

impl TryFrom<PolicyRepr> for Policy {
    type Error = PolicyError;

    fn try_from(repr: PolicyRepr) -> Result<Self, Self::Error> {
        Policy::new(repr.meta, repr.rules)
    }
}

impl From<Policy> for PolicyRepr {
    fn from(policy: Policy) -> Self {
        PolicyRepr {
            meta: policy.meta,
            rules: policy.rules,
        }
    }
}

impl Policy {
    /// Validate `rules` and build a policy.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InconsistentPolicy`] naming the first param
    /// that breaks an invariant.
    pub fn new(meta: DocumentMeta, rules: PolicyRules) -> PolicyResult<Self> {
        check_invariants(&meta, &rules)?;
        Ok(Self { meta, rules })
    }

    pub fn meta(&self) -> &DocumentMeta {
        &self.meta
    }

    pub fn rules(&self) -> &PolicyRules {
        &self.rules
    }

    pub fn target(&self) -> &Target {
        &self.meta.target
    }

    /// Allowed values for `param`; the universal set when unrestricted.
    pub fn allowed(&self, param: &Param) -> Values {
        self.rules.allowed.get(param).cloned().unwrap_or(ALL_VALUES)
    }

    /// Blocked values for `param`; the empty set when nothing is blocked.
    pub fn blocked(&self, param: &Param) -> Values {
        self.rules.blocked.get(param).cloned().unwrap_or(NO_VALUES)
    }

    pub fn enforced(&self, param: &Param) -> Option<&Value> {
        self.rules.enforced.get(param)
    }

    pub fn enforcements(&self) -> &BTreeMap<Param, Value> {
        &self.rules.enforced
    }

    pub fn required(&self) -> &BTreeSet<Param> {
        &self.rules.required
    }

    pub fn possible(&self) -> &BTreeSet<Param> {
        &self.rules.possible
    }

    /// Every param this policy says something about, excluding `possible`.
    pub fn params(&self) -> BTreeSet<Param> {
        self.rules.params()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Same policy relocated to `namespace`. Rules are untouched.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.meta.namespace = namespace;
        self
    }

    /// Combine two policies for the same target.
    ///
    /// `possible` is unrestricted if either side leaves it unrestricted and
    /// is otherwise the union of both sides. This widens where the other
    /// fields narrow.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::TargetMismatch`] if the targets differ; use
    ///   [`Policy::combine_with`] to aggregate across targets.
    /// - [`PolicyError::ConflictingEnforcement`] if both sides enforce
    ///   different values for one param.
    /// - [`PolicyError::InconsistentPolicy`] if the result breaks an invariant.
    pub fn combine(&self, other: &Policy) -> PolicyResult<Policy> {
        self.ensure_same_target(other)?;
        debug!(
            target_name = %self.target(),
            left = %self.meta.proper_name(),
            right = %other.meta.proper_name(),
            "combining policies"
        );
        let (a, b) = (&self.rules, &other.rules);

        let allowed = a
            .allowed
            .keys()
            .chain(b.allowed.keys())
            .map(|p| (p.clone(), self.allowed(p).intersect(&other.allowed(p))))
            .collect();

        let blocked = a
            .blocked
            .keys()
            .chain(b.blocked.keys())
            .map(|p| (p.clone(), self.blocked(p).union(&other.blocked(p))))
            .collect();

        let mut enforced = a.enforced.clone();
        for (param, value) in &b.enforced {
            match enforced.get(param) {
                Some(first) if first != value => {
                    return Err(PolicyError::ConflictingEnforcement {
                        param: param.clone(),
                        first: first.clone(),
                        second: value.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    enforced.insert(param.clone(), value.clone());
                }
            }
        }

        let required = a.required.union(&b.required).cloned().collect();

        let possible = if a.possible.is_empty() || b.possible.is_empty() {
            BTreeSet::new()
        } else {
            a.possible.union(&b.possible).cloned().collect()
        };

        Policy::new(
            DocumentMeta::derived(&self.meta, "+", &other.meta),
            PolicyRules {
                allowed,
                blocked,
                enforced,
                required,
                possible,
            },
        )
    }

    /// Widen this policy by an allowed-only exemption for the same target.
    ///
    /// Params absent from this policy's `allowed` stay absent: they are
    /// already unrestricted.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::InvalidExemption`] if `exemption` sets anything but a
    ///   non-empty `allowed`.
    /// - [`PolicyError::TargetMismatch`] if the targets differ; use
    ///   [`Policy::exempt_with`] to let a foreign exemption pass through.
    pub fn exempt(&self, exemption: &Policy) -> PolicyResult<Policy> {
        exemption.ensure_exemption()?;
        self.ensure_same_target(exemption)?;
        debug!(
            target_name = %self.target(),
            policy = %self.meta.proper_name(),
            exemption = %exemption.meta.proper_name(),
            "applying exemption"
        );
        let exempted = &exemption.rules.allowed;

        let allowed = self
            .rules
            .allowed
            .iter()
            .map(|(p, values)| match exempted.get(p) {
                Some(extra) => (p.clone(), values.union(extra)),
                None => (p.clone(), values.clone()),
            })
            .collect();

        let blocked = self
            .rules
            .blocked
            .iter()
            .filter_map(|(p, values)| {
                let rest = match exempted.get(p) {
                    Some(extra) => values.difference(extra),
                    None => values.clone(),
                };
                (!rest.is_empty()).then(|| (p.clone(), rest))
            })
            .collect();

        let enforced = self
            .rules
            .enforced
            .iter()
            .filter(|(p, v)| !exempted.get(*p).is_some_and(|extra| extra.contains(v)))
            .map(|(p, v)| (p.clone(), v.clone()))
            .collect();

        let required = self
            .rules
            .required
            .iter()
            .filter(|p| !exempted.contains_key(*p))
            .cloned()
            .collect();

        let possible = if self.rules.possible.is_empty() {
            BTreeSet::new()
        } else {
            self.rules
                .possible
                .iter()
                .chain(exempted.keys())
                .cloned()
                .collect()
        };

        Policy::new(
            DocumentMeta::derived(&self.meta, "-", &exemption.meta),
            PolicyRules {
                allowed,
                blocked,
                enforced,
                required,
                possible,
            },
        )
    }

    /// Combine with a policy for any target.
    ///
    /// Same-target operands collapse into one combined policy; different
    /// targets yield a two-target effective policy.
    pub fn combine_with(&self, other: &Policy) -> PolicyResult<EffectivePolicy> {
        EffectivePolicy::from_policy(self.clone())
            .combine(&EffectivePolicy::from_policy(other.clone()))
    }

    /// Exempt with a policy for any target. An exemption for another target
    /// leaves this policy unchanged.
    pub fn exempt_with(&self, exemption: &Policy) -> PolicyResult<EffectivePolicy> {
        EffectivePolicy::from_policy(self.clone())
            .exempt(&EffectivePolicy::from_policy(exemption.clone()))
    }

    /// Every way `assignment` breaks this policy, in param order.
    ///
    /// Never fails; an empty list means the assignment is valid.
    pub fn violations(&self, assignment: &Assignment) -> Vec<String> {
        let mut out = Vec::new();
        for (param, value) in assignment {
            if let Some(allowed) = self.rules.allowed.get(param) {
                if !allowed.contains(value) {
                    out.push(format!(
                        "\"{param}\"=\"{value}\" not allowed, allowed values are: {allowed}"
                    ));
                }
            }
            if let Some(blocked) = self.rules.blocked.get(param) {
                if blocked.contains(value) {
                    out.push(format!(
                        "\"{param}\"=\"{value}\" is blocked, blocked values are: {blocked}"
                    ));
                }
            }
            if let Some(enforced) = self.rules.enforced.get(param) {
                if enforced != value {
                    out.push(format!(
                        "\"{param}\"=\"{value}\" is enforced to be \"{enforced}\""
                    ));
                }
            }
            if !self.rules.possible.is_empty() && !self.rules.possible.contains(param) {
                out.push(format!(
                    "param \"{param}\" is not possible, possible params are: {}",
                    bracketed(&self.rules.possible)
                ));
            }
        }
        for param in &self.rules.required {
            if !assignment.contains_key(param) {
                out.push(format!(
                    "required param \"{param}\" is missing, required params are: {}",
                    bracketed(&self.rules.required)
                ));
            }
        }
        out
    }

    /// True if `assignment` has no violations.
    pub fn validate(&self, assignment: &Assignment) -> bool {
        self.violations(assignment).is_empty()
    }

    fn ensure_same_target(&self, other: &Policy) -> PolicyResult<()> {
        if self.target() == other.target() {
            Ok(())
        } else {
            Err(PolicyError::TargetMismatch {
                left: self.target().clone(),
                right: other.target().clone(),
            })
        }
    }

    /// Fails with [`PolicyError::InvalidExemption`] unless this policy sets
    /// only a non-empty `allowed`.
    pub(crate) fn ensure_exemption(&self) -> PolicyResult<()> {
        let fields = self.rules.exemption_offences();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(PolicyError::InvalidExemption {
                exemption: self.meta.proper_name(),
                fields,
            })
        }
    }
}

fn check_invariants(meta: &DocumentMeta, rules: &PolicyRules) -> PolicyResult<()> {
    let inconsistent = |param: &Param, rule: String| PolicyError::InconsistentPolicy {
        policy: meta.proper_name(),
        target: meta.target.clone(),
        param: param.clone(),
        rule,
    };

    if !rules.possible.is_empty() {
        if let Some(param) = rules.params().into_iter().find(|p| !rules.possible.contains(p)) {
            let rule = format!(
                "param is not among the possible params {}",
                bracketed(&rules.possible)
            );
            return Err(inconsistent(&param, rule));
        }
    }

    for (param, allowed) in &rules.allowed {
        if allowed.is_all() {
            continue;
        }
        if let Some(blocked) = rules.blocked.get(param) {
            let overlap = allowed.intersect(blocked);
            if !overlap.is_empty() {
                return Err(inconsistent(
                    param,
                    format!("allowed values {overlap} are also blocked"),
                ));
            }
        }
    }

    for (param, value) in &rules.enforced {
        if !value.is_scalar() {
            return Err(inconsistent(
                param,
                format!("enforced value {value} is not a concrete value"),
            ));
        }
        if let Some(allowed) = rules.allowed.get(param) {
            if !allowed.contains(value) {
                return Err(inconsistent(
                    param,
                    format!("enforced value \"{value}\" is not allowed, allowed values are: {allowed}"),
                ));
            }
        }
        if let Some(blocked) = rules.blocked.get(param) {
            if blocked.contains(value) {
                return Err(inconsistent(
                    param,
                    format!("enforced value \"{value}\" is blocked, blocked values are: {blocked}"),
                ));
            }
        }
    }

    Ok(())
}

fn bracketed<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    let parts: Vec<String> = items.into_iter().map(|i| i.to_string()).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Param {
        Param::new(name).unwrap()
    }

    fn meta(name: &str) -> DocumentMeta {
        DocumentMeta::new(name, Target::new("target1").unwrap())
    }

    fn policy(name: &str, rules: PolicyRules) -> Policy {
        Policy::new(meta(name), rules).unwrap()
    }

    fn assignment(pairs: &[(&str, Value)]) -> Assignment {
        pairs.iter().map(|(k, v)| (p(k), v.clone())).collect()
    }

    #[test]
    fn enforced_outside_allowed_is_inconsistent() {
        let rules = PolicyRules::new()
            .allow(p("param1"), Values::of(["w"]))
            .enforce(p("param1"), "v");
        let err = Policy::new(meta("bad"), rules).unwrap_err();
        match err {
            PolicyError::InconsistentPolicy { param, .. } => assert_eq!(param, p("param1")),
            other => panic!("expected InconsistentPolicy, got {other:?}"),
        }
    }

    #[test]
    fn enforced_blocked_value_is_inconsistent() {
        let rules = PolicyRules::new()
            .block(p("param1"), Values::of(["v"]))
            .enforce(p("param1"), "v");
        assert!(matches!(
            Policy::new(meta("bad"), rules),
            Err(PolicyError::InconsistentPolicy { .. })
        ));
    }

    #[test]
    fn allowed_overlapping_blocked_is_inconsistent() {
        let rules = PolicyRules::new()
            .allow(p("param1"), Values::of(["a", "b"]))
            .block(p("param1"), Values::of(["b"]));
        let err = Policy::new(meta("bad"), rules).unwrap_err();
        assert!(err.to_string().contains("[b] are also blocked"), "{err}");
    }

    #[test]
    fn universal_allowed_with_blocked_is_consistent() {
        let rules = PolicyRules::new()
            .allow(p("param1"), ALL_VALUES)
            .block(p("param1"), Values::of(["b"]));
        assert!(Policy::new(meta("ok"), rules).is_ok());
    }

    #[test]
    fn markers_cannot_be_enforced() {
        let rules = PolicyRules::new().enforce(p("param1"), Value::Any);
        assert!(Policy::new(meta("bad"), rules).is_err());
    }

    #[test]
    fn params_outside_possible_are_inconsistent() {
        let rules = PolicyRules::new()
            .possible_param(p("a"))
            .require(p("b"));
        let err = Policy::new(meta("bad"), rules).unwrap_err();
        assert!(matches!(err, PolicyError::InconsistentPolicy { ref param, .. } if *param == p("b")));
    }

    #[test]
    fn violations_report_every_problem() {
        let pol = policy(
            "strict",
            PolicyRules::new()
                .allow(p("tls"), Values::of(["on", "strict"]))
                .block(p("mode"), Values::of(["debug"]))
                .enforce(p("tls"), "strict")
                .require(p("region"))
                .possible_param(p("tls"))
                .possible_param(p("mode"))
                .possible_param(p("region")),
        );
        let v = pol.violations(&assignment(&[
            ("tls", Value::from("off")),
            ("mode", Value::from("debug")),
            ("extra", Value::from(true)),
        ]));
        assert_eq!(v.len(), 5, "{v:#?}");
        assert!(v[0].starts_with("param \"extra\" is not possible"));
        assert_eq!(v[1], "\"mode\"=\"debug\" is blocked, blocked values are: [debug]");
        assert_eq!(
            v[2],
            "\"tls\"=\"off\" not allowed, allowed values are: [on, strict]"
        );
        assert_eq!(v[3], "\"tls\"=\"off\" is enforced to be \"strict\"");
        assert!(v[4].starts_with("required param \"region\" is missing"));
    }

    #[test]
    fn valid_assignment_has_no_violations() {
        let pol = policy(
            "p",
            PolicyRules::new().allow(p("param1"), Values::of(["val1", "val2"])),
        );
        assert!(pol.validate(&assignment(&[("param1", Value::from("val2"))])));
        assert!(pol.validate(&assignment(&[("other", Value::Int(3))])));
    }

    #[test]
    fn combine_narrows_allowed_and_widens_blocked() {
        let a = policy(
            "A",
            PolicyRules::new().allow(p("param1"), Values::of(["val1", "val2"])),
        );
        let b = policy(
            "B",
            PolicyRules::new()
                .allow(p("param1"), Values::of(["val2"]))
                .block(p("param1"), Values::of(["val1"])),
        );
        let c = a.combine(&b).unwrap();
        assert_eq!(c.allowed(&p("param1")), Values::of(["val2"]));
        assert_eq!(c.blocked(&p("param1")), Values::of(["val1"]));
        assert_eq!(c.meta().name, "A (+) B");
    }

    #[test]
    fn combine_rejects_conflicting_enforcement() {
        let a = policy("A", PolicyRules::new().enforce(p("tls"), "on"));
        let b = policy("B", PolicyRules::new().enforce(p("tls"), "off"));
        assert!(matches!(
            a.combine(&b),
            Err(PolicyError::ConflictingEnforcement { .. })
        ));
        let same = policy("C", PolicyRules::new().enforce(p("tls"), "on"));
        assert_eq!(a.combine(&same).unwrap().enforced(&p("tls")), Some(&Value::from("on")));
    }

    #[test]
    fn combine_rejects_different_targets() {
        let a = policy("A", PolicyRules::new());
        let b = Policy::new(
            DocumentMeta::new("B", Target::new("other").unwrap()),
            PolicyRules::new(),
        )
        .unwrap();
        assert!(matches!(a.combine(&b), Err(PolicyError::TargetMismatch { .. })));
        let effective = a.combine_with(&b).unwrap();
        assert_eq!(effective.len(), 2);
    }

    #[test]
    fn exempt_widens_allowed() {
        let pol = policy(
            "P",
            PolicyRules::new().allow(p("param1"), Values::of(["val1"])),
        );
        let ex = policy(
            "E",
            PolicyRules::new().allow(p("param1"), Values::of(["val0"])),
        );
        let out = pol.exempt(&ex).unwrap();
        assert_eq!(out.allowed(&p("param1")), Values::of(["val0", "val1"]));
        assert_eq!(out.meta().name, "P (-) E");
    }

    #[test]
    fn exempt_lifts_block_enforcement_and_requirement() {
        let pol = policy(
            "P",
            PolicyRules::new()
                .block(p("mode"), Values::of(["debug", "trace"]))
                .enforce(p("tls"), "on")
                .require(p("tls")),
        );
        let ex = policy(
            "E",
            PolicyRules::new()
                .allow(p("mode"), Values::of(["debug"]))
                .allow(p("tls"), Values::of(["on"])),
        );
        let out = pol.exempt(&ex).unwrap();
        assert_eq!(out.blocked(&p("mode")), Values::of(["trace"]));
        assert!(out.enforced(&p("tls")).is_none());
        assert!(out.required().is_empty());
        assert!(out.rules().allowed.is_empty());
    }

    #[test]
    fn exempting_a_universal_block_keeps_the_rest_blocked() {
        let pol = policy("P", PolicyRules::new().block(p("mode"), ALL_VALUES));
        let ex = policy(
            "E",
            PolicyRules::new().allow(p("mode"), Values::of(["debug"])),
        );
        let out = pol.exempt(&ex).unwrap();
        let blocked = out.blocked(&p("mode"));
        assert!(!blocked.contains(&Value::from("debug")));
        assert!(blocked.contains(&Value::from("release")));

        assert!(out.validate(&assignment(&[("mode", Value::from("debug"))])));
        assert_eq!(
            out.violations(&assignment(&[("mode", Value::from("release"))])),
            vec!["\"mode\"=\"release\" is blocked, blocked values are: Any except [debug]".to_string()]
        );
    }

    #[test]
    fn exemption_must_be_allowed_only() {
        let pol = policy("P", PolicyRules::new());
        let ex = policy(
            "E",
            PolicyRules::new()
                .allow(p("a"), Values::of(["x"]))
                .require(p("a")),
        );
        match pol.exempt(&ex) {
            Err(PolicyError::InvalidExemption { fields, .. }) => assert_eq!(fields, vec!["required"]),
            other => panic!("expected InvalidExemption, got {other:?}"),
        }
        let empty = policy("E2", PolicyRules::new());
        assert!(matches!(
            pol.exempt_with(&empty),
            Err(PolicyError::InvalidExemption { .. })
        ));
    }

    #[test]
    fn params_and_emptiness() {
        let pol = policy(
            "P",
            PolicyRules::new()
                .allow(p("a"), Values::of(["x"]))
                .enforce(p("b"), 1)
                .require(p("c")),
        );
        let params = pol.params();
        let names: Vec<&str> = params.iter().map(|p| p.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(!pol.is_empty());
        assert!(policy("E", PolicyRules::new()).is_empty());
    }

    #[test]
    fn serde_roundtrip_validates() {
        let pol = policy(
            "P",
            PolicyRules::new()
                .allow(p("a"), Values::of(["x", "y"]))
                .block(p("b"), ALL_VALUES)
                .enforce(p("a"), "x"),
        );
        let json = serde_json::to_value(&pol).unwrap();
        assert_eq!(json["target"], "target1");
        assert_eq!(json["blocked"]["b"], serde_json::json!([{"marker": "any"}]));
        let back: Policy = serde_json::from_value(json).unwrap();
        assert_eq!(back, pol);

        let bad = serde_json::json!({
            "name": "bad", "target": "t",
            "allowed": {"a": ["x"]}, "enforced": {"a": "y"}
        });
        assert!(serde_json::from_value::<Policy>(bad).is_err());
    }
}
