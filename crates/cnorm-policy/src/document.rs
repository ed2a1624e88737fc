//! # Documents
//!
//! The closed set of document kinds and their stored form.
//!
//! ## Wire form
//!
//! Every document is one JSON object. A `"type"` field selects the kind;
//! the header fields (`name`, `version`, `doc`, `target`, `namespace`) sit
//! beside the kind's own fields. Stored documents also carry:
//!
//! - `id`: the identity computed when the document was last written,
//! - `ts`: the UTC write time.
//!
//! ## Identity
//!
//! The identity is the SHA-256 digest of the JCS-canonical form of the
//! document with `doc`, `id` and `ts` removed, composed with the namespace.
//! Two documents with the same normative content and the same naming
//! coordinates always share an identity; free text never changes it.
//!
//! Decoding happens in two steps so callers can tell a malformed file
//! ([`PolicyError::Decode`]) from a well-formed but inconsistent policy
//! ([`PolicyError::InconsistentPolicy`]).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use cnorm_core::{
    sha256_digest, CanonicalBytes, CanonicalizationError, CoreError, DocumentId, Namespace, Param,
    Timestamp, Value, Values,
};

use crate::config::Config;
use crate::error::{PolicyError, PolicyResult};
use crate::meta::DocumentMeta;
use crate::policy::{Policy, PolicyRules};
use crate::policy_set::PolicySet;

/// Top-level fields that never influence identity.
const IDENTITY_EXCLUDED: &[&str] = &["doc", "id", "ts"];

/// The kinds of document a repository can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    Policy,
    PolicySet,
    Config,
    Target,
    Param,
    Value,
    Values,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 7] = [
        DocumentKind::Policy,
        DocumentKind::PolicySet,
        DocumentKind::Config,
        DocumentKind::Target,
        DocumentKind::Param,
        DocumentKind::Value,
        DocumentKind::Values,
    ];

    /// The `"type"` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Policy => "Policy",
            DocumentKind::PolicySet => "PolicySet",
            DocumentKind::Config => "Config",
            DocumentKind::Target => "Target",
            DocumentKind::Param => "Param",
            DocumentKind::Value => "Value",
            DocumentKind::Values => "Values",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = CoreError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::InvalidIdentifier {
                kind: "document kind",
                value: s.to_string(),
                reason: "expected one of Policy, PolicySet, Config, Target, Param, Value, Values"
                    .into(),
            })
    }
}

/// A named target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
}

impl TargetDocument {
    pub fn new(meta: DocumentMeta) -> Self {
        Self { meta }
    }
}

/// A named param declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub param: Param,
}

impl ParamDocument {
    pub fn new(meta: DocumentMeta, param: Param) -> Self {
        Self { meta, param }
    }
}

/// A single named value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    pub value: Value,
}

impl ValueDocument {
    pub fn new(meta: DocumentMeta, value: Value) -> Self {
        Self { meta, value }
    }
}

/// A named set of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuesDocument {
    #[serde(flatten)]
    pub meta: DocumentMeta,
    #[serde(default)]
    pub values: Values,
}

impl ValuesDocument {
    pub fn new(meta: DocumentMeta, values: Values) -> Self {
        Self { meta, values }
    }
}

/// Any document a repository can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Document {
    Policy(Policy),
    PolicySet(PolicySet),
    Config(Config),
    Target(TargetDocument),
    Param(ParamDocument),
    Value(ValueDocument),
    Values(ValuesDocument),
}

/// Decoded but not yet validated.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawDocument {
    Policy(RawPolicy),
    PolicySet(PolicySet),
    Config(Config),
    Target(TargetDocument),
    Param(ParamDocument),
    Value(ValueDocument),
    Values(ValuesDocument),
}

#[derive(Deserialize)]
struct RawPolicy {
    #[serde(flatten)]
    meta: DocumentMeta,
    #[serde(flatten)]
    rules: PolicyRules,
}

impl TryFrom<RawDocument> for Document {
    type Error = PolicyError;

    fn try_from(raw: RawDocument) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawDocument::Policy(RawPolicy { meta, rules }) => {
                Document::Policy(Policy::new(meta, rules)?)
            }
            RawDocument::PolicySet(set) => Document::PolicySet(set),
            RawDocument::Config(config) => Document::Config(config),
            RawDocument::Target(target) => Document::Target(target),
            RawDocument::Param(param) => Document::Param(param),
            RawDocument::Value(value) => Document::Value(value),
            RawDocument::Values(values) => Document::Values(values),
        })
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDocument::deserialize(deserializer)?;
        Document::try_from(raw).map_err(de::Error::custom)
    }
}

impl Document {
    pub fn meta(&self) -> &DocumentMeta {
        match self {
            Document::Policy(p) => p.meta(),
            Document::PolicySet(s) => s.meta(),
            Document::Config(c) => c.meta(),
            Document::Target(t) => &t.meta,
            Document::Param(p) => &p.meta,
            Document::Value(v) => &v.meta,
            Document::Values(v) => &v.meta,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Policy(_) => DocumentKind::Policy,
            Document::PolicySet(_) => DocumentKind::PolicySet,
            Document::Config(_) => DocumentKind::Config,
            Document::Target(_) => DocumentKind::Target,
            Document::Param(_) => DocumentKind::Param,
            Document::Value(_) => DocumentKind::Value,
            Document::Values(_) => DocumentKind::Values,
        }
    }

    pub fn proper_name(&self) -> String {
        self.meta().proper_name()
    }

    /// Canonical identity computed from current content.
    pub fn id(&self) -> PolicyResult<DocumentId> {
        let canonical = CanonicalBytes::without_fields(self, IDENTITY_EXCLUDED)?;
        Ok(DocumentId::compose(
            &self.meta().namespace,
            &sha256_digest(&canonical),
        ))
    }

    /// True for documents that carry no content beyond their header.
    ///
    /// Targets, params and single values are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Policy(p) => p.is_empty(),
            Document::PolicySet(s) => s.is_empty(),
            Document::Config(c) => c.is_empty(),
            Document::Values(v) => v.values.is_empty(),
            Document::Target(_) | Document::Param(_) | Document::Value(_) => false,
        }
    }

    /// The same document placed in `namespace`.
    pub fn with_namespace(self, namespace: Namespace) -> Self {
        match self {
            Document::Policy(p) => Document::Policy(p.with_namespace(namespace)),
            Document::PolicySet(s) => Document::PolicySet(s.with_namespace(namespace)),
            Document::Config(c) => Document::Config(c.with_namespace(namespace)),
            Document::Target(mut t) => {
                t.meta.namespace = namespace;
                Document::Target(t)
            }
            Document::Param(mut p) => {
                p.meta.namespace = namespace;
                Document::Param(p)
            }
            Document::Value(mut v) => {
                v.meta.namespace = namespace;
                Document::Value(v)
            }
            Document::Values(mut v) => {
                v.meta.namespace = namespace;
                Document::Values(v)
            }
        }
    }

    /// Identities this document refers to.
    pub fn references(&self) -> Vec<&DocumentId> {
        match self {
            Document::PolicySet(s) => s.references().collect(),
            Document::Config(c) => c.references().collect(),
            _ => Vec::new(),
        }
    }

    /// Copy with references rewritten through `renamed`, or `None` if no
    /// reference changed.
    pub fn substitute_references(
        &self,
        renamed: &HashMap<DocumentId, DocumentId>,
    ) -> Option<Document> {
        match self {
            Document::PolicySet(s) => s.substitute(renamed).map(Document::PolicySet),
            Document::Config(c) => c.substitute(renamed).map(Document::Config),
            _ => None,
        }
    }

    pub fn as_policy(&self) -> Option<&Policy> {
        match self {
            Document::Policy(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_policy_set(&self) -> Option<&PolicySet> {
        match self {
            Document::PolicySet(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Document::Config(c) => Some(c),
            _ => None,
        }
    }
}

/// A document together with the bookkeeping fields found next to it in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub document: Document,
    /// The `id` recorded at the last write, if any.
    pub recorded_id: Option<DocumentId>,
    /// The `ts` recorded at the last write, if it parsed.
    pub written_at: Option<Timestamp>,
}

impl StoredDocument {
    /// Decode a stored JSON object.
    ///
    /// # Errors
    ///
    /// - [`PolicyError::Decode`] if the object does not describe a document
    ///   of its declared kind.
    /// - [`PolicyError::InconsistentPolicy`] if it describes an inconsistent policy.
    pub fn from_json(mut value: serde_json::Value) -> PolicyResult<Self> {
        let (recorded_id, written_at) = match value.as_object_mut() {
            Some(map) => {
                let id = map
                    .remove("id")
                    .and_then(|v| v.as_str().map(DocumentId::new));
                let ts = map
                    .remove("ts")
                    .and_then(|v| v.as_str().and_then(|s| Timestamp::parse(s).ok()));
                (id, ts)
            }
            None => (None, None),
        };
        let raw: RawDocument = serde_json::from_value(value).map_err(PolicyError::Decode)?;
        Ok(Self {
            document: Document::try_from(raw)?,
            recorded_id,
            written_at,
        })
    }

    /// Encode `document` for storage, stamping its current identity and `ts`.
    pub fn to_json(document: &Document, ts: Timestamp) -> PolicyResult<serde_json::Value> {
        let id = document.id()?;
        let mut value = serde_json::to_value(document)
            .map_err(|e| PolicyError::Canonicalization(CanonicalizationError::from(e)))?;
        if let Some(map) = value.as_object_mut() {
            map.insert("id".into(), serde_json::Value::String(id.to_string()));
            map.insert("ts".into(), serde_json::Value::String(ts.to_iso8601()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnorm_core::Target;
    use serde_json::json;

    fn meta(name: &str) -> DocumentMeta {
        DocumentMeta::new(name, Target::new("web").unwrap())
    }

    fn policy_doc() -> Document {
        Document::Policy(
            Policy::new(
                meta("baseline").with_version("1"),
                PolicyRules::new().allow(Param::new("tls").unwrap(), Values::of(["on"])),
            )
            .unwrap(),
        )
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("policyset".parse::<DocumentKind>().unwrap(), DocumentKind::PolicySet);
        assert_eq!("Values".parse::<DocumentKind>().unwrap(), DocumentKind::Values);
        assert!("Widget".parse::<DocumentKind>().is_err());
    }

    #[test]
    fn type_tag_selects_variant() {
        let doc = policy_doc();
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "Policy");
        assert_eq!(json["name"], "baseline");
        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn identity_ignores_doc_and_is_namespaced() {
        let doc = policy_doc();
        let id = doc.id().unwrap();
        assert_eq!(id.as_str().len(), 64);

        let Document::Policy(p) = &doc else { unreachable!() };
        let mut m = p.meta().clone();
        m.doc = "free text".into();
        let documented = Document::Policy(Policy::new(m, p.rules().clone()).unwrap());
        assert_eq!(documented.id().unwrap(), id);

        let moved = doc.clone().with_namespace(Namespace::new("org.team"));
        let moved_id = moved.id().unwrap();
        assert!(moved_id.as_str().starts_with("org.team:"));
        assert_ne!(&moved_id.as_str()[9..], id.as_str());
    }

    #[test]
    fn identity_changes_with_version() {
        let a = Document::Target(TargetDocument::new(meta("t").with_version("1")));
        let b = Document::Target(TargetDocument::new(meta("t").with_version("2")));
        assert_ne!(a.id().unwrap(), b.id().unwrap());
    }

    #[test]
    fn stored_roundtrip_keeps_bookkeeping() {
        let doc = policy_doc();
        let ts = Timestamp::parse("2026-02-01T10:00:00Z").unwrap();
        let json = StoredDocument::to_json(&doc, ts).unwrap();
        assert_eq!(json["id"], doc.id().unwrap().as_str());
        let stored = StoredDocument::from_json(json).unwrap();
        assert_eq!(stored.document, doc);
        assert_eq!(stored.recorded_id, Some(doc.id().unwrap()));
        assert_eq!(stored.written_at, Some(ts));
    }

    #[test]
    fn legacy_timestamps_are_tolerated() {
        let stored = StoredDocument::from_json(json!({
            "type": "Values", "name": "ports", "target": "web",
            "values": [80, 443], "ts": "1700000000"
        }))
        .unwrap();
        assert!(stored.written_at.is_none());
        assert!(!stored.document.is_empty());
    }

    #[test]
    fn malformed_and_inconsistent_are_distinguished() {
        let malformed = StoredDocument::from_json(json!({"type": "Policy", "target": "web"}));
        assert!(matches!(malformed, Err(PolicyError::Decode(_))));

        let unknown = StoredDocument::from_json(json!({"type": "Widget", "name": "w", "target": "web"}));
        assert!(matches!(unknown, Err(PolicyError::Decode(_))));

        let inconsistent = StoredDocument::from_json(json!({
            "type": "Policy", "name": "p", "target": "web",
            "allowed": {"tls": ["on"]}, "blocked": {"tls": ["on"]}
        }));
        assert!(matches!(inconsistent, Err(PolicyError::InconsistentPolicy { .. })));
    }

    #[test]
    fn emptiness_by_kind() {
        let empty_policy = Document::Policy(Policy::new(meta("p"), PolicyRules::new()).unwrap());
        assert!(empty_policy.is_empty());
        assert!(Document::Values(ValuesDocument::new(meta("v"), Values::none())).is_empty());
        assert!(!Document::Target(TargetDocument::new(meta("t"))).is_empty());
    }

    #[test]
    fn references_and_substitution() {
        let old = DocumentId::new("old");
        let set = Document::PolicySet(PolicySet::new(meta("s"), vec![old.clone()], vec![]));
        assert_eq!(set.references(), vec![&old]);
        let mut renamed = HashMap::new();
        renamed.insert(old, DocumentId::new("new"));
        let swapped = set.substitute_references(&renamed).unwrap();
        assert_eq!(swapped.references(), vec![&DocumentId::new("new")]);
        assert_ne!(swapped.id().unwrap(), set.id().unwrap());
        assert!(policy_doc().substitute_references(&renamed).is_none());
    }
}
