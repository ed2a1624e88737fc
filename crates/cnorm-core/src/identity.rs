//! # Identity Newtypes
//!
//! `Target`, `Param`, `Namespace` and `DocumentId` are distinct types so a
//! param name can never be handed to something expecting a document identity.
//!
//! A `Target` compares by name only: two references to the same system with
//! different locators are the same target.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::digest::ContentDigest;
use crate::error::CoreError;

/// The system or component a policy or configuration applies to.
///
/// Serialized as a bare string when it carries no locator, otherwise as
/// `{"name": ..., "uri": ...}`. Equality, ordering and hashing use the name
/// only.
#[derive(Debug, Clone)]
pub struct Target {
    name: String,
    uri: Option<String>,
}

impl Target {
    /// Create a target with no locator.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidIdentifier {
                kind: "target",
                value: name,
                reason: "must not be empty".into(),
            });
        }
        Ok(Self { name, uri: None })
    }

    /// Create a target with an `https` locator.
    pub fn with_uri(name: impl Into<String>, uri: impl Into<String>) -> Result<Self, CoreError> {
        let mut target = Self::new(name)?;
        let uri = uri.into();
        if uri.split(':').next() != Some("https") {
            return Err(CoreError::InvalidIdentifier {
                kind: "target uri",
                value: uri,
                reason: "locator must use the https scheme".into(),
            });
        }
        target.uri = Some(uri);
        Ok(target)
    }

    /// The display name, which is also the identity of the target.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The optional locator.
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl PartialEq for Target {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Target {}

impl Hash for Target {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Target {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Target {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for Target {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.uri {
            None => serializer.serialize_str(&self.name),
            Some(uri) => {
                let mut s = serializer.serialize_struct("Target", 2)?;
                s.serialize_field("name", &self.name)?;
                s.serialize_field("uri", uri)?;
                s.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TargetVisitor;

        impl<'de> Visitor<'de> for TargetVisitor {
            type Value = Target;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a target name or an object with `name` and optional `uri`")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Target, E> {
                Target::new(v).map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Target, A::Error> {
                let mut name: Option<String> = None;
                let mut uri: Option<String> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "name" => name = Some(map.next_value()?),
                        "uri" => uri = map.next_value()?,
                        other => return Err(de::Error::unknown_field(other, &["name", "uri"])),
                    }
                }
                let name = name.ok_or_else(|| de::Error::missing_field("name"))?;
                match uri {
                    Some(uri) => Target::with_uri(name, uri).map_err(de::Error::custom),
                    None => Target::new(name).map_err(de::Error::custom),
                }
            }
        }

        deserializer.deserialize_any(TargetVisitor)
    }
}

/// A named configuration parameter within a target's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Param(String);

impl Param {
    /// Create a param name. Names are non-empty and carry no surrounding whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();
        if name.is_empty() || name.trim() != name {
            return Err(CoreError::InvalidIdentifier {
                kind: "param",
                value: name,
                reason: "must be non-empty without surrounding whitespace".into(),
            });
        }
        Ok(Self(name))
    }

    /// The param name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Param {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Param> for String {
    fn from(param: Param) -> Self {
        param.0
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dotted namespace derived from a document's storage location.
///
/// A document at `<root>/org/team/policy.json` lives in namespace
/// `org.team`; a document at the root lives in the empty namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Wrap a dotted namespace string as-is.
    pub fn new(ns: impl Into<String>) -> Self {
        Self(ns.into())
    }

    /// Derive the namespace of a directory given relative to the repository root.
    pub fn from_relative_dir(dir: &Path) -> Self {
        let parts: Vec<String> = dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self(parts.join("."))
    }

    /// The dotted form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for documents stored at the repository root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle naming a document by its canonical content hash.
///
/// Composed as `<namespace>:<sha256 hex>`, or the bare hex for documents at
/// the repository root. References between documents are plain identity
/// strings, so any string may be wrapped; only [`DocumentId::compose`]
/// produces identities that a repository will actually hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an identity string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the identity for a digest in a namespace.
    pub fn compose(namespace: &Namespace, digest: &ContentDigest) -> Self {
        if namespace.is_root() {
            Self(digest.to_hex())
        } else {
            Self(format!("{}:{}", namespace, digest.to_hex()))
        }
    }

    /// The identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn target_equality_ignores_uri() {
        let a = Target::new("billing").unwrap();
        let b = Target::with_uri("billing", "https://billing.example.com").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn target_rejects_empty_name_and_non_https_uri() {
        assert!(Target::new("  ").is_err());
        assert!(Target::with_uri("db", "http://db.example.com").is_err());
    }

    #[test]
    fn target_serializes_bare_name_without_uri() {
        let t = Target::new("web").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), r#""web""#);
    }

    #[test]
    fn target_roundtrips_with_uri() {
        let t = Target::with_uri("web", "https://web.example.com").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(back.uri(), Some("https://web.example.com"));
    }

    #[test]
    fn target_works_as_json_map_key() {
        let mut m = BTreeMap::new();
        m.insert(Target::new("t1").unwrap(), 1);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"{"t1":1}"#);
        let back: BTreeMap<Target, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn param_rejects_padded_names() {
        assert!(Param::new("").is_err());
        assert!(Param::new(" p").is_err());
        assert_eq!(Param::new("p1").unwrap().as_str(), "p1");
        assert!(serde_json::from_str::<Param>(r#""""#).is_err());
    }

    #[test]
    fn namespace_from_nested_dir() {
        let ns = Namespace::from_relative_dir(&PathBuf::from("org/team"));
        assert_eq!(ns.as_str(), "org.team");
        assert!(Namespace::from_relative_dir(Path::new("")).is_root());
    }

    #[test]
    fn document_id_compose() {
        let digest = ContentDigest::new([0u8; 32]);
        let root = DocumentId::compose(&Namespace::default(), &digest);
        assert_eq!(root.as_str(), "0".repeat(64));
        let scoped = DocumentId::compose(&Namespace::new("org"), &digest);
        assert_eq!(scoped.as_str(), format!("org:{}", "0".repeat(64)));
    }
}
