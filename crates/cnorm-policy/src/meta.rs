//! Document header shared by every document kind.

use serde::{Deserialize, Serialize};

use cnorm_core::{Namespace, Target};

/// Naming coordinates and free text carried by every document.
///
/// `(target, namespace, name, version)` scope a document's identity; `doc`
/// is free text and never influences identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub doc: String,
    pub target: Target,
    #[serde(default)]
    pub namespace: Namespace,
}

impl DocumentMeta {
    /// Header with an empty version, doc and namespace.
    pub fn new(name: impl Into<String>, target: Target) -> Self {
        Self {
            name: name.into(),
            version: String::new(),
            doc: String::new(),
            target,
            namespace: Namespace::default(),
        }
    }

    /// Builder-style version setter.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Builder-style doc setter.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Builder-style namespace setter.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// `"<name> v<version>"`, or just the name when unversioned.
    pub fn proper_name(&self) -> String {
        if self.version.is_empty() {
            self.name.clone()
        } else {
            format!("{} v{}", self.name, self.version)
        }
    }

    /// Header for the result of a binary operation such as `(+)` or `(-)`.
    ///
    /// Takes the left operand's target and namespace; names and docs are
    /// joined around the operator and the version is cleared.
    pub(crate) fn derived(left: &DocumentMeta, op: &str, right: &DocumentMeta) -> Self {
        Self {
            name: format!("{} ({op}) {}", left.proper_name(), right.proper_name()),
            version: String::new(),
            doc: format!("{} ({op}) {}", left.doc, right.doc),
            target: left.target.clone(),
            namespace: left.namespace.clone(),
        }
    }
}
