//! Creation of empty documents with placeholder headers.

use std::path::{Path, PathBuf};

use tracing::info;

use cnorm_core::{DocumentId, Namespace, Param, Target, Timestamp, Value, Values};
use cnorm_policy::{
    Config, Document, DocumentKind, DocumentMeta, ParamDocument, Policy, PolicyRules, PolicySet,
    TargetAssignment, TargetDocument, ValueDocument, ValuesDocument,
};

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

/// A freshly written empty document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    /// Path relative to the repository root.
    pub path: PathBuf,
    pub id: DocumentId,
}

fn placeholder(field: &str) -> String {
    format!("replace with {field} value")
}

/// An empty document of `kind` placed in `namespace`.
pub fn empty_document(kind: DocumentKind, namespace: Namespace) -> RepoResult<Document> {
    let meta = DocumentMeta::new(placeholder("name"), Target::new(placeholder("target"))?)
        .with_version(placeholder("version"))
        .with_doc(placeholder("doc"))
        .with_namespace(namespace);
    let document = match kind {
        DocumentKind::Policy => Document::Policy(Policy::new(meta, PolicyRules::new())?),
        DocumentKind::PolicySet => Document::PolicySet(PolicySet::new(meta, Vec::new(), Vec::new())),
        DocumentKind::Config => Document::Config(Config::new(meta, TargetAssignment::new(), None)),
        DocumentKind::Target => Document::Target(TargetDocument::new(meta)),
        DocumentKind::Param => {
            Document::Param(ParamDocument::new(meta, Param::new(placeholder("param"))?))
        }
        DocumentKind::Value => {
            Document::Value(ValueDocument::new(meta, Value::from(placeholder("value"))))
        }
        DocumentKind::Values => Document::Values(ValuesDocument::new(meta, Values::none())),
    };
    Ok(document)
}

impl Repository {
    /// Write an empty document of `kind` into `dir`, which must lie inside
    /// the repository.
    ///
    /// The file is named `<Kind>_<unix seconds>.<extension>`; creating two
    /// documents of one kind in the same directory within a second fails
    /// with [`RepoError::AlreadyExists`].
    pub fn create(&self, kind: DocumentKind, dir: &Path) -> RepoResult<Created> {
        let relative_dir = self.relative_dir(dir)?;
        let document = empty_document(kind, Namespace::from_relative_dir(&relative_dir))?;
        let file_name = format!(
            "{}_{}.{}",
            kind,
            Timestamp::now().epoch_secs(),
            self.config().extension
        );
        let path = self.root().join(&relative_dir).join(file_name);
        let id = self.store().write_new(&path, &document)?;
        let relative = relative_dir.join(path.file_name().unwrap_or_default());
        info!(path = %relative.display(), %id, %kind, "created document");
        Ok(Created { path: relative, id })
    }

    /// `dir` relative to the root, after resolving links and `..`.
    fn relative_dir(&self, dir: &Path) -> RepoResult<PathBuf> {
        let canonical = |p: &Path| {
            p.canonicalize().map_err(|source| RepoError::Io {
                path: p.to_path_buf(),
                source,
            })
        };
        let root = canonical(self.root())?;
        let dir = canonical(dir)?;
        match dir.strip_prefix(&root) {
            Ok(relative) => Ok(relative.to_path_buf()),
            Err(_) => Err(RepoError::OutsideRepository { path: dir, root }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_an_empty_form() {
        for kind in DocumentKind::ALL {
            let doc = empty_document(kind, Namespace::default()).unwrap();
            assert_eq!(doc.kind(), kind);
            assert_eq!(doc.meta().name, "replace with name value");
        }
    }

    #[test]
    fn containers_start_empty() {
        for kind in [
            DocumentKind::Policy,
            DocumentKind::PolicySet,
            DocumentKind::Config,
            DocumentKind::Values,
        ] {
            assert!(empty_document(kind, Namespace::default()).unwrap().is_empty());
        }
    }
}
