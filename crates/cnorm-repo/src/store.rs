//! # Document Store
//!
//! One JSON file per document under a root directory. The store knows how
//! to enumerate document files, read them into [`LoadedDocument`]s and write
//! documents back with their current identity stamped in.
//!
//! ## Namespace Invariant
//!
//! A document's namespace is its parent directory relative to the root,
//! with path separators replaced by dots. On read the location wins over
//! whatever `namespace` the file records; the recorded value is kept so
//! reconciliation can notice a moved file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use cnorm_core::{DocumentId, Namespace, Timestamp};
use cnorm_policy::{Document, StoredDocument};

use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};

/// A document read from storage.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    /// The document with its namespace taken from its location.
    pub document: Arc<Document>,
    /// Identity computed from current content.
    pub id: DocumentId,
    /// The `id` field found in the file.
    pub recorded_id: Option<DocumentId>,
    /// The `namespace` field found in the file.
    pub recorded_namespace: Namespace,
}

impl LoadedDocument {
    /// True if the file's bookkeeping no longer matches its content or location.
    pub fn is_stale(&self) -> bool {
        self.recorded_id.as_ref() != Some(&self.id)
            || self.recorded_namespace != self.document.meta().namespace
    }
}

/// Filesystem access for one repository root.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
    config: RepositoryConfig,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>, config: RepositoryConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Every document file under the root, in path order.
    pub fn enumerate(&self) -> RepoResult<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(RepoError::NotADirectory(self.root.clone()));
        }
        let mut files = Vec::new();
        self.walk(&self.root, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn walk(&self, dir: &Path, files: &mut Vec<PathBuf>) -> RepoResult<()> {
        let entries = fs::read_dir(dir).map_err(|source| RepoError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| RepoError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                let name = entry.file_name();
                if self.config.is_ignored(&name.to_string_lossy()) {
                    continue;
                }
                self.walk(&path, files)?;
            } else if path
                .extension()
                .is_some_and(|ext| ext.to_string_lossy() == self.config.extension)
            {
                files.push(path);
            }
        }
        Ok(())
    }

    /// `path` relative to the root, or unchanged if it lies elsewhere.
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Namespace of a document stored at `path`.
    pub fn namespace_of(&self, path: &Path) -> Namespace {
        let parent = path.parent().unwrap_or(Path::new(""));
        Namespace::from_relative_dir(self.relative(parent))
    }

    /// Read and decode the document at `path`.
    pub fn read(&self, path: &Path) -> RepoResult<LoadedDocument> {
        let text = fs::read_to_string(path).map_err(|source| RepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| RepoError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let recorded_namespace = value
            .get("namespace")
            .and_then(|ns| ns.as_str())
            .map(Namespace::new)
            .unwrap_or_default();
        let stored = StoredDocument::from_json(value).map_err(|source| RepoError::Document {
            path: path.to_path_buf(),
            source,
        })?;
        let document = stored.document.with_namespace(self.namespace_of(path));
        let id = document.id().map_err(|source| RepoError::Document {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %self.relative(path).display(), %id, "read document");
        Ok(LoadedDocument {
            path: path.to_path_buf(),
            document: Arc::new(document),
            id,
            recorded_id: stored.recorded_id,
            recorded_namespace,
        })
    }

    /// Write `document` to `path`, replacing any existing file.
    pub fn write(&self, path: &Path, document: &Document) -> RepoResult<DocumentId> {
        let bytes = self.encode(path, document)?;
        fs::write(path, bytes).map_err(|source| RepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(document.id()?)
    }

    /// Write `document` to `path`, failing if the file already exists.
    pub fn write_new(&self, path: &Path, document: &Document) -> RepoResult<DocumentId> {
        let bytes = self.encode(path, document)?;
        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(RepoError::AlreadyExists(path.to_path_buf()))
            }
            Err(source) => {
                return Err(RepoError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        file.write_all(&bytes).map_err(|source| RepoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(document.id()?)
    }

    /// Pretty JSON with the configured indent, bookkeeping fields stamped.
    fn encode(&self, path: &Path, document: &Document) -> RepoResult<Vec<u8>> {
        let value = StoredDocument::to_json(document, Timestamp::now())?;
        let indent = vec![b' '; self.config.indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut bytes = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|source| RepoError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnorm_core::Target;
    use cnorm_policy::{DocumentMeta, TargetDocument};

    fn target_doc(name: &str) -> Document {
        Document::Target(TargetDocument::new(DocumentMeta::new(
            name,
            Target::new(name).unwrap(),
        )))
    }

    #[test]
    fn enumerate_skips_ignored_dirs_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("org/team")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("a.json"), "{}").unwrap();
        fs::write(root.join("org/team/b.json"), "{}").unwrap();
        fs::write(root.join(".git/c.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let store = DocumentStore::new(root, RepositoryConfig::default());
        let files: Vec<PathBuf> = store
            .enumerate()
            .unwrap()
            .iter()
            .map(|p| store.relative(p).to_path_buf())
            .collect();
        assert_eq!(files, vec![PathBuf::from("a.json"), PathBuf::from("org/team/b.json")]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("nope"), RepositoryConfig::default());
        assert!(matches!(store.enumerate(), Err(RepoError::NotADirectory(_))));
    }

    #[test]
    fn location_decides_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path(), RepositoryConfig::default());
        fs::create_dir_all(dir.path().join("org/team")).unwrap();
        let path = dir.path().join("org/team/t.json");
        store.write(&path, &target_doc("web")).unwrap();

        let loaded = store.read(&path).unwrap();
        assert_eq!(loaded.document.meta().namespace.as_str(), "org.team");
        assert!(loaded.id.as_str().starts_with("org.team:"));
        // Written from the root namespace, so the recorded bookkeeping is stale.
        assert!(loaded.is_stale());
    }

    #[test]
    fn written_documents_read_back_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path(), RepositoryConfig::default());
        let path = dir.path().join("t.json");
        let id = store.write(&path, &target_doc("web")).unwrap();
        let loaded = store.read(&path).unwrap();
        assert_eq!(loaded.id, id);
        assert!(!loaded.is_stale());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"name\": \"web\""), "{text}");
    }

    #[test]
    fn write_new_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path(), RepositoryConfig::default());
        let path = dir.path().join("t.json");
        store.write_new(&path, &target_doc("web")).unwrap();
        assert!(matches!(
            store.write_new(&path, &target_doc("web")),
            Err(RepoError::AlreadyExists(_))
        ));
    }

    #[test]
    fn bad_files_report_their_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::new(dir.path(), RepositoryConfig::default());
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        match store.read(&path) {
            Err(RepoError::Json { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Json error, got {other:?}"),
        }
    }
}
