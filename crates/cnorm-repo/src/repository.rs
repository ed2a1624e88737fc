//! # Repository
//!
//! The explicit handle through which documents are loaded and resolved.
//!
//! ## Cache Lifecycle
//!
//! The first lookup by identity scans the whole tree once and caches every
//! document that decodes, keyed by its computed identity. Entries are only
//! ever added: a changed document gets a new identity, never an in-place
//! update. [`Repository::clear`] drops the cache; the next lookup rescans.
//!
//! Reads take a shared lock, so a `Repository` can be shared across
//! threads within one run as long as nothing rewrites the backing files
//! concurrently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use cnorm_core::DocumentId;
use cnorm_policy::{Document, DocumentKind, DocumentResolver, PolicyError, PolicyResult};

use crate::config::RepositoryConfig;
use crate::error::{RepoError, RepoResult};
use crate::store::{DocumentStore, LoadedDocument};

#[derive(Debug, Default)]
struct Cache {
    scanned: bool,
    documents: HashMap<DocumentId, Arc<Document>>,
    paths: HashMap<DocumentId, PathBuf>,
}

/// One row of [`Repository::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub proper_name: String,
    /// Backing file relative to the root; `None` for registered documents.
    pub path: Option<PathBuf>,
}

/// A document repository rooted at one directory.
#[derive(Debug)]
pub struct Repository {
    store: DocumentStore,
    cache: RwLock<Cache>,
}

impl Repository {
    /// Open the repository at `root`, reading `cnorm.yaml` if present.
    pub fn open(root: impl Into<PathBuf>) -> RepoResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RepoError::NotADirectory(root));
        }
        let config = RepositoryConfig::load(&root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: impl Into<PathBuf>, config: RepositoryConfig) -> Self {
        Self {
            store: DocumentStore::new(root, config),
            cache: RwLock::new(Cache::default()),
        }
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    pub fn config(&self) -> &RepositoryConfig {
        self.store.config()
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Read the file at `path` and cache its document.
    ///
    /// If a document with the same identity is already cached, the cached
    /// instance is returned in the result instead of the fresh one.
    pub fn load_path(&self, path: &Path) -> RepoResult<LoadedDocument> {
        let mut loaded = self.store.read(path)?;
        let mut cache = self.cache.write();
        let cached = cache
            .documents
            .entry(loaded.id.clone())
            .or_insert_with(|| loaded.document.clone())
            .clone();
        cache
            .paths
            .entry(loaded.id.clone())
            .or_insert_with(|| path.to_path_buf());
        loaded.document = cached;
        Ok(loaded)
    }

    /// The document with identity `id`.
    ///
    /// Scans the tree on first use; later calls are served from the cache.
    pub fn load(&self, id: &DocumentId) -> RepoResult<Arc<Document>> {
        if let Some(document) = self.cache.read().documents.get(id) {
            debug!(%id, "cache hit");
            return Ok(document.clone());
        }
        self.ensure_scanned()?;
        self.cache
            .read()
            .documents
            .get(id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound(id.clone()))
    }

    /// Add an in-memory document to the cache without persisting it.
    pub fn register(&self, document: Document) -> RepoResult<DocumentId> {
        let id = document.id()?;
        self.cache
            .write()
            .documents
            .entry(id.clone())
            .or_insert_with(|| Arc::new(document));
        debug!(%id, "registered document");
        Ok(id)
    }

    /// Drop every cached document. The next lookup rescans the tree.
    pub fn clear(&self) {
        *self.cache.write() = Cache::default();
        debug!("cache cleared");
    }

    /// Every cached document, optionally of one kind, ordered by kind then identity.
    pub fn list(&self, kind: Option<DocumentKind>) -> RepoResult<Vec<ListEntry>> {
        self.ensure_scanned()?;
        let cache = self.cache.read();
        let mut entries: Vec<ListEntry> = cache
            .documents
            .iter()
            .filter(|(_, doc)| kind.map_or(true, |k| doc.kind() == k))
            .map(|(id, doc)| ListEntry {
                id: id.clone(),
                kind: doc.kind(),
                proper_name: doc.proper_name(),
                path: cache
                    .paths
                    .get(id)
                    .map(|p| self.store.relative(p).to_path_buf()),
            })
            .collect();
        entries.sort_by(|a, b| (a.kind, &a.id).cmp(&(b.kind, &b.id)));
        Ok(entries)
    }

    fn ensure_scanned(&self) -> RepoResult<()> {
        if self.cache.read().scanned {
            return Ok(());
        }
        let files = self.store.enumerate()?;
        let total = files.len();
        let mut skipped = 0usize;
        for path in files {
            if let Err(err) = self.load_path(&path) {
                skipped += 1;
                warn!(path = %self.store.relative(&path).display(), error = %err, "skipping document");
            }
        }
        self.cache.write().scanned = true;
        debug!(total, skipped, "scanned repository");
        Ok(())
    }
}

impl DocumentResolver for Repository {
    fn resolve(&self, id: &DocumentId) -> PolicyResult<Arc<Document>> {
        self.load(id).map_err(|err| PolicyError::Unresolved {
            id: id.clone(),
            reason: err.to_string(),
        })
    }
}
