//! Identity resolution seam.
//!
//! Documents refer to each other by [`DocumentId`]. Anything that can turn
//! an identity into a loaded document implements [`DocumentResolver`]; the
//! filesystem repository is one implementation, [`InMemoryResolver`] another.

use std::collections::HashMap;
use std::sync::Arc;

use cnorm_core::DocumentId;

use crate::document::Document;
use crate::error::{PolicyError, PolicyResult};

/// Resolves identities to shared, immutable documents.
pub trait DocumentResolver {
    /// Look up the document with identity `id`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Unresolved`] when no such document is known.
    fn resolve(&self, id: &DocumentId) -> PolicyResult<Arc<Document>>;
}

impl<R: DocumentResolver + ?Sized> DocumentResolver for &R {
    fn resolve(&self, id: &DocumentId) -> PolicyResult<Arc<Document>> {
        (**self).resolve(id)
    }
}

/// A resolver over documents held in memory, keyed by their computed identity.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResolver {
    documents: HashMap<DocumentId, Arc<Document>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `document` and return the identity it is reachable under.
    pub fn insert(&mut self, document: Document) -> PolicyResult<DocumentId> {
        let id = document.id()?;
        self.documents
            .entry(id.clone())
            .or_insert_with(|| Arc::new(document));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentResolver for InMemoryResolver {
    fn resolve(&self, id: &DocumentId) -> PolicyResult<Arc<Document>> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| PolicyError::Unresolved {
                id: id.clone(),
                reason: "no document with this identity".into(),
            })
    }
}
