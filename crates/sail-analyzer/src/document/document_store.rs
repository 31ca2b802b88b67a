use dashmap::DashMap;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

use super::Document;

/// Thread-safe store of all open documents.
///
/// Uses `DashMap` internally so that all operations are safe to call
/// concurrently from any async task without external synchronisation.
#[derive(Debug)]
pub struct DocumentStore {
    documents: DashMap<Url, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open (register) a new document, replacing any previous copy.
    pub fn open(&self, uri: Url, text: String, version: i32) {
        self.documents
            .insert(uri.clone(), Document::new(uri, text, version));
    }

    /// Apply incremental or full-content changes to an already-open document
    /// and return the resulting text. `None` if the document is not open.
    pub fn apply_changes(
        &self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<String> {
        let mut doc = self.documents.get_mut(uri)?;
        doc.apply_changes(changes, version);
        Some(doc.text.clone())
    }

    /// Close (unregister) a document. Returns whether it was open.
    pub fn close(&self, uri: &Url) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    /// Return a clone of the full document text, if the URI is tracked.
    pub fn get_content(&self, uri: &Url) -> Option<String> {
        self.documents.get(uri).map(|r| r.value().text.clone())
    }

    pub fn open_uris(&self) -> Vec<Url> {
        self.documents.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Return a clone of the full `Document`, if the URI is tracked.
    pub fn get(&self, uri: &Url) -> Option<Document> {
        self.documents.get(uri).map(|r| r.value().clone())
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/document_store_tests.rs"]
mod tests;
