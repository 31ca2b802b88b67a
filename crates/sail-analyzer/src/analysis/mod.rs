//! Analysis host: per-file snapshots plus the workspace index, updated
//! together one file at a time.

mod resolve;

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tower_lsp::lsp_types::Position;

use crate::definitions::{Definition, DefinitionSite, extract};
use crate::document::LineIndex;
use crate::index::WorkspaceIndex;
use crate::syntax::{LexicalAnomaly, TokenStream, tokenize};
use crate::vfs::FileId;

pub use resolve::{CandidatePolicy, DefinitionLocation, resolve};

/// Immutable view of one file version. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    text: Arc<str>,
    tokens: Arc<TokenStream>,
    lines: Arc<LineIndex>,
}

impl FileSnapshot {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    pub fn offset_of(
        &self,
        position: Position,
    ) -> Option<usize> {
        self.lines.offset_of(&self.text, position)
    }

    pub fn position_of(
        &self,
        offset: usize,
    ) -> Position {
        self.lines.position_of(&self.text, offset)
    }
}

/// Tokenized and extracted text that has not been installed yet.
///
/// Building one touches no shared state, so files can be parsed in parallel
/// and installed afterwards in a fixed order.
#[derive(Debug)]
pub struct ParsedFile {
    snapshot: FileSnapshot,
    definitions: Vec<Definition>,
}

impl ParsedFile {
    pub fn parse(text: impl Into<Arc<str>>) -> Self {
        let text: Arc<str> = text.into();
        let tokens = tokenize(&text);
        let definitions = extract(&tokens);
        let lines = LineIndex::new(&text);
        Self {
            snapshot: FileSnapshot {
                text,
                tokens: Arc::new(tokens),
                lines: Arc::new(lines),
            },
            definitions,
        }
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }
}

#[derive(Default)]
pub struct Analysis {
    files: DashMap<FileId, FileSnapshot>,
    index: WorkspaceIndex,
}

impl Analysis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_opened(
        &self,
        file: FileId,
        text: &str,
    ) -> usize {
        self.install(file, ParsedFile::parse(text))
    }

    pub fn file_changed(
        &self,
        file: FileId,
        text: &str,
    ) -> usize {
        self.install(file, ParsedFile::parse(text))
    }

    /// Publish `parsed` as the current version of `file`. Returns the number
    /// of definition sites indexed for it.
    pub fn install(
        &self,
        file: FileId,
        parsed: ParsedFile,
    ) -> usize {
        let ParsedFile {
            snapshot,
            definitions,
        } = parsed;
        // The entry guard serialises writers of the same file, keeping its
        // snapshot and index sites from the same version.
        let entry = self.files.entry(file);
        let count = self.index.upsert_file(entry.key(), definitions);
        entry.insert(snapshot);
        count
    }

    /// Like [`Analysis::install`], but `skip` is asked under the same entry
    /// guard that serialises writers of `file`. A writer that commits to a
    /// newer version before this call is never overwritten with `parsed`.
    /// Returns `None` when skipped.
    pub fn install_unless(
        &self,
        file: FileId,
        parsed: ParsedFile,
        skip: impl FnOnce() -> bool,
    ) -> Option<usize> {
        let entry = self.files.entry(file);
        if skip() {
            return None;
        }
        let ParsedFile {
            snapshot,
            definitions,
        } = parsed;
        let count = self.index.upsert_file(entry.key(), definitions);
        entry.insert(snapshot);
        Some(count)
    }

    /// Forget `file` entirely. Returns whether it was tracked.
    pub fn file_closed(
        &self,
        file: &FileId,
    ) -> bool {
        match self.files.entry(file.clone()) {
            Entry::Occupied(entry) => {
                self.index.remove_file(file);
                entry.remove();
                true
            },
            Entry::Vacant(_) => self.index.remove_file(file),
        }
    }

    pub fn is_tracked(
        &self,
        file: &FileId,
    ) -> bool {
        self.files.contains_key(file)
    }

    pub fn snapshot(
        &self,
        file: &FileId,
    ) -> Option<FileSnapshot> {
        self.files.get(file).map(|entry| entry.clone())
    }

    /// First candidate in scan order for the name at `offset`.
    pub fn resolve_definition(
        &self,
        file: &FileId,
        offset: usize,
    ) -> Vec<DefinitionLocation> {
        self.resolve_definition_with(file, offset, CandidatePolicy::First)
    }

    pub fn resolve_definition_with(
        &self,
        file: &FileId,
        offset: usize,
        policy: CandidatePolicy,
    ) -> Vec<DefinitionLocation> {
        match self.snapshot(file) {
            Some(snapshot) => resolve(&self.index, snapshot.tokens(), offset, policy),
            None => Vec::new(),
        }
    }

    /// LSP position of a byte offset in a tracked file.
    pub fn position_of(
        &self,
        file: &FileId,
        offset: usize,
    ) -> Option<Position> {
        self.files
            .get(file)
            .map(|snapshot| snapshot.position_of(offset))
    }

    pub fn file_sites(
        &self,
        file: &FileId,
    ) -> Vec<Arc<DefinitionSite>> {
        self.index.file_sites(file)
    }

    pub fn workspace_symbols(
        &self,
        query: &str,
        limit: usize,
    ) -> Vec<Arc<DefinitionSite>> {
        self.index.search(query, limit)
    }

    pub fn lexical_anomalies(
        &self,
        file: &FileId,
    ) -> Vec<LexicalAnomaly> {
        self.files
            .get(file)
            .map(|snapshot| snapshot.tokens().anomalies().to_vec())
            .unwrap_or_default()
    }

    /// Tracked files in the order they were first indexed.
    pub fn tracked_files(&self) -> Vec<FileId> {
        self.index.files()
    }

    pub fn index(&self) -> &WorkspaceIndex {
        &self.index
    }
}

#[cfg(test)]
#[path = "../../tests/src/analysis/analysis_tests.rs"]
mod tests;
