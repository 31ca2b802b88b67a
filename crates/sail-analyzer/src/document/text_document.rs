use tower_lsp::lsp_types::*;

use super::LineIndex;

// ── Document ────────────────────────────────────────────────────────────────

/// Snapshot of a single open text document.
#[derive(Debug, Clone)]
pub struct Document {
    /// The document URI.
    pub uri: Url,
    /// Full source text (always kept up-to-date).
    pub text: String,
    /// Document version as reported by the client.
    pub version: i32,
    /// Rebuilt on every mutation.
    lines: LineIndex,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        let lines = LineIndex::new(&text);
        Self {
            uri,
            text,
            version,
            lines,
        }
    }

    /// Convert an LSP `Position` (line/character, 0-based) to a byte offset.
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        self.lines.offset_of(&self.text, pos)
    }

    // ── mutations ───────────────────────────────────────────────────────

    /// Apply a list of incremental or full-content changes and bump version.
    ///
    /// A change whose range does not fit the current text is dropped.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            if let Some(range) = change.range {
                if let (Some(start), Some(end)) = (self.offset_of(range.start), self.offset_of(range.end))
                    && start <= end
                {
                    self.text.replace_range(start..end, &change.text);
                    self.lines = LineIndex::new(&self.text);
                }
            } else {
                self.text = change.text;
                self.lines = LineIndex::new(&self.text);
            }
        }
        self.version = version;
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
