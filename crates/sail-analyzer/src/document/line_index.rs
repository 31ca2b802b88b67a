use tower_lsp::lsp_types::Position;

/// Line start table for converting between byte offsets and LSP positions
/// (0-based line, UTF-16 column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_offsets = vec![0usize];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_offsets.push(i + 1);
            }
        }
        Self { line_offsets }
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Byte offset of `pos` in `text`, the string this index was built from.
    ///
    /// Columns past the end of the line clamp to the line terminator.
    pub fn offset_of(
        &self,
        text: &str,
        pos: Position,
    ) -> Option<usize> {
        let line = pos.line as usize;
        let line_start = *self.line_offsets.get(line)?;
        let line_end = self.line_offsets.get(line + 1).copied().unwrap_or(text.len());
        let line_text = text[line_start..line_end].trim_end_matches(['\n', '\r']);

        // LSP character offsets are UTF-16 code-unit counts.
        let mut utf16_offset: u32 = 0;
        let mut byte_offset = line_start;
        for ch in line_text.chars() {
            if utf16_offset >= pos.character {
                break;
            }
            utf16_offset += ch.len_utf16() as u32;
            byte_offset += ch.len_utf8();
        }
        Some(byte_offset)
    }

    /// LSP position of a byte offset in `text`. Offsets past the end clamp to
    /// the end of the text.
    pub fn position_of(
        &self,
        text: &str,
        offset: usize,
    ) -> Position {
        let mut offset = offset.min(text.len());
        while !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(ins) => ins.saturating_sub(1),
        };
        let line_start = self.line_offsets[line];
        let character = text[line_start..offset]
            .chars()
            .map(|c| c.len_utf16() as u32)
            .sum::<u32>();
        Position {
            line: line as u32,
            character,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/line_index_tests.rs"]
mod tests;
