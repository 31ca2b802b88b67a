use std::ops::Range;

use crate::syntax::kind::{CommentStyle, TokenKind};

/// Half-open byte range into a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
    /// Number of `(`/`{` regions enclosing the token. Brackets carry the
    /// depth of the region they open or close.
    pub depth: u32,
    pub comment: Option<CommentStyle>,
    /// Set on strings and block comments that run to end of file.
    pub unterminated: bool,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        self.kind.is_trivia()
    }

    /// `true` for a keyword or operator token with exactly this text.
    pub fn is_keyword_or_op(&self, text: &str) -> bool {
        (self.kind.is_keyword() || self.kind == TokenKind::Operator) && self.text == text
    }

    pub fn is_open_bracket(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), "(" | "{")
    }

    pub fn is_close_bracket(&self) -> bool {
        self.kind == TokenKind::Operator && matches!(self.text.as_str(), ")" | "}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyKind {
    UnterminatedString,
    UnterminatedBlockComment,
    UnmatchedClose,
    UnclosedBracket,
}

impl AnomalyKind {
    pub fn message(self) -> &'static str {
        match self {
            AnomalyKind::UnterminatedString => "unterminated string literal",
            AnomalyKind::UnterminatedBlockComment => "unterminated block comment",
            AnomalyKind::UnmatchedClose => "closing bracket has no matching opening bracket",
            AnomalyKind::UnclosedBracket => "bracket is never closed",
        }
    }
}

/// A recoverable lexical problem, reported but never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalAnomaly {
    pub kind: AnomalyKind,
    pub span: Span,
}

/// All tokens of one file version, covering the text without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
    anomalies: Vec<LexicalAnomaly>,
}

impl TokenStream {
    pub(crate) fn new(tokens: Vec<Token>, anomalies: Vec<LexicalAnomaly>) -> Self {
        Self { tokens, anomalies }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn anomalies(&self) -> &[LexicalAnomaly] {
        &self.anomalies
    }

    /// Concatenated token texts; equal to the tokenized input.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }

    /// The token whose span contains `offset`.
    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        let index = self.tokens.partition_point(|token| token.span.end <= offset);
        self.tokens
            .get(index)
            .filter(|token| token.span.contains(offset))
    }

    /// The name token at `offset`, falling back to a name token that ends
    /// exactly at `offset` (cursor placed right after a word).
    ///
    /// The fallback only applies when the cursor sits on whitespace,
    /// punctuation or the end of input. A cursor on the first byte of a
    /// comment or string never resolves the word before it.
    pub fn name_at(&self, offset: usize) -> Option<&Token> {
        let index = self.tokens.partition_point(|token| token.span.end <= offset);
        if let Some(token) = self.tokens.get(index)
            && token.span.contains(offset)
        {
            if token.kind.is_name() {
                return Some(token);
            }
            if !matches!(token.kind, TokenKind::Filler | TokenKind::Operator) {
                return None;
            }
        }
        let before = self.tokens[..index].last()?;
        (before.span.end == offset && before.kind.is_name()).then_some(before)
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
