use crate::syntax::kind::RawToken;
use crate::syntax::token::Span;
use logos::Logos;

/// A lexer that wraps `logos::Lexer` to produce raw tokens with byte spans.
///
/// `None` marks a byte sequence no raw token matches; the tokenizer turns it
/// into filler.
pub(crate) struct Lexer<'a> {
    inner: logos::Lexer<'a, RawToken>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            inner: RawToken::lexer(input),
        }
    }

    /// Unconsumed input after the last token handed out.
    pub(crate) fn remainder(&self) -> &'a str {
        self.inner.remainder()
    }

    /// Consume `len` bytes of the remainder without lexing them.
    ///
    /// `len` must land on a char boundary of the remainder.
    pub(crate) fn bump_span(&mut self, len: usize) -> Span {
        let start = self.inner.span().end;
        self.inner.bump(len);
        Span::new(start, start + len)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = (Option<RawToken>, Span);

    fn next(&mut self) -> Option<Self::Item> {
        let token_result = self.inner.next()?;
        let range = self.inner.span();
        Some((token_result.ok(), Span::new(range.start, range.end)))
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/lexer_tests.rs"]
mod tests;
