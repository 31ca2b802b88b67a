use once_cell::sync::Lazy;
use regex::Regex;

use crate::syntax::kind::{CommentStyle, RawToken, TokenKind};
use crate::syntax::lexer::Lexer;
use crate::syntax::token::{AnomalyKind, LexicalAnomaly, Span, Token, TokenStream};

/// Directives whose argument is a file path.
const PATH_DIRECTIVES: &[&str] = &["$include", "$import"];

static BANNER_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*=[^\r\n]*=[ \t]*$").expect("banner pattern is a valid regex")
});

/// Split `source` into classified tokens.
///
/// Never fails: malformed input is flagged on the offending token and
/// recorded as a [`LexicalAnomaly`]. Token texts concatenate to `source`.
pub fn tokenize(source: &str) -> TokenStream {
    Tokenizer::new(source).run()
}

struct Tokenizer<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    tokens: Vec<Token>,
    anomalies: Vec<LexicalAnomaly>,
    /// Open brackets, innermost last.
    open: Vec<(char, Span)>,
    /// Only whitespace seen since the last line terminator.
    at_line_start: bool,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            lexer: Lexer::new(source),
            tokens: Vec::new(),
            anomalies: Vec::new(),
            open: Vec::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> TokenStream {
        while let Some((raw, span)) = self.lexer.next() {
            self.push_raw(raw, span);
        }
        for (_, span) in std::mem::take(&mut self.open) {
            self.anomalies.push(LexicalAnomaly {
                kind: AnomalyKind::UnclosedBracket,
                span,
            });
        }
        self.anomalies.sort_by_key(|anomaly| anomaly.span.start);
        TokenStream::new(self.tokens, self.anomalies)
    }

    fn depth(&self) -> u32 {
        u32::try_from(self.open.len()).unwrap_or(u32::MAX)
    }

    fn push_raw(&mut self, raw: Option<RawToken>, span: Span) {
        let text = &self.source[span.range()];
        let Some(raw) = raw else {
            self.push(TokenKind::Filler, span);
            self.at_line_start = false;
            return;
        };

        match raw {
            RawToken::Whitespace => {
                let newline = text.contains('\n');
                self.push(TokenKind::Filler, span);
                if newline {
                    self.at_line_start = true;
                }
                return;
            }
            RawToken::LineComment => {
                let style = line_comment_style(text);
                self.push_comment(span, style, false);
            }
            RawToken::BlockComment => {
                let style = block_comment_style(text);
                self.push_comment(span, style, false);
            }
            RawToken::UnterminatedBlockComment => {
                let style = block_comment_style(text);
                self.push_comment(span, style, true);
                self.record(AnomalyKind::UnterminatedBlockComment, span);
            }
            RawToken::String => self.push(TokenKind::String, span),
            RawToken::UnterminatedString => {
                self.push_flagged(TokenKind::String, span, None, true);
                self.record(AnomalyKind::UnterminatedString, span);
            }
            RawToken::Directive => {
                let opens_region = self.at_line_start && PATH_DIRECTIVES.contains(&text);
                self.push(TokenKind::KeywordOther, span);
                if opens_region {
                    self.directive_region();
                }
            }
            RawToken::LParen => self.open_bracket('(', span),
            RawToken::LBrace => self.open_bracket('{', span),
            RawToken::RParen => self.close_bracket('(', span),
            RawToken::RBrace => self.close_bracket('{', span),
            other => self.push(other.into(), span),
        }
        self.at_line_start = false;
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.push_flagged(kind, span, None, false);
    }

    fn push_comment(&mut self, span: Span, style: CommentStyle, unterminated: bool) {
        self.push_flagged(TokenKind::Comment, span, Some(style), unterminated);
    }

    fn push_flagged(
        &mut self,
        kind: TokenKind,
        span: Span,
        comment: Option<CommentStyle>,
        unterminated: bool,
    ) {
        self.tokens.push(Token {
            kind,
            span,
            text: self.source[span.range()].to_string(),
            depth: self.depth(),
            comment,
            unterminated,
        });
    }

    fn record(&mut self, kind: AnomalyKind, span: Span) {
        self.anomalies.push(LexicalAnomaly { kind, span });
    }

    fn open_bracket(&mut self, bracket: char, span: Span) {
        self.push(TokenKind::Operator, span);
        self.open.push((bracket, span));
    }

    /// Pop back to the matching opener. Openers skipped on the way are
    /// reported as unclosed; a closer with no opener at all leaves the depth
    /// untouched.
    fn close_bracket(&mut self, opener: char, span: Span) {
        let Some(position) = self.open.iter().rposition(|(open, _)| *open == opener) else {
            self.push(TokenKind::Operator, span);
            self.record(AnomalyKind::UnmatchedClose, span);
            return;
        };
        for (_, skipped) in self.open.split_off(position + 1) {
            self.record(AnomalyKind::UnclosedBracket, skipped);
        }
        self.open.pop();
        self.push(TokenKind::Operator, span);
    }

    /// Tokenize the rest of a `$include`/`$import` line by hand: a quoted or
    /// angle-bracketed path becomes one string token, everything else is
    /// filler. Stops before the line terminator or a trailing comment.
    fn directive_region(&mut self) {
        loop {
            let rest = self.lexer.remainder();
            let Some(first) = rest.chars().next() else {
                return;
            };
            if rest.starts_with('\n')
                || rest.starts_with("\r\n")
                || rest.starts_with("//")
                || rest.starts_with("/*")
            {
                return;
            }

            if let Some(len) = escaped_newline_len(rest) {
                let span = self.lexer.bump_span(len);
                self.push(TokenKind::Filler, span);
                continue;
            }

            match first {
                ' ' | '\t' => {
                    let len = rest
                        .find(|c: char| c != ' ' && c != '\t')
                        .unwrap_or(rest.len());
                    let span = self.lexer.bump_span(len);
                    self.push(TokenKind::Filler, span);
                }
                '"' => {
                    let (len, closed) = quoted_path_len(rest);
                    let span = self.lexer.bump_span(len);
                    self.push_flagged(TokenKind::String, span, None, !closed);
                    if !closed {
                        self.record(AnomalyKind::UnterminatedString, span);
                    }
                }
                '<' => match angle_path_len(rest) {
                    Some(len) => {
                        let span = self.lexer.bump_span(len);
                        self.push(TokenKind::String, span);
                    }
                    None => {
                        let span = self.lexer.bump_span(1);
                        self.push(TokenKind::Filler, span);
                    }
                },
                _ => {
                    let len = rest
                        .find(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n' | '"' | '<' | '/' | '\\'))
                        .filter(|&len| len > 0)
                        .unwrap_or_else(|| first.len_utf8());
                    let span = self.lexer.bump_span(len);
                    self.push(TokenKind::Filler, span);
                }
            }
        }
    }
}

fn escaped_newline_len(rest: &str) -> Option<usize> {
    if rest.starts_with("\\\n") {
        Some(2)
    } else if rest.starts_with("\\\r\n") {
        Some(3)
    } else {
        None
    }
}

/// Length of a `"..."` path and whether it was closed before end of line.
fn quoted_path_len(rest: &str) -> (usize, bool) {
    let bytes = rest.as_bytes();
    let mut index = 1;
    while index < bytes.len() {
        match bytes[index] {
            b'"' => return (index + 1, true),
            b'\\' if index + 1 < bytes.len() && bytes[index + 1] != b'\n' => {
                index += 2;
                // Skip the rest of an escaped multi-byte char.
                while index < bytes.len() && !rest.is_char_boundary(index) {
                    index += 1;
                }
            }
            b'\n' => break,
            _ => index += 1,
        }
    }
    let end = if index > 0 && bytes.get(index) == Some(&b'\n') && bytes[index - 1] == b'\r' {
        index - 1
    } else {
        index.min(bytes.len())
    };
    (end, false)
}

/// Length of a `<...>` path closed on the same line.
fn angle_path_len(rest: &str) -> Option<usize> {
    let line_end = rest.find(['\r', '\n']).unwrap_or(rest.len());
    rest[..line_end].find('>').map(|close| close + 1)
}

fn line_comment_style(text: &str) -> CommentStyle {
    let body = &text[2..];
    if BANNER_BODY.is_match(body) {
        CommentStyle::Banner
    } else if (body.starts_with('/') && !body.starts_with("//")) || body.starts_with('!') {
        CommentStyle::DocLine
    } else {
        CommentStyle::Line
    }
}

fn block_comment_style(text: &str) -> CommentStyle {
    if text == "/**/" {
        return CommentStyle::Block;
    }
    let body = text[2..].strip_suffix("*/").unwrap_or(&text[2..]);
    if BANNER_BODY.is_match(body) {
        CommentStyle::Banner
    } else if body.starts_with('*') || body.starts_with('!') {
        CommentStyle::DocBlock
    } else {
        CommentStyle::Block
    }
}

#[cfg(test)]
#[path = "../../tests/src/syntax/tokenizer_tests.rs"]
mod tests;
