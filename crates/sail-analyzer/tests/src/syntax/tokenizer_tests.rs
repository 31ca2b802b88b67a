use expect_test::{Expect, expect};

use super::*;

fn check(source: &str, expect: Expect) {
    let stream = tokenize(source);
    assert_eq!(stream.text(), source);
    let dump: String = stream
        .iter()
        .filter(|token| token.kind != TokenKind::Filler || !token.text.trim().is_empty())
        .map(|token| {
            let style = token
                .comment
                .map(|style| format!("({style:?})"))
                .unwrap_or_default();
            let flag = if token.unterminated { " unterminated" } else { "" };
            format!(
                "{:?}{style} {:?} {}..{} depth={}{flag}\n",
                token.kind, token.text, token.span.start, token.span.end, token.depth
            )
        })
        .collect();
    expect.assert_eq(&dump);
}

#[test]
fn function_definition_tokens() {
    check(
        "function foo(x) = x + 1",
        expect![[r#"
            KeywordOther "function" 0..8 depth=0
            Identifier "foo" 9..12 depth=0
            Operator "(" 12..13 depth=0
            Identifier "x" 13..14 depth=1
            Operator ")" 14..15 depth=0
            Operator "=" 16..17 depth=0
            Identifier "x" 18..19 depth=0
            Operator "+" 20..21 depth=0
            Number "1" 22..23 depth=0
        "#]],
    );
}

#[test]
fn include_directive_paths_are_single_strings() {
    check(
        "$include <prelude.sail>\n$include \"rv.sail\" // x\n",
        expect![[r#"
            KeywordOther "$include" 0..8 depth=0
            String "<prelude.sail>" 9..23 depth=0
            KeywordOther "$include" 24..32 depth=0
            String "\"rv.sail\"" 33..42 depth=0
            Comment(Line) "// x" 43..47 depth=0
        "#]],
    );
}

#[test]
fn directive_not_at_line_start_has_no_path_region() {
    let stream = tokenize("x $include <a>");
    assert!(stream.iter().all(|token| token.kind != TokenKind::String));
    assert_eq!(stream.text(), "x $include <a>");
}

#[test]
fn other_directives_are_plain_keywords() {
    check(
        "$ifdef RV64\n$define FOO\n",
        expect![[r#"
            KeywordOther "$ifdef" 0..6 depth=0
            Identifier "RV64" 7..11 depth=0
            KeywordOther "$define" 12..19 depth=0
            Identifier "FOO" 20..23 depth=0
        "#]],
    );
}

#[test]
fn comment_styles() {
    check(
        "/// doc\n//! inner\n// = Banner =\n/**/ /** d */ /* = B = */ //// plain",
        expect![[r#"
            Comment(DocLine) "/// doc" 0..7 depth=0
            Comment(DocLine) "//! inner" 8..17 depth=0
            Comment(Banner) "// = Banner =" 18..31 depth=0
            Comment(Block) "/**/" 32..36 depth=0
            Comment(DocBlock) "/** d */" 37..45 depth=0
            Comment(Banner) "/* = B = */" 46..57 depth=0
            Comment(Line) "//// plain" 58..68 depth=0
        "#]],
    );
}

#[test]
fn line_comment_continues_after_backslash_newline() {
    let stream = tokenize("// foo\\\nbar\nbaz");
    let first = &stream.tokens()[0];
    assert_eq!(first.kind, TokenKind::Comment);
    assert_eq!(first.text, "// foo\\\nbar");
    let last = stream.tokens().last().unwrap();
    assert_eq!(last.kind, TokenKind::Identifier);
    assert_eq!(last.text, "baz");
}

#[test]
fn line_comment_ends_at_line_terminator() {
    for source in ["// comment\nx", "// comment\r\nx"] {
        let stream = tokenize(source);
        let comment = &stream.tokens()[0];
        assert_eq!(comment.kind, TokenKind::Comment);
        assert_eq!(comment.span, Span::new(0, 10));
    }
}

#[test]
fn unterminated_block_comment_covers_rest_of_file() {
    let source = "foo /* bar";
    let stream = tokenize(source);
    assert_eq!(stream.text(), source);
    let comment = stream.tokens().last().unwrap();
    assert_eq!(comment.kind, TokenKind::Comment);
    assert!(comment.unterminated);
    assert_eq!(comment.span, Span::new(4, 10));
    assert_eq!(
        stream.anomalies(),
        &[LexicalAnomaly {
            kind: AnomalyKind::UnterminatedBlockComment,
            span: Span::new(4, 10),
        }]
    );
}

#[test]
fn unterminated_string_is_flagged() {
    let stream = tokenize("let s = \"open");
    let string = stream.tokens().last().unwrap();
    assert_eq!(string.kind, TokenKind::String);
    assert!(string.unterminated);
    assert_eq!(stream.anomalies()[0].kind, AnomalyKind::UnterminatedString);
}

#[test]
fn unmatched_closer_keeps_depth() {
    let stream = tokenize("f(x)) y");
    assert_eq!(
        stream.anomalies(),
        &[LexicalAnomaly {
            kind: AnomalyKind::UnmatchedClose,
            span: Span::new(4, 5),
        }]
    );
    assert_eq!(stream.tokens().last().unwrap().depth, 0);
}

#[test]
fn mismatched_closer_recovers_to_its_opener() {
    check(
        "{ (a }",
        expect![[r#"
            Operator "{" 0..1 depth=0
            Operator "(" 2..3 depth=1
            Identifier "a" 3..4 depth=2
            Operator "}" 5..6 depth=0
        "#]],
    );
    let stream = tokenize("{ (a }");
    assert_eq!(
        stream.anomalies(),
        &[LexicalAnomaly {
            kind: AnomalyKind::UnclosedBracket,
            span: Span::new(2, 3),
        }]
    );
}

#[test]
fn unclosed_bracket_at_end_of_file() {
    let stream = tokenize("union U = {\n  A : int");
    assert_eq!(stream.anomalies().len(), 1);
    assert_eq!(stream.anomalies()[0].kind, AnomalyKind::UnclosedBracket);
    assert_eq!(stream.anomalies()[0].span, Span::new(10, 11));
}

#[test]
fn messy_input_reconstructs_exactly() {
    let source = "let café = \"naïve\" ; /* ü */ 'a <| x @ y \\ $ [0] \r\n$include \"x\\\"y\" \\\n  z";
    let stream = tokenize(source);
    assert_eq!(stream.text(), source);
    let mut cursor = 0;
    for token in stream.iter() {
        assert_eq!(token.span.start, cursor);
        assert!(!token.span.is_empty());
        cursor = token.span.end;
    }
    assert_eq!(cursor, source.len());
}

#[test]
fn name_at_prefers_token_under_cursor_then_word_before_it() {
    let stream = tokenize("foo(bar)");
    assert_eq!(stream.name_at(0).map(|token| token.text.as_str()), Some("foo"));
    assert_eq!(stream.name_at(3).map(|token| token.text.as_str()), Some("foo"));
    assert_eq!(stream.name_at(5).map(|token| token.text.as_str()), Some("bar"));
    assert!(stream.name_at(8).is_none());
}

#[test]
fn name_at_ignores_strings_and_comments() {
    let stream = tokenize("\"foo\" // foo");
    assert!(stream.name_at(2).is_none());
    assert!(stream.name_at(9).is_none());
}

#[test]
fn name_at_does_not_reach_back_from_a_comment_or_string_start() {
    let stream = tokenize("foo// note");
    assert_eq!(stream.token_at(3).map(|token| token.kind), Some(TokenKind::Comment));
    assert!(stream.name_at(3).is_none());

    let stream = tokenize("foo\"str\"");
    assert_eq!(stream.token_at(3).map(|token| token.kind), Some(TokenKind::String));
    assert!(stream.name_at(3).is_none());

    // Whitespace and the end of input still fall back.
    let stream = tokenize("foo bar");
    assert_eq!(stream.name_at(3).map(|token| token.text.as_str()), Some("foo"));
    assert_eq!(stream.name_at(7).map(|token| token.text.as_str()), Some("bar"));
}

#[test]
fn empty_input_yields_empty_stream() {
    let stream = tokenize("");
    assert!(stream.is_empty());
    assert!(stream.anomalies().is_empty());
}
