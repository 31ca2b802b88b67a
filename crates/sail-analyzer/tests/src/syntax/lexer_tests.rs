use super::*;

fn lex(input: &str) -> Vec<(Option<RawToken>, &str)> {
    Lexer::new(input)
        .map(|(raw, span)| (raw, &input[span.range()]))
        .collect()
}

#[test]
fn test_keywords_and_identifiers() {
    let tokens = lex("function foo iffy if int");
    assert_eq!(
        tokens,
        vec![
            (Some(RawToken::KeywordOther), "function"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Identifier), "foo"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Identifier), "iffy"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::KeywordControl), "if"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::KeywordType), "int"),
        ]
    );
}

#[test]
fn test_identifier_continuation_chars() {
    let tokens = lex("is_valid? x' __write_mem");
    assert_eq!(
        tokens,
        vec![
            (Some(RawToken::Identifier), "is_valid?"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Identifier), "x'"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Identifier), "__write_mem"),
        ]
    );
}

#[test]
fn test_type_variable_and_wildcard() {
    let tokens = lex("'n _ _x");
    assert_eq!(
        tokens,
        vec![
            (Some(RawToken::TypeVariable), "'n"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Operator), "_"),
            (Some(RawToken::Whitespace), " "),
            (Some(RawToken::Identifier), "_x"),
        ]
    );
}

#[test]
fn test_numbers() {
    let tokens = lex("0xFF_u 0b1010 3.14e-2 42ULL 1_000");
    let numbers: Vec<_> = tokens
        .into_iter()
        .filter(|(raw, _)| *raw != Some(RawToken::Whitespace))
        .collect();
    assert_eq!(
        numbers,
        vec![
            (Some(RawToken::Number), "0xFF_u"),
            (Some(RawToken::Number), "0b1010"),
            (Some(RawToken::Number), "3.14e-2"),
            (Some(RawToken::Number), "42ULL"),
            (Some(RawToken::Number), "1_000"),
        ]
    );
}

#[test]
fn test_line_comment_continuation() {
    let tokens = lex("// a\\\nb\nc");
    assert_eq!(
        tokens,
        vec![
            (Some(RawToken::LineComment), "// a\\\nb"),
            (Some(RawToken::Whitespace), "\n"),
            (Some(RawToken::Identifier), "c"),
        ]
    );
}

#[test]
fn test_line_comment_stops_before_crlf() {
    let tokens = lex("// a\r\nb");
    assert_eq!(
        tokens,
        vec![
            (Some(RawToken::LineComment), "// a"),
            (Some(RawToken::Whitespace), "\r\n"),
            (Some(RawToken::Identifier), "b"),
        ]
    );
}

#[test]
fn test_unterminated_literals() {
    assert_eq!(lex("\"abc"), vec![(Some(RawToken::UnterminatedString), "\"abc")]);
    assert_eq!(
        lex("/* x *"),
        vec![(Some(RawToken::UnterminatedBlockComment), "/* x *")]
    );
    assert_eq!(
        lex("\"a\\\"b\""),
        vec![(Some(RawToken::String), "\"a\\\"b\"")]
    );
}

#[test]
fn test_operators() {
    let tokens = lex("=> >= <= = -> - : , + * . @");
    let operators: Vec<_> = tokens
        .into_iter()
        .filter(|(raw, _)| *raw != Some(RawToken::Whitespace))
        .collect();
    let expected: Vec<_> = ["=>", ">=", "<=", "=", "->", "-", ":", ",", "+", "*", ".", "@"]
        .into_iter()
        .map(|text| (Some(RawToken::Operator), text))
        .collect();
    assert_eq!(operators, expected);
}

#[test]
fn test_unknown_byte() {
    assert_eq!(lex(";"), vec![(None, ";")]);
}

#[test]
fn test_bump_span_consumes_remainder() {
    let mut lexer = Lexer::new("$include <a.sail>\nfoo");
    let (raw, span) = lexer.next().unwrap();
    assert_eq!(raw, Some(RawToken::Directive));
    assert_eq!(span, Span::new(0, 8));
    assert_eq!(lexer.remainder(), " <a.sail>\nfoo");

    assert_eq!(lexer.bump_span(9), Span::new(8, 17));
    assert_eq!(lexer.next(), Some((Some(RawToken::Whitespace), Span::new(17, 18))));
    assert_eq!(lexer.next(), Some((Some(RawToken::Identifier), Span::new(18, 21))));
}
