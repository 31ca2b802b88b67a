use logos::Logos;

/// Classification of a token in a [`TokenStream`](super::TokenStream).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    String,
    Number,
    KeywordControl,
    KeywordType,
    KeywordOther,
    /// Operators, punctuation from the closed operator set, and brackets.
    Operator,
    TypeVariable,
    Identifier,
    /// Whitespace and isolated punctuation such as `;`, `<` or `[`.
    Filler,
}

impl TokenKind {
    /// Comments and filler carry no meaning for definition extraction.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Filler)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KeywordControl | TokenKind::KeywordType | TokenKind::KeywordOther
        )
    }

    /// Tokens whose text can name a definition.
    pub fn is_name(self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::TypeVariable)
    }
}

/// Sub-kind recorded on every comment token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    Line,
    Block,
    /// `///` or `//!`
    DocLine,
    /// `/**` or `/*!`
    DocBlock,
    /// `// = Section =` style separators.
    Banner,
}

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(error = ())]
pub(crate) enum RawToken {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    // A backslash right before the line terminator continues the comment.
    #[regex(r"//([^\r\n\\]|\\\r?\n|\\[^\r\n]|\\)*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\**")]
    UnterminatedBlockComment,

    #[regex(r#""([^"\\]|\\[\s\S])*""#)]
    String,
    #[regex(r#""([^"\\]|\\[\s\S])*\\?"#)]
    UnterminatedString,

    #[regex(r"0[xX][0-9A-Fa-f_]+(ull|ULL|ul|UL|ll|LL|[uUlLfF])?")]
    #[regex(r"0[bB][01_]+(ull|ULL|ul|UL|ll|LL|[uUlLfF])?")]
    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9][0-9_]*)?(ull|ULL|ul|UL|ll|LL|[uUlLfF])?")]
    Number,

    #[regex(r"'[A-Za-z][A-Za-z0-9_]*")]
    TypeVariable,

    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*")]
    Directive,

    #[token("if")]
    #[token("then")]
    #[token("while")]
    #[token("for")]
    #[token("foreach")]
    #[token("return")]
    #[token("match")]
    #[token("else")]
    KeywordControl,

    #[token("atom")]
    #[token("int")]
    KeywordType,

    #[token("type")]
    #[token("val")]
    #[token("var")]
    #[token("let")]
    #[token("in")]
    #[token("function")]
    #[token("scattered")]
    #[token("enum")]
    #[token("union")]
    #[token("clause")]
    #[token("default")]
    #[token("order")]
    #[token("dec")]
    #[token("register")]
    #[token("vector")]
    #[token("bitfield")]
    #[token("forall")]
    #[token("effect")]
    #[token("infix")]
    #[token("infixl")]
    #[token("infixr")]
    #[token("overload")]
    #[token("operator")]
    #[token("mapping")]
    #[token("struct")]
    #[token("newtype")]
    KeywordOther,

    #[regex(r"[A-Za-z_][A-Za-z0-9_?']*")]
    Identifier,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    #[token("=>")]
    #[token(">=")]
    #[token("<=")]
    #[token("=")]
    #[token("->")]
    #[token("-")]
    #[token(":")]
    #[token(",")]
    #[token("+")]
    #[token("*")]
    #[token(".")]
    #[token("@")]
    #[token("_", priority = 3)]
    Operator,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Whitespace => TokenKind::Filler,
            RawToken::LineComment
            | RawToken::BlockComment
            | RawToken::UnterminatedBlockComment => TokenKind::Comment,
            RawToken::String | RawToken::UnterminatedString => TokenKind::String,
            RawToken::Number => TokenKind::Number,
            RawToken::TypeVariable => TokenKind::TypeVariable,
            RawToken::Directive | RawToken::KeywordOther => TokenKind::KeywordOther,
            RawToken::KeywordControl => TokenKind::KeywordControl,
            RawToken::KeywordType => TokenKind::KeywordType,
            RawToken::Identifier => TokenKind::Identifier,
            RawToken::LParen
            | RawToken::RParen
            | RawToken::LBrace
            | RawToken::RBrace
            | RawToken::Operator => TokenKind::Operator,
        }
    }
}
