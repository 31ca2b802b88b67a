use crate::definitions::site::{Definition, DefinitionKind};
use crate::syntax::{Span, Token, TokenKind, TokenStream};

/// Two-keyword lookbehinds, checked before [`KEYWORD_RULES`].
const PAIR_RULES: &[(&str, &str, DefinitionKind)] = &[
    ("scattered", "function", DefinitionKind::ScatteredFunction),
    ("scattered", "union", DefinitionKind::Union),
    ("scattered", "enum", DefinitionKind::Enum),
    ("scattered", "mapping", DefinitionKind::Mapping),
    ("function", "clause", DefinitionKind::FunctionClause),
    ("mapping", "clause", DefinitionKind::MappingClause),
    ("union", "clause", DefinitionKind::Union),
    ("enum", "clause", DefinitionKind::Enum),
];

const KEYWORD_RULES: &[(&str, DefinitionKind)] = &[
    ("function", DefinitionKind::Function),
    ("val", DefinitionKind::Value),
    ("let", DefinitionKind::Variable),
    ("var", DefinitionKind::Variable),
    ("type", DefinitionKind::Type),
    ("newtype", DefinitionKind::Type),
    ("enum", DefinitionKind::Enum),
    ("union", DefinitionKind::Union),
    ("struct", DefinitionKind::Struct),
    ("bitfield", DefinitionKind::Bitfield),
    ("register", DefinitionKind::Register),
    ("mapping", DefinitionKind::Mapping),
    ("overload", DefinitionKind::Overload),
];

const FIXITY_KEYWORDS: &[&str] = &["infix", "infixl", "infixr"];

/// Tokens after which `let`/`var` binds inside an expression.
const EXPRESSION_CONTINUATIONS: &[&str] =
    &["=", "=>", "->", "in", "then", "else", ",", ":", "(", "{"];

/// Collect candidate definitions from one file's tokens, in source order.
///
/// This is a keyword-lookbehind heuristic over significant tokens, not a
/// parse: constructs the rules do not recognise are skipped.
pub fn extract(stream: &TokenStream) -> Vec<Definition> {
    let tokens = stream.tokens();
    let significant = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.is_trivia())
        .map(|(index, _)| index)
        .collect();
    Extractor {
        tokens,
        significant,
        body: BodyState::Idle,
        definitions: Vec::new(),
    }
    .run()
}

#[derive(Debug, Clone, Copy)]
enum Owner {
    Enum,
    Union,
}

impl Owner {
    fn member_kind(self) -> DefinitionKind {
        match self {
            Owner::Enum => DefinitionKind::EnumMember,
            Owner::Union => DefinitionKind::UnionConstructor,
        }
    }
}

/// Progress through `enum`/`union` heads towards their member list.
#[derive(Debug, Clone, Copy)]
enum BodyState {
    Idle,
    /// Saw the head name; type parameters may follow before `=`.
    AfterHead { owner: Owner, depth: u32 },
    AfterEquals { owner: Owner, depth: u32 },
    /// Inside the `{ ... }` member list; `depth` is the interior depth.
    InBody { owner: Owner, depth: u32 },
}

struct Extractor<'t> {
    tokens: &'t [Token],
    /// Indices into `tokens` of everything except comments and filler.
    significant: Vec<usize>,
    body: BodyState,
    definitions: Vec<Definition>,
}

impl<'t> Extractor<'t> {
    fn run(mut self) -> Vec<Definition> {
        for position in 0..self.significant.len() {
            if self.step_body(position) {
                continue;
            }
            if let Some((kind, name, span)) = self.match_rule(position) {
                self.emit(kind, name, span);
                if let Some(owner) = match kind {
                    DefinitionKind::Enum => Some(Owner::Enum),
                    DefinitionKind::Union => Some(Owner::Union),
                    _ => None,
                } {
                    self.body = BodyState::AfterHead {
                        owner,
                        depth: self.token(position).depth,
                    };
                }
            }
        }
        self.definitions
    }

    fn token(
        &self,
        position: usize,
    ) -> &'t Token {
        &self.tokens[self.significant[position]]
    }

    fn behind(
        &self,
        position: usize,
        distance: usize,
    ) -> Option<&'t Token> {
        position.checked_sub(distance).map(|p| self.token(p))
    }

    fn ahead(
        &self,
        position: usize,
    ) -> Option<&'t Token> {
        self.significant
            .get(position + 1)
            .map(|&index| &self.tokens[index])
    }

    fn emit(
        &mut self,
        kind: DefinitionKind,
        name: String,
        span: Span,
    ) {
        self.definitions.push(Definition { name, span, kind });
    }

    /// Returns `true` when the token was consumed by member tracking.
    fn step_body(
        &mut self,
        position: usize,
    ) -> bool {
        let token = self.token(position);
        match self.body {
            BodyState::Idle => false,
            BodyState::AfterHead { owner, depth } => {
                let in_parameters = token.depth > depth
                    || (token.depth == depth
                        && (token.is_keyword_or_op("(") || token.is_keyword_or_op(")")));
                if in_parameters {
                    return true;
                }
                if token.depth == depth && token.is_keyword_or_op("=") {
                    self.body = BodyState::AfterEquals { owner, depth };
                    return true;
                }
                self.body = BodyState::Idle;
                false
            },
            BodyState::AfterEquals { owner, depth } => {
                if token.depth == depth && token.is_keyword_or_op("{") {
                    self.body = BodyState::InBody {
                        owner,
                        depth: depth + 1,
                    };
                    return true;
                }
                self.body = BodyState::Idle;
                if token.kind == TokenKind::Identifier {
                    self.emit(owner.member_kind(), token.text.clone(), token.span);
                    return true;
                }
                false
            },
            BodyState::InBody { owner, depth } => {
                if token.depth < depth {
                    self.body = BodyState::Idle;
                    return true;
                }
                if token.depth == depth && token.kind == TokenKind::Identifier {
                    let is_member = match owner {
                        Owner::Enum => self.behind(position, 1).is_some_and(|prev| {
                            prev.is_keyword_or_op("{") || prev.is_keyword_or_op(",")
                        }),
                        Owner::Union => self
                            .ahead(position)
                            .is_some_and(|next| next.is_keyword_or_op(":")),
                    };
                    if is_member {
                        self.emit(owner.member_kind(), token.text.clone(), token.span);
                    }
                }
                true
            },
        }
    }

    fn match_rule(
        &self,
        position: usize,
    ) -> Option<(DefinitionKind, String, Span)> {
        let current = self.token(position);
        let last = self.behind(position, 1)?;
        let second_last = self.behind(position, 2);

        if starts_operator_name(second_last, last, current) {
            let (name, span) = self.operator_name(self.significant[position - 1])?;
            return Some((DefinitionKind::Operator, name, span));
        }

        if current.kind != TokenKind::Identifier {
            return None;
        }

        if let Some(second_last) = second_last
            && let Some((_, _, kind)) = PAIR_RULES.iter().find(|(first, second, _)| {
                second_last.is_keyword_or_op(first) && last.is_keyword_or_op(second)
            })
        {
            return Some((*kind, current.text.clone(), current.span));
        }

        let (_, kind) = KEYWORD_RULES
            .iter()
            .find(|(keyword, _)| last.is_keyword_or_op(keyword))?;
        if *kind == DefinitionKind::Variable && !is_top_level_binding(second_last, last) {
            return None;
        }
        Some((*kind, current.text.clone(), current.span))
    }

    /// Operator names are not single tokens (`<_s`, `==`): glue together
    /// the adjacent tokens that follow `after`, stopping at whitespace.
    fn operator_name(
        &self,
        after: usize,
    ) -> Option<(String, Span)> {
        let mut rest = self.tokens[after + 1..]
            .iter()
            .skip_while(|token| is_blank(token));
        let first = rest.next().filter(|token| can_glue(token))?;
        let mut name = first.text.clone();
        let mut span = first.span;
        for token in rest.take_while(|token| can_glue(token)) {
            name.push_str(&token.text);
            span.end = token.span.end;
        }
        Some((name, span))
    }
}

fn starts_operator_name(
    second_last: Option<&Token>,
    last: &Token,
    current: &Token,
) -> bool {
    if last.is_keyword_or_op("operator") {
        return true;
    }
    if is_fixity(last) {
        return current.kind != TokenKind::Number;
    }
    last.kind == TokenKind::Number && second_last.is_some_and(is_fixity)
}

fn is_fixity(token: &Token) -> bool {
    FIXITY_KEYWORDS
        .iter()
        .any(|keyword| token.is_keyword_or_op(keyword))
}

fn is_top_level_binding(
    before_keyword: Option<&Token>,
    keyword: &Token,
) -> bool {
    keyword.depth == 0
        && !before_keyword.is_some_and(|token| {
            EXPRESSION_CONTINUATIONS
                .iter()
                .any(|text| token.is_keyword_or_op(text))
        })
}

fn is_blank(token: &Token) -> bool {
    token.kind == TokenKind::Filler && token.text.trim().is_empty()
}

fn can_glue(token: &Token) -> bool {
    !is_blank(token)
        && !matches!(token.kind, TokenKind::Comment | TokenKind::String)
        && !token.is_open_bracket()
        && !token.is_close_bracket()
}

#[cfg(test)]
#[path = "../../tests/src/definitions/extractor_tests.rs"]
mod tests;
