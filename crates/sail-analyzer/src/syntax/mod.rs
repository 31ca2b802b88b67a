//! Lexical layer: classified tokens and bracket depth, without a grammar.

pub mod kind;
mod lexer;
pub mod token;
pub mod tokenizer;

pub use kind::{CommentStyle, TokenKind};
pub use token::{AnomalyKind, LexicalAnomaly, Span, Token, TokenStream};
pub use tokenizer::tokenize;
