pub mod analysis;
pub mod definitions;
pub mod document;
pub mod ide;
pub mod index;
pub mod progress;
pub mod server;
pub mod symbols;
pub mod syntax;
pub mod vfs;

pub use analysis::{Analysis, CandidatePolicy, DefinitionLocation, FileSnapshot, ParsedFile};
pub use definitions::{Definition, DefinitionKind, DefinitionSite};
pub use index::WorkspaceIndex;
pub use server::SailLanguageServer;
pub use symbols::SymbolProvider;
pub use syntax::{Token, TokenKind, TokenStream, tokenize};
pub use vfs::FileId;
