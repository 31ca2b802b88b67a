mod provider;

pub use provider::{SymbolProvider, symbol_kind};
