//! Conversions between analysis results and LSP types.

pub mod lsp;
