pub(crate) mod document_store;
pub(crate) mod line_index;
pub(crate) mod text_document;

pub use document_store::DocumentStore;
pub use line_index::LineIndex;
pub use text_document::Document;
