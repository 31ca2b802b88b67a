mod extractor;
mod site;

pub use extractor::extract;
pub use site::{Definition, DefinitionKind, DefinitionSite, Sequence};
