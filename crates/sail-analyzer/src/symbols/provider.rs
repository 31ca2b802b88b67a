use std::sync::Arc;

use tower_lsp::lsp_types::{SymbolInformation, SymbolKind, Url};
use tracing::debug;

use crate::analysis::Analysis;
use crate::definitions::{DefinitionKind, DefinitionSite};
use crate::ide::lsp::site_to_lsp;
use crate::vfs::FileId;

const WORKSPACE_SYMBOL_LIMIT: usize = 100;

/// Document and workspace symbols, read straight from the definition index.
#[derive(Clone)]
pub struct SymbolProvider {
    analysis: Arc<Analysis>,
}

impl SymbolProvider {
    pub fn new(analysis: Arc<Analysis>) -> Self {
        Self { analysis }
    }

    /// Returns symbols for the given document in source order.
    pub fn document_symbols(&self, uri: &Url) -> Vec<SymbolInformation> {
        let file = FileId::from_url(uri);
        self.analysis
            .file_sites(&file)
            .iter()
            .filter_map(|site| self.to_symbol_information(site))
            .collect()
    }

    pub fn workspace_symbols(&self, query: &str) -> Vec<SymbolInformation> {
        let hits = self.analysis.workspace_symbols(query, WORKSPACE_SYMBOL_LIMIT);
        debug!("[workspace-symbols] '{query}' → {} hit(s)", hits.len());
        hits.iter()
            .filter_map(|site| self.to_symbol_information(site))
            .collect()
    }

    // `SymbolInformation::deprecated` is itself deprecated but still required.
    #[allow(deprecated)]
    fn to_symbol_information(&self, site: &DefinitionSite) -> Option<SymbolInformation> {
        let location = site_to_lsp(&self.analysis, site)?;
        Some(SymbolInformation {
            name: site.name.clone(),
            kind: symbol_kind(site.kind),
            tags: None,
            deprecated: None,
            location,
            container_name: Some(site.kind.to_string()),
        })
    }
}

pub fn symbol_kind(kind: DefinitionKind) -> SymbolKind {
    match kind {
        DefinitionKind::Function
        | DefinitionKind::ScatteredFunction
        | DefinitionKind::FunctionClause
        | DefinitionKind::Value => SymbolKind::FUNCTION,
        DefinitionKind::Variable => SymbolKind::VARIABLE,
        DefinitionKind::Type => SymbolKind::TYPE_PARAMETER,
        DefinitionKind::Enum => SymbolKind::ENUM,
        DefinitionKind::EnumMember => SymbolKind::ENUM_MEMBER,
        DefinitionKind::Union => SymbolKind::CLASS,
        DefinitionKind::UnionConstructor => SymbolKind::CONSTRUCTOR,
        DefinitionKind::Struct | DefinitionKind::Bitfield => SymbolKind::STRUCT,
        DefinitionKind::Register => SymbolKind::FIELD,
        DefinitionKind::Mapping | DefinitionKind::MappingClause => SymbolKind::INTERFACE,
        DefinitionKind::Overload => SymbolKind::FUNCTION,
        DefinitionKind::Operator => SymbolKind::OPERATOR,
    }
}
