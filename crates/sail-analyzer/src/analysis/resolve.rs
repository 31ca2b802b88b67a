use serde::Deserialize;

use crate::definitions::{DefinitionKind, DefinitionSite};
use crate::index::WorkspaceIndex;
use crate::syntax::{Span, TokenStream};
use crate::vfs::FileId;

/// How many candidates a definition request returns when a name is defined
/// more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidatePolicy {
    /// The first site in scan order.
    #[default]
    First,
    /// Every site, in scan order.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionLocation {
    pub file: FileId,
    pub offset: usize,
    /// Span of the defining name.
    pub span: Span,
    pub kind: DefinitionKind,
}

impl From<&DefinitionSite> for DefinitionLocation {
    fn from(site: &DefinitionSite) -> Self {
        Self {
            file: site.file.clone(),
            offset: site.offset(),
            span: site.span,
            kind: site.kind,
        }
    }
}

/// Resolve the name under `offset` in `tokens` against `index`.
///
/// Only identifier and type-variable tokens resolve; strings, comments,
/// keywords and whitespace yield nothing. The result never contains a site
/// that is not in the index.
pub fn resolve(
    index: &WorkspaceIndex,
    tokens: &TokenStream,
    offset: usize,
    policy: CandidatePolicy,
) -> Vec<DefinitionLocation> {
    let Some(token) = tokens.name_at(offset) else {
        return Vec::new();
    };

    let candidates = index.lookup(&token.text);
    if candidates.len() > 1 {
        tracing::trace!(
            "[resolve] {} candidates for '{}', policy={policy:?}",
            candidates.len(),
            token.text
        );
    }

    let limit = match policy {
        CandidatePolicy::First => 1,
        CandidatePolicy::All => candidates.len(),
    };
    candidates
        .iter()
        .take(limit)
        .map(|site| DefinitionLocation::from(site.as_ref()))
        .collect()
}
