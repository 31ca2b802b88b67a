use tower_lsp::lsp_types::{GotoDefinitionResponse, Location, Range};

use crate::analysis::{Analysis, DefinitionLocation, FileSnapshot};
use crate::definitions::DefinitionSite;
use crate::syntax::Span;
use crate::vfs::FileId;

pub fn span_to_range(
    snapshot: &FileSnapshot,
    span: Span,
) -> Range {
    Range::new(snapshot.position_of(span.start), snapshot.position_of(span.end))
}

/// LSP location of a span in a tracked file. `None` if the file has no
/// snapshot or no URL form.
pub fn span_to_location(
    analysis: &Analysis,
    file: &FileId,
    span: Span,
) -> Option<Location> {
    let snapshot = analysis.snapshot(file)?;
    let uri = file.to_url()?;
    Some(Location {
        uri,
        range: span_to_range(&snapshot, span),
    })
}

pub fn definition_location_to_lsp(
    analysis: &Analysis,
    location: &DefinitionLocation,
) -> Option<Location> {
    span_to_location(analysis, &location.file, location.span)
}

pub fn site_to_lsp(
    analysis: &Analysis,
    site: &DefinitionSite,
) -> Option<Location> {
    span_to_location(analysis, &site.file, site.span)
}

pub fn locations_to_response(locations: Vec<Location>) -> Option<GotoDefinitionResponse> {
    if locations.is_empty() {
        None
    } else if locations.len() == 1 {
        locations.into_iter().next().map(GotoDefinitionResponse::Scalar)
    } else {
        Some(GotoDefinitionResponse::Array(locations))
    }
}
