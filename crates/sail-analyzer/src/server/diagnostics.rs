use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, Url};
use tracing::{debug, warn};

use crate::analysis::FileSnapshot;
use crate::ide::lsp::span_to_range;
use crate::vfs::FileId;

use super::state::SailLanguageServer;

const DIAGNOSTIC_SOURCE: &str = "sail-analyzer";

/// Unterminated literals and unbalanced brackets of one file version.
pub(crate) fn lexical_diagnostics(snapshot: &FileSnapshot) -> Vec<Diagnostic> {
    snapshot
        .tokens()
        .anomalies()
        .iter()
        .map(|anomaly| Diagnostic {
            range: span_to_range(snapshot, anomaly.span),
            severity: Some(DiagnosticSeverity::WARNING),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: anomaly.kind.message().to_string(),
            ..Default::default()
        })
        .collect()
}

impl SailLanguageServer {
    /// Publish the lexical diagnostics of the current snapshot of `uri`.
    pub(crate) async fn publish_diagnostics(
        &self,
        uri: &Url,
        version: Option<i32>,
    ) {
        if !self.settings_snapshot().await.diagnostics.lexical {
            return;
        }
        let Some(snapshot) = self.analysis.snapshot(&FileId::from_url(uri)) else {
            debug!("No snapshot to diagnose for {uri}");
            return;
        };
        let diagnostics = lexical_diagnostics(&snapshot);
        debug!("Publishing {} diagnostic(s) for {uri}", diagnostics.len());

        let result = AssertUnwindSafe(self.client.publish_diagnostics(uri.clone(), diagnostics, version))
            .catch_unwind()
            .await;
        if result.is_err() {
            warn!("publish_diagnostics panicked (client may have disconnected)");
        }
    }

    /// Clear any previously published diagnostics for a document.
    pub(crate) async fn clear_diagnostics(
        &self,
        uri: &Url,
    ) {
        let result = AssertUnwindSafe(self.client.publish_diagnostics(uri.clone(), Vec::new(), None))
            .catch_unwind()
            .await;
        if result.is_err() {
            warn!("publish_diagnostics panicked (client may have disconnected)");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/diagnostics_tests.rs"]
mod tests;
