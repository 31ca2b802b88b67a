use std::{
    path::PathBuf,
    sync::{Arc, atomic::AtomicBool},
};

use tokio::sync::RwLock;
use tower_lsp::{Client, lsp_types::WorkspaceFolder};

use crate::{analysis::Analysis, document::DocumentStore, server::settings::ServerSettings, symbols::SymbolProvider};

/// The sail-analyzer backend that implements the Language Server Protocol.
pub struct SailLanguageServer {
    /// The LSP client handle, used to send notifications (e.g. diagnostics) back.
    pub(crate) client: Client,

    /// Editor-open documents with their latest buffer text.
    pub(crate) document_store: Arc<DocumentStore>,

    /// Token snapshots and the workspace definition index.
    pub(crate) analysis: Arc<Analysis>,

    pub(crate) symbol_provider: SymbolProvider,

    /// Workspace root folders, populated during `initialize`.
    pub(crate) workspace_roots: Arc<RwLock<Vec<WorkspaceFolder>>>,

    /// Runtime server settings updated from LSP configuration.
    pub(crate) settings: Arc<RwLock<ServerSettings>>,

    /// Whether the client accepts a dynamic `workspace/didChangeWatchedFiles`
    /// registration, recorded during `initialize`.
    pub(crate) watch_files: AtomicBool,

    /// Mirror info-level events to the client as `window/logMessage`.
    pub(crate) log_messages: bool,
}

impl SailLanguageServer {
    pub fn new(
        client: Client,
        log_messages: bool,
    ) -> Self {
        let analysis = Arc::new(Analysis::new());
        Self {
            client,
            document_store: Arc::new(DocumentStore::new()),
            symbol_provider: SymbolProvider::new(Arc::clone(&analysis)),
            analysis,
            workspace_roots: Arc::new(RwLock::new(Vec::new())),
            settings: Arc::new(RwLock::new(ServerSettings::default())),
            watch_files: AtomicBool::new(false),
            log_messages,
        }
    }

    /// Shared analysis host, mainly for embedding and tests.
    pub fn analysis(&self) -> &Arc<Analysis> {
        &self.analysis
    }

    pub(crate) async fn settings_snapshot(&self) -> ServerSettings {
        self.settings.read().await.clone()
    }

    pub(crate) async fn apply_settings(
        &self,
        settings: ServerSettings,
    ) {
        *self.settings.write().await = settings;
    }

    pub(crate) async fn root_paths(&self) -> Vec<PathBuf> {
        self.workspace_roots
            .read()
            .await
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect()
    }
}
