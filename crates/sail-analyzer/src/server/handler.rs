use std::{panic::AssertUnwindSafe, path::PathBuf, sync::atomic::Ordering};

use futures::FutureExt;
use tower_lsp::{LanguageServer, jsonrpc::Result, lsp_types::*};
use tracing::{debug, info, warn};

use crate::{
    ide::lsp::{definition_location_to_lsp, locations_to_response},
    server::{
        settings::ServerSettings,
        state::SailLanguageServer,
        workspace::{is_open_in_editor, is_sail_file, is_under_roots},
    },
    vfs::FileId,
};

const CLIENT_NOTIFICATION_PREFIX: &str = "sail-analyzer:";
const WATCHED_FILES_REGISTRATION_ID: &str = "sail-analyzer/watched-files";
const WATCHED_FILES_GLOB: &str = "**/*.sail";

#[tower_lsp::async_trait]
impl LanguageServer for SailLanguageServer {
    async fn initialize(
        &self,
        params: InitializeParams,
    ) -> Result<InitializeResult> {
        info!("Initializing sail-analyzer...");

        let initial_settings = ServerSettings::from_lsp_payload(params.initialization_options.as_ref());
        self.apply_settings(initial_settings).await;

        if let Some(folders) = params.workspace_folders {
            *self.workspace_roots.write().await = folders;
        } else if let Some(root) = params.root_uri {
            *self.workspace_roots.write().await = vec![WorkspaceFolder {
                uri: root,
                name: "root".to_string(),
            }];
        }

        let watch_files = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.did_change_watched_files.as_ref())
            .and_then(|watched| watched.dynamic_registration)
            .unwrap_or(false);
        self.watch_files.store(watch_files, Ordering::Relaxed);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::Supported(true)),
                    ..Default::default()
                })),
                definition_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                workspace: Some(WorkspaceServerCapabilities {
                    workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                        supported: Some(true),
                        change_notifications: Some(OneOf::Left(true)),
                    }),
                    file_operations: None,
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "sail-analyzer".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(
        &self,
        _: InitializedParams,
    ) {
        info!("sail-analyzer initialized");

        if self.watch_files.load(Ordering::Relaxed) {
            // Awaiting the registration here would block until the client
            // answers, which some clients only do after `initialized` returns.
            let client = self.client.clone();
            tokio::spawn(async move {
                register_file_watcher(client).await;
            });
        }

        let handle = self.clone_for_background().await;
        tokio::spawn(async move {
            handle.index_workspace().await;
        });
    }

    async fn did_change_configuration(
        &self,
        params: DidChangeConfigurationParams,
    ) {
        let current = self.settings_snapshot().await;
        let merged = current.merged_with_payload(&params.settings);
        if merged == current {
            return;
        }

        let should_rescan = merged.indexing.enabled && merged.indexing != current.indexing;
        let lexical_toggled = merged.diagnostics.lexical != current.diagnostics.lexical;
        self.apply_settings(merged.clone()).await;
        info!("Applied updated sail-analyzer settings");

        if lexical_toggled {
            for uri in self.document_store.open_uris() {
                if merged.diagnostics.lexical {
                    self.publish_diagnostics(&uri, None).await;
                } else {
                    self.clear_diagnostics(&uri).await;
                }
            }
        }

        if should_rescan {
            let handle = self.clone_for_background().await;
            tokio::spawn(async move {
                handle.index_workspace().await;
            });
        }
    }

    async fn did_change_workspace_folders(
        &self,
        params: DidChangeWorkspaceFoldersParams,
    ) {
        let event = params.event;
        {
            let mut roots = self.workspace_roots.write().await;
            roots.retain(|folder| !event.removed.iter().any(|removed| removed.uri == folder.uri));
            for added in &event.added {
                if !roots.iter().any(|folder| folder.uri == added.uri) {
                    roots.push(added.clone());
                }
            }
        }

        let removed: Vec<PathBuf> = event
            .removed
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
        if !removed.is_empty() {
            let dropped = self.forget_files_under(&removed);
            info!("Removed {} workspace folder(s), dropped {dropped} file(s)", removed.len());
        }

        let added: Vec<PathBuf> = event
            .added
            .iter()
            .filter_map(|folder| folder.uri.to_file_path().ok())
            .collect();
        if !added.is_empty() {
            let handle = self.clone_for_background_with_roots(added).await;
            tokio::spawn(async move {
                handle.index_workspace().await;
            });
        }
    }

    async fn did_change_watched_files(
        &self,
        params: DidChangeWatchedFilesParams,
    ) {
        let indexing_enabled = self.settings_snapshot().await.indexing.enabled;
        for change in params.changes {
            let Ok(path) = change.uri.to_file_path() else {
                continue;
            };
            if !is_sail_file(&path) || is_open_in_editor(&self.document_store, &path) {
                continue;
            }

            match change.typ {
                FileChangeType::DELETED => {
                    if self.analysis.file_closed(&FileId::from_path(&path)) {
                        debug!("Dropped deleted file {}", path.display());
                    }
                },
                _ if indexing_enabled => {
                    self.reload_from_disk(&path).await;
                },
                _ => {},
            }
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down sail-analyzer");
        Ok(())
    }

    async fn did_open(
        &self,
        params: DidOpenTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        let filename = short_name(&uri);

        self.document_store.open(uri.clone(), text.clone(), version);
        let count = self.analysis.file_opened(FileId::from_url(&uri), &text);
        info!("Opened {filename} (v{version}, {} bytes, {count} definitions)", text.len());

        self.publish_diagnostics(&uri, Some(version)).await;
        self.log_to_client(format!("Opened {filename}")).await;
    }

    async fn did_change(
        &self,
        params: DidChangeTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let Some(text) = self.document_store.apply_changes(&uri, params.content_changes, version) else {
            warn!("Change for unopened document {uri}");
            return;
        };
        let count = self.analysis.file_changed(FileId::from_url(&uri), &text);
        debug!("Re-indexed {} (v{version}, {count} definitions)", short_name(&uri));

        self.publish_diagnostics(&uri, Some(version)).await;
    }

    async fn did_save(
        &self,
        params: DidSaveTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        debug!("Saved {}", short_name(&uri));
        self.log_to_client(format!("Saved {}", short_name(&uri))).await;
    }

    async fn did_close(
        &self,
        params: DidCloseTextDocumentParams,
    ) {
        let uri = params.text_document.uri;
        self.document_store.close(&uri);

        let settings = self.settings_snapshot().await;
        let roots = self.root_paths().await;
        let revertible = uri.to_file_path().ok().filter(|path| {
            settings.indexing.enabled
                && is_sail_file(path)
                && path.is_file()
                && is_under_roots(path, &roots)
        });

        match revertible {
            Some(path) => {
                self.reload_from_disk(&path).await;
            },
            None => {
                self.analysis.file_closed(&FileId::from_url(&uri));
            },
        }
        self.clear_diagnostics(&uri).await;
        debug!("Closed {}", short_name(&uri));
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let filename = short_name(&uri);

        let file = FileId::from_url(&uri);
        let Some(snapshot) = self.analysis.snapshot(&file) else {
            debug!("goto-def {filename}: file is not tracked");
            return Ok(None);
        };
        let Some(offset) = snapshot.offset_of(position) else {
            debug!("goto-def {filename}:{}:{} is outside the document", position.line + 1, position.character + 1);
            return Ok(None);
        };

        let policy = self.settings_snapshot().await.navigation.candidates;
        let start = std::time::Instant::now();
        let locations: Vec<Location> = self
            .analysis
            .resolve_definition_with(&file, offset, policy)
            .iter()
            .filter_map(|location| definition_location_to_lsp(&self.analysis, location))
            .collect();
        let elapsed = start.elapsed();

        let response = locations_to_response(locations);
        match &response {
            Some(GotoDefinitionResponse::Scalar(location)) => debug!(
                "goto-def {filename}:{}:{} → {}:{} ({elapsed:?})",
                position.line + 1,
                position.character + 1,
                short_name(&location.uri),
                location.range.start.line + 1
            ),
            Some(GotoDefinitionResponse::Array(locations)) => debug!(
                "goto-def {filename}:{}:{} → {} locations ({elapsed:?})",
                position.line + 1,
                position.character + 1,
                locations.len()
            ),
            Some(GotoDefinitionResponse::Link(links)) => debug!("goto-def {filename} → {} links", links.len()),
            None => debug!("goto-def {filename}:{}:{} → none ({elapsed:?})", position.line + 1, position.character + 1),
        }
        Ok(response)
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let uri = params.text_document.uri;
        let symbols = self.symbol_provider.document_symbols(&uri);
        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        Ok(Some(self.symbol_provider.workspace_symbols(&params.query)))
    }
}

impl SailLanguageServer {
    async fn log_to_client(
        &self,
        message: String,
    ) {
        if !self.log_messages || !self.settings_snapshot().await.logging.level.allows_info() {
            return;
        }
        let _ = AssertUnwindSafe(
            self.client
                .log_message(MessageType::INFO, prefixed_client_message(message)),
        )
        .catch_unwind()
        .await;
    }
}

async fn register_file_watcher(client: tower_lsp::Client) {
    let options = DidChangeWatchedFilesRegistrationOptions {
        watchers: vec![FileSystemWatcher {
            glob_pattern: GlobPattern::String(WATCHED_FILES_GLOB.to_string()),
            kind: None,
        }],
    };
    let registration = Registration {
        id: WATCHED_FILES_REGISTRATION_ID.to_string(),
        method: "workspace/didChangeWatchedFiles".to_string(),
        register_options: serde_json::to_value(options).ok(),
    };

    match AssertUnwindSafe(client.register_capability(vec![registration]))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => debug!("Registered watcher for {WATCHED_FILES_GLOB}"),
        Ok(Err(error)) => warn!("Client rejected file watcher registration: {error}"),
        Err(_) => warn!("register_capability panicked (client may have disconnected)"),
    }
}

fn short_name(uri: &Url) -> String {
    uri.path().rsplit('/').next().unwrap_or(uri.path()).to_owned()
}

fn prefixed_client_message(message: impl AsRef<str>) -> String {
    format!("{CLIENT_NOTIFICATION_PREFIX} {}", message.as_ref())
}
