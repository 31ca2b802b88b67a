//! Discovering, loading and indexing `.sail` files from disk.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tower_lsp::{Client, lsp_types::Url};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::analysis::{Analysis, ParsedFile};
use crate::document::DocumentStore;
use crate::progress::{ProgressToken, percent};
use crate::vfs::{FileId, normalized_path};

use super::settings::ServerSettings;
use super::state::SailLanguageServer;

pub(crate) const SAIL_EXTENSION: &str = "sail";
const PROGRESS_REPORT_EVERY: usize = 5;

#[derive(Debug)]
pub(crate) enum LoadError {
    Read(std::io::Error),
    TooLarge { size: u64, limit: u64 },
    NotUtf8,
}

impl fmt::Display for LoadError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            LoadError::Read(error) => write!(f, "read failed: {error}"),
            LoadError::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, above the {limit} byte limit")
            },
            LoadError::NotUtf8 => f.write_str("file is not valid UTF-8"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Read(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::Read(error)
    }
}

/// Read a source file, refusing anything above `max_bytes` or not UTF-8.
pub(crate) async fn load_file(
    path: &Path,
    max_bytes: u64,
) -> Result<String, LoadError> {
    let size = tokio::fs::metadata(path).await?.len();
    if size > max_bytes {
        return Err(LoadError::TooLarge { size, limit: max_bytes });
    }
    let bytes = tokio::fs::read(path).await?;
    String::from_utf8(bytes).map_err(|_| LoadError::NotUtf8)
}

pub(crate) fn is_sail_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SAIL_EXTENSION)
}

/// All `.sail` files under `roots`, canonicalized, deduplicated and sorted.
///
/// The sort makes the scan order, and with it the definition tie-break,
/// independent of directory iteration order.
pub(crate) fn discover_sail_files(
    roots: &[PathBuf],
    max_file_size_bytes: u64,
    excluded_prefixes: &[PathBuf],
) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for root in roots {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| should_descend_into_workspace_entry(entry, excluded_prefixes))
            .filter_map(|entry| entry.ok())
        {
            if !entry.file_type().is_file() || !is_sail_file(entry.path()) {
                continue;
            }

            if let Ok(metadata) = entry.metadata()
                && metadata.len() > max_file_size_bytes
            {
                debug!(
                    "Skipping large workspace file ({} bytes): {}",
                    metadata.len(),
                    entry.path().display()
                );
                continue;
            }

            let normalized = normalized_path(entry.path());
            if seen.insert(normalized.clone()) {
                files.push(normalized);
            }
        }
    }

    files.sort();
    files
}

fn should_descend_into_workspace_entry(
    entry: &DirEntry,
    excluded_prefixes: &[PathBuf],
) -> bool {
    if is_path_excluded(&normalized_path(entry.path()), excluded_prefixes) {
        return false;
    }

    // The root itself is always walked, even when it is a dot directory.
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return true;
    }

    let Some(name) = entry.file_name().to_str() else {
        return false;
    };

    if name.starts_with('.') {
        return false;
    }

    !matches!(name, "target" | "build" | "_build" | "node_modules" | "_opam" | "out")
}

pub(crate) fn build_workspace_scan_exclude_prefixes(
    workspace_roots: &[PathBuf],
    exclude_paths: &[String],
) -> Vec<PathBuf> {
    let mut excluded_prefixes = Vec::new();
    let mut seen = HashSet::new();

    for raw_path in exclude_paths {
        let exclude_path = PathBuf::from(raw_path);
        let candidates: Vec<PathBuf> = if exclude_path.is_absolute() {
            vec![exclude_path]
        } else {
            workspace_roots.iter().map(|root| root.join(&exclude_path)).collect()
        };
        for candidate in candidates {
            let normalized = normalized_path(&candidate);
            if seen.insert(normalized.clone()) {
                excluded_prefixes.push(normalized);
            }
        }
    }

    excluded_prefixes
}

fn is_path_excluded(
    path: &Path,
    excluded_prefixes: &[PathBuf],
) -> bool {
    excluded_prefixes.iter().any(|prefix| path.starts_with(prefix))
}

pub(crate) fn is_under_roots(
    path: &Path,
    roots: &[PathBuf],
) -> bool {
    let path = normalized_path(path);
    roots.iter().any(|root| path.starts_with(normalized_path(root)))
}

pub(crate) fn is_open_in_editor(
    document_store: &DocumentStore,
    path: &Path,
) -> bool {
    Url::from_file_path(path).is_ok_and(|uri| document_store.is_open(&uri))
}

impl SailLanguageServer {
    /// Create a lightweight handle suitable for passing into `tokio::spawn`.
    pub(crate) async fn clone_for_background(&self) -> BackgroundHandle {
        let roots = self.root_paths().await;
        self.clone_for_background_with_roots(roots).await
    }

    pub(crate) async fn clone_for_background_with_roots(
        &self,
        workspace_roots: Vec<PathBuf>,
    ) -> BackgroundHandle {
        BackgroundHandle {
            client: self.client.clone(),
            analysis: Arc::clone(&self.analysis),
            document_store: Arc::clone(&self.document_store),
            workspace_roots,
            settings: self.settings_snapshot().await,
        }
    }

    /// Re-index `path` from disk unless the editor owns its contents.
    /// Returns whether the index changed.
    pub(crate) async fn reload_from_disk(
        &self,
        path: &Path,
    ) -> bool {
        if is_open_in_editor(&self.document_store, path) {
            return false;
        }
        let max_bytes = self.settings_snapshot().await.indexing.max_file_size_bytes();
        let file = FileId::from_path(path);
        match load_file(path, max_bytes).await {
            Ok(text) => {
                let installed = self.analysis.install_unless(file, ParsedFile::parse(text), || {
                    is_open_in_editor(&self.document_store, path)
                });
                match installed {
                    Some(count) => {
                        debug!("Re-indexed {} from disk ({count} definitions)", path.display());
                        true
                    },
                    None => false,
                }
            },
            Err(error) => {
                debug!("Dropping {} from the index: {error}", path.display());
                self.analysis.file_closed(&file)
            },
        }
    }

    /// Drop every tracked file under one of `roots` that is not open.
    pub(crate) fn forget_files_under(
        &self,
        roots: &[PathBuf],
    ) -> usize {
        let mut removed = 0;
        for file in self.analysis.tracked_files() {
            let Some(path) = file.to_path() else {
                continue;
            };
            if !is_under_roots(&path, roots) || is_open_in_editor(&self.document_store, &path) {
                continue;
            }
            if self.analysis.file_closed(&file) {
                removed += 1;
            }
        }
        removed
    }
}

/// State needed by a workspace scan without borrowing the server.
pub(crate) struct BackgroundHandle {
    client: Client,
    analysis: Arc<Analysis>,
    document_store: Arc<DocumentStore>,
    workspace_roots: Vec<PathBuf>,
    settings: ServerSettings,
}

impl BackgroundHandle {
    /// Index every `.sail` file under the handle's roots.
    pub async fn index_workspace(&self) {
        if !self.settings.indexing.enabled {
            info!("Skipping workspace scan because sail-analyzer.indexing.enabled=false");
            return;
        }

        let excluded_prefixes =
            build_workspace_scan_exclude_prefixes(&self.workspace_roots, &self.settings.indexing.exclude_paths);
        let sail_files = discover_sail_files(
            &self.workspace_roots,
            self.settings.indexing.max_file_size_bytes(),
            &excluded_prefixes,
        );
        if sail_files.is_empty() {
            info!("No .sail files found in workspace");
            return;
        }

        self.run_workspace_indexing(sail_files).await;
    }

    /// Files are read and tokenized concurrently, but installed strictly in
    /// `sail_files` order so that scan order decides file ordinals.
    async fn run_workspace_indexing(
        &self,
        sail_files: Vec<PathBuf>,
    ) {
        let total = sail_files.len();
        info!("Indexing {total} .sail file(s) in workspace…");
        let progress = ProgressToken::begin(&self.client, "Indexing", Some(format!("0 / {total} files"))).await;

        let semaphore = Arc::new(Semaphore::new(self.settings.indexing.concurrency));
        let max_bytes = self.settings.indexing.max_file_size_bytes();
        let mut handles = Vec::with_capacity(total);

        for path in sail_files {
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let parsed = match load_file(&path, max_bytes).await {
                    Ok(text) => Ok(ParsedFile::parse(text)),
                    Err(error) => Err(error),
                };
                (path, parsed)
            }));
        }

        let mut indexed = 0usize;
        let mut skipped_open = 0usize;
        for (done, handle) in handles.into_iter().enumerate() {
            let done = done + 1;
            match handle.await {
                Ok((path, Ok(parsed))) => {
                    // The editor buffer opened during the scan wins over the disk text.
                    let installed = self.analysis.install_unless(FileId::from_path(&path), parsed, || {
                        is_open_in_editor(&self.document_store, &path)
                    });
                    match installed {
                        Some(_) => indexed += 1,
                        None => skipped_open += 1,
                    }
                },
                Ok((path, Err(error))) => warn!("Failed to index {}: {error}", path.display()),
                Err(error) => warn!("Indexing task failed: {error}"),
            }
            if done % PROGRESS_REPORT_EVERY == 0 || done == total {
                progress
                    .report(Some(format!("{done} / {total} files")), Some(percent(done, total)))
                    .await;
            }
        }

        let index = self.analysis.index();
        info!(
            "Workspace index complete: {indexed} file(s) indexed, {skipped_open} open file(s) skipped, \
             {} definition(s) across {} file(s)",
            index.site_count(),
            index.file_count()
        );
        progress.end(Some(format!("{indexed} file(s) indexed"))).await;
    }
}

#[cfg(test)]
#[path = "../../tests/src/server/workspace_tests.rs"]
mod tests;
