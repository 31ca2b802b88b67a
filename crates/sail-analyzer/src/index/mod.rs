//! Workspace-wide map from names to candidate definition sites.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::definitions::{Definition, DefinitionSite, Sequence};
use crate::vfs::FileId;

/// Candidate definitions for every tracked file.
///
/// Sites for a name are kept in [`Sequence`] order, so the first entry of a
/// lookup is the definition discovered first. Every mutation replaces the
/// complete site set of one file under a single write lock; readers observe
/// either the old or the new set, never a mix.
#[derive(Default)]
pub struct WorkspaceIndex {
    state: RwLock<IndexState>,
}

#[derive(Default)]
struct IndexState {
    /// Keyed by [`Sequence`] so one file's sites come and go without
    /// touching the other files' sites of the same name.
    by_name: HashMap<String, BTreeMap<Sequence, Arc<DefinitionSite>>>,
    files: HashMap<FileId, FileEntry>,
    next_ordinal: u32,
}

struct FileEntry {
    ordinal: u32,
    /// Source order.
    sites: Vec<Arc<DefinitionSite>>,
}

impl IndexState {
    fn detach(
        &mut self,
        file: &FileId,
    ) -> Option<FileEntry> {
        let entry = self.files.remove(file)?;
        for site in &entry.sites {
            if let Some(sites) = self.by_name.get_mut(site.name.as_str()) {
                sites.remove(&site.sequence);
                if sites.is_empty() {
                    self.by_name.remove(site.name.as_str());
                }
            }
        }
        Some(entry)
    }
}

impl WorkspaceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace every site of `file` with `definitions`.
    ///
    /// A file keeps the ordinal it got when first indexed, so re-extracting
    /// it never changes its position relative to other files.
    pub fn upsert_file(
        &self,
        file: &FileId,
        definitions: Vec<Definition>,
    ) -> usize {
        let mut state = self.write();
        let ordinal = match state.detach(file) {
            Some(previous) => previous.ordinal,
            None => {
                let ordinal = state.next_ordinal;
                state.next_ordinal = state.next_ordinal.saturating_add(1);
                ordinal
            },
        };

        let sites: Vec<Arc<DefinitionSite>> = definitions
            .into_iter()
            .enumerate()
            .map(|(position, definition)| {
                Arc::new(DefinitionSite {
                    name: definition.name,
                    file: file.clone(),
                    span: definition.span,
                    kind: definition.kind,
                    sequence: Sequence {
                        file_ordinal: ordinal,
                        position: u32::try_from(position).unwrap_or(u32::MAX),
                    },
                })
            })
            .collect();

        for site in &sites {
            state
                .by_name
                .entry(site.name.clone())
                .or_default()
                .insert(site.sequence, Arc::clone(site));
        }

        let count = sites.len();
        state.files.insert(file.clone(), FileEntry { ordinal, sites });
        count
    }

    /// Drop all sites of `file` and forget its ordinal.
    pub fn remove_file(
        &self,
        file: &FileId,
    ) -> bool {
        self.write().detach(file).is_some()
    }

    /// All sites named exactly `name`, first-discovered first.
    pub fn lookup(
        &self,
        name: &str,
    ) -> Vec<Arc<DefinitionSite>> {
        self.read()
            .by_name
            .get(name)
            .map(|sites| sites.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Sites of one file in source order.
    pub fn file_sites(
        &self,
        file: &FileId,
    ) -> Vec<Arc<DefinitionSite>> {
        self.read()
            .files
            .get(file)
            .map(|entry| entry.sites.clone())
            .unwrap_or_default()
    }

    /// Search for sites whose name contains `query` (case-insensitive).
    /// Results are sorted by name, then discovery order, and capped at `limit`.
    pub fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Vec<Arc<DefinitionSite>> {
        let query_lower = query.to_lowercase();
        let state = self.read();
        let mut names: Vec<&String> = state
            .by_name
            .keys()
            .filter(|name| name.to_lowercase().contains(&query_lower))
            .collect();
        names.sort();

        names
            .into_iter()
            .flat_map(|name| state.by_name[name].values().cloned())
            .take(limit)
            .collect()
    }

    pub fn contains_file(
        &self,
        file: &FileId,
    ) -> bool {
        self.read().files.contains_key(file)
    }

    /// Tracked files in discovery order.
    pub fn files(&self) -> Vec<FileId> {
        let state = self.read();
        let mut files: Vec<(u32, &FileId)> = state
            .files
            .iter()
            .map(|(file, entry)| (entry.ordinal, file))
            .collect();
        files.sort();
        files.into_iter().map(|(_, file)| file.clone()).collect()
    }

    pub fn file_count(&self) -> usize {
        self.read().files.len()
    }

    pub fn site_count(&self) -> usize {
        self.read().files.values().map(|entry| entry.sites.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/src/index/index_tests.rs"]
mod tests;
