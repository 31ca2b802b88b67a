use std::path::{Path, PathBuf};
use std::sync::Arc;

use tower_lsp::lsp_types::Url;

/// Stable identity of a source file: its canonical path, or the raw URI for
/// documents that do not live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(Arc<str>);

impl FileId {
    pub fn from_path(path: &Path) -> Self {
        Self(Arc::from(normalized_path(path).display().to_string()))
    }

    pub fn from_url(url: &Url) -> Self {
        if let Ok(path) = url.to_file_path() {
            return Self::from_path(&path);
        }
        Self(Arc::from(url.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem path, when the id was built from one.
    pub fn to_path(&self) -> Option<PathBuf> {
        let path = Path::new(self.as_str());
        path.is_absolute().then(|| path.to_path_buf())
    }

    pub fn to_url(&self) -> Option<Url> {
        match self.to_path() {
            Some(path) => Url::from_file_path(path).ok(),
            None => Url::parse(self.as_str()).ok(),
        }
    }
}

impl std::fmt::Display for FileId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form of `path`. A path that no longer exists (a deleted file)
/// is resolved through its parent directory, so it still matches the id it
/// was indexed under.
pub fn normalized_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => match parent.canonicalize() {
            Ok(parent) => parent.join(name),
            Err(_) => path.to_path_buf(),
        },
        _ => path.to_path_buf(),
    }
}
