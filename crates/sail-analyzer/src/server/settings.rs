use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;

use crate::analysis::CandidatePolicy;

pub(crate) const SETTINGS_SECTION_KEY: &str = "sail-analyzer";
const MIN_INDEXING_CONCURRENCY: usize = 1;
const MAX_INDEXING_CONCURRENCY: usize = 32;
const MIN_MAX_FILE_SIZE_KB: u64 = 16;
const MAX_MAX_FILE_SIZE_KB: u64 = 1024 * 64;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerSettings {
    pub indexing: IndexingSettings,
    pub navigation: NavigationSettings,
    pub diagnostics: DiagnosticsSettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    /// Overlay every recognised field of `payload` on top of `self`.
    ///
    /// Accepts both `{"sail-analyzer": {...}}` and the bare object; unknown
    /// keys and malformed sections are ignored.
    pub fn merged_with_payload(&self, payload: &Value) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(&mut self, patch: ServerSettingsPatch) {
        if let Some(indexing) = patch.indexing {
            self.indexing.apply_patch(indexing);
        }
        if let Some(navigation) = patch.navigation {
            self.navigation.apply_patch(navigation);
        }
        if let Some(diagnostics) = patch.diagnostics {
            self.diagnostics.apply_patch(diagnostics);
        }
        if let Some(logging) = patch.logging {
            self.logging.apply_patch(logging);
        }
    }

    fn normalize(&mut self) {
        self.indexing.normalize();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexingSettings {
    pub enabled: bool,
    pub concurrency: usize,
    pub max_file_size_kb: u64,
    pub exclude_paths: Vec<String>,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: 4,
            max_file_size_kb: 1024,
            exclude_paths: Vec::new(),
        }
    }
}

impl IndexingSettings {
    fn apply_patch(&mut self, patch: IndexingSettingsPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(concurrency) = patch.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(max_file_size_kb) = patch.max_file_size_kb {
            self.max_file_size_kb = max_file_size_kb;
        }
        if let Some(exclude_paths) = patch.exclude_paths {
            self.exclude_paths = exclude_paths;
        }
    }

    fn normalize(&mut self) {
        self.concurrency = self
            .concurrency
            .clamp(MIN_INDEXING_CONCURRENCY, MAX_INDEXING_CONCURRENCY);
        self.max_file_size_kb = self
            .max_file_size_kb
            .clamp(MIN_MAX_FILE_SIZE_KB, MAX_MAX_FILE_SIZE_KB);
        let mut seen = HashSet::new();
        self.exclude_paths = self
            .exclude_paths
            .iter()
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .filter(|path| seen.insert(path.clone()))
            .collect();
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NavigationSettings {
    pub candidates: CandidatePolicy,
}

impl NavigationSettings {
    fn apply_patch(&mut self, patch: NavigationSettingsPatch) {
        if let Some(candidates) = patch.candidates {
            self.candidates = candidates;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsSettings {
    /// Publish unterminated literals and unbalanced brackets as warnings.
    pub lexical: bool,
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self { lexical: true }
    }
}

impl DiagnosticsSettings {
    fn apply_patch(&mut self, patch: DiagnosticsSettingsPatch) {
        if let Some(lexical) = patch.lexical {
            self.lexical = lexical;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoggingSettings {
    pub level: LoggingLevel,
}

impl LoggingSettings {
    fn apply_patch(&mut self, patch: LoggingSettingsPatch) {
        if let Some(level) = patch.level {
            self.level = level;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn allows_info(self) -> bool {
        self >= LoggingLevel::Info
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    indexing: Option<IndexingSettingsPatch>,
    navigation: Option<NavigationSettingsPatch>,
    diagnostics: Option<DiagnosticsSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct IndexingSettingsPatch {
    enabled: Option<bool>,
    concurrency: Option<usize>,
    max_file_size_kb: Option<u64>,
    exclude_paths: Option<Vec<String>>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct NavigationSettingsPatch {
    candidates: Option<CandidatePolicy>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct DiagnosticsSettingsPatch {
    lexical: Option<bool>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoggingSettingsPatch {
    level: Option<LoggingLevel>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());

    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }

    candidates
}

#[cfg(test)]
#[path = "../../tests/src/server/settings_tests.rs"]
mod tests;
