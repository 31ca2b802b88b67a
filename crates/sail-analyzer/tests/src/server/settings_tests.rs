use serde_json::json;

use super::*;

#[test]
fn parses_namespaced_payload() {
    let payload = json!({
        "sail-analyzer": {
            "indexing": {
                "concurrency": 8,
                "maxFileSizeKb": 256,
                "excludePaths": ["handwritten_support", " /tmp/generated "]
            },
            "navigation": {
                "candidates": "all"
            },
            "diagnostics": {
                "lexical": false
            },
            "logging": {
                "level": "debug"
            }
        }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.concurrency, 8);
    assert_eq!(settings.indexing.max_file_size_kb, 256);
    assert_eq!(
        settings.indexing.exclude_paths,
        vec!["handwritten_support".to_string(), "/tmp/generated".to_string()]
    );
    assert_eq!(settings.navigation.candidates, CandidatePolicy::All);
    assert!(!settings.diagnostics.lexical);
    assert_eq!(settings.logging.level, LoggingLevel::Debug);
}

#[test]
fn parses_direct_payload() {
    let payload = json!({
        "indexing": { "enabled": false },
        "navigation": { "candidates": "first" }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert!(!settings.indexing.enabled);
    assert_eq!(settings.navigation.candidates, CandidatePolicy::First);
    assert!(settings.diagnostics.lexical);
}

#[test]
fn missing_payload_yields_defaults() {
    let settings = ServerSettings::from_lsp_payload(None);
    assert_eq!(settings, ServerSettings::default());
    assert!(settings.indexing.enabled);
    assert_eq!(settings.navigation.candidates, CandidatePolicy::First);
    assert_eq!(settings.logging.level, LoggingLevel::Info);
}

#[test]
fn clamps_numeric_values() {
    let payload = json!({
        "indexing": { "concurrency": 0, "maxFileSizeKb": 1 }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.concurrency, MIN_INDEXING_CONCURRENCY);
    assert_eq!(settings.indexing.max_file_size_kb, MIN_MAX_FILE_SIZE_KB);

    let payload = json!({
        "indexing": { "concurrency": 1000, "maxFileSizeKb": u64::MAX }
    });
    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.concurrency, MAX_INDEXING_CONCURRENCY);
    assert_eq!(settings.indexing.max_file_size_kb, MAX_MAX_FILE_SIZE_KB);
}

#[test]
fn deduplicates_exclude_paths() {
    let payload = json!({
        "indexing": { "excludePaths": ["a", " a ", "", "b"] }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.indexing.exclude_paths, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn merge_keeps_fields_not_in_patch() {
    let base = ServerSettings::from_lsp_payload(Some(&json!({
        "indexing": { "concurrency": 6 },
        "logging": { "level": "warn" }
    })));

    let merged = base.merged_with_payload(&json!({
        "sail-analyzer": { "navigation": { "candidates": "all" } }
    }));
    assert_eq!(merged.indexing.concurrency, 6);
    assert_eq!(merged.logging.level, LoggingLevel::Warn);
    assert_eq!(merged.navigation.candidates, CandidatePolicy::All);
}

#[test]
fn ignores_unknown_keys_and_bad_sections() {
    let payload = json!({
        "somethingElse": true,
        "navigation": { "candidates": "random" },
        "indexing": { "concurrency": 2, "futureOption": "x" }
    });

    let settings = ServerSettings::from_lsp_payload(Some(&payload));
    assert_eq!(settings.navigation.candidates, CandidatePolicy::First);
    assert_eq!(settings.indexing.concurrency, 4);
}

#[test]
fn logging_level_threshold() {
    assert!(LoggingLevel::Info.allows_info());
    assert!(LoggingLevel::Trace.allows_info());
    assert!(!LoggingLevel::Warn.allows_info());
}
