use super::{percent, prefixed_progress_title};

#[test]
fn progress_title_adds_prefix_when_missing() {
    assert_eq!(prefixed_progress_title("Indexing"), "sail-analyzer: Indexing".to_string());
    assert_eq!(prefixed_progress_title("  Indexing "), "sail-analyzer: Indexing".to_string());
}

#[test]
fn progress_title_preserves_existing_prefix() {
    assert_eq!(
        prefixed_progress_title("sail-analyzer: Indexing"),
        "sail-analyzer: Indexing".to_string()
    );
}

#[test]
fn percent_is_bounded() {
    assert_eq!(percent(0, 8), 0);
    assert_eq!(percent(2, 8), 25);
    assert_eq!(percent(8, 8), 100);
    assert_eq!(percent(9, 8), 100);
    assert_eq!(percent(0, 0), 100);
}
