//! Intent classification.
//!
//! Keyword-set membership over disjoint vocabularies plus a structural
//! path/directory signal. Literal file references are the strongest, least
//! ambiguous signal and win over verb choice. Deterministic and infallible:
//! classification makes no external calls and never panics.

use crate::paths::{extract_directory_from_query, extract_document_paths};
use crate::types::Intent;

/// Verbs that request ingesting new knowledge.
const INGESTION_KEYWORDS: [&str; 9] = [
    "ingest",
    "add",
    "load",
    "import",
    "process",
    "index",
    "upload",
    "include",
    "incorporate",
];

/// Question and search words.
const SEARCH_KEYWORDS: [&str; 11] = [
    "search", "find", "what", "how", "when", "where", "why", "explain", "describe", "tell me",
    "show me",
];

/// Verbs that address the memory store itself.
const MANAGEMENT_KEYWORDS: [&str; 9] = [
    "list",
    "show",
    "stats",
    "statistics",
    "status",
    "manage",
    "delete",
    "remove",
    "clear",
];

/// Result of classifying one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedQuery {
    pub intent: Intent,
    /// File references found in the utterance.
    pub paths: Vec<String>,
    /// Directory reference found in the utterance.
    pub directory: Option<String>,
}

fn contains_any(query: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| query.contains(kw))
}

/// Classify an utterance into an intent plus extracted references.
///
/// Priority: a path/directory signal or an ingestion keyword wins, then
/// management keywords, then search keywords, with chat as the default.
pub fn classify(query: &str) -> ClassifiedQuery {
    let lower = query.to_lowercase();
    let paths = extract_document_paths(query);
    let directory = extract_directory_from_query(query);

    let intent = if !paths.is_empty()
        || directory.is_some()
        || contains_any(&lower, &INGESTION_KEYWORDS)
    {
        Intent::Ingest
    } else if contains_any(&lower, &MANAGEMENT_KEYWORDS) {
        Intent::Manage
    } else if contains_any(&lower, &SEARCH_KEYWORDS) {
        Intent::Search
    } else {
        Intent::Chat
    };

    ClassifiedQuery {
        intent,
        paths,
        directory,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_of(query: &str) -> Intent {
        classify(query).intent
    }

    // ---- Ingest: keywords ----

    #[test]
    fn test_ingest_verb() {
        assert_eq!(intent_of("ingest my research notes"), Intent::Ingest);
    }

    #[test]
    fn test_add_verb() {
        assert_eq!(intent_of("add this document to memory"), Intent::Ingest);
    }

    #[test]
    fn test_import_verb() {
        assert_eq!(intent_of("import the meeting minutes"), Intent::Ingest);
    }

    #[test]
    fn test_upload_verb() {
        assert_eq!(intent_of("upload my thesis"), Intent::Ingest);
    }

    // ---- Ingest: structural path signal beats everything ----

    #[test]
    fn test_quoted_path_forces_ingest() {
        assert_eq!(intent_of(r#"what is inside "report.pdf"?"#), Intent::Ingest);
    }

    #[test]
    fn test_quoted_path_beats_search_keywords() {
        assert_eq!(
            intent_of(r#"search and find and explain "data.txt""#),
            Intent::Ingest
        );
    }

    #[test]
    fn test_quoted_path_beats_management_keywords() {
        assert_eq!(intent_of(r#"list "notes.md""#), Intent::Ingest);
    }

    #[test]
    fn test_directory_signal_forces_ingest() {
        assert_eq!(intent_of(r#"read everything in "papers/""#), Intent::Ingest);
    }

    // ---- Manage ----

    #[test]
    fn test_list_memories() {
        assert_eq!(intent_of("list memories"), Intent::Manage);
    }

    #[test]
    fn test_statistics() {
        assert_eq!(intent_of("memory statistics please"), Intent::Manage);
    }

    #[test]
    fn test_clear() {
        assert_eq!(intent_of("clear everything"), Intent::Manage);
    }

    // ---- Search ----

    #[test]
    fn test_what_question() {
        assert_eq!(intent_of("what is machine learning?"), Intent::Search);
    }

    #[test]
    fn test_how_question() {
        assert_eq!(intent_of("how does the engine work?"), Intent::Search);
    }

    #[test]
    fn test_explain() {
        assert_eq!(intent_of("explain the architecture"), Intent::Search);
    }

    #[test]
    fn test_tell_me() {
        assert_eq!(intent_of("tell me about the results"), Intent::Search);
    }

    // ---- Chat default ----

    #[test]
    fn test_chat_fallback() {
        assert_eq!(intent_of("hello there"), Intent::Chat);
    }

    #[test]
    fn test_empty_string_is_chat() {
        assert_eq!(intent_of(""), Intent::Chat);
    }

    // ---- Case insensitivity ----

    #[test]
    fn test_uppercase_keywords() {
        assert_eq!(intent_of("INGEST THE FILES"), Intent::Ingest);
        assert_eq!(intent_of("LIST MEMORIES"), Intent::Manage);
        assert_eq!(intent_of("WHAT HAPPENED"), Intent::Search);
    }

    // ---- Extracted references ----

    #[test]
    fn test_classify_returns_paths() {
        let classified = classify(r#"Ingest "a.pdf" "b.txt""#);
        assert_eq!(classified.intent, Intent::Ingest);
        assert_eq!(classified.paths, vec!["a.pdf", "b.txt"]);
    }

    #[test]
    fn test_classify_returns_directory() {
        let classified = classify(r#"Process files in "documents/""#);
        assert_eq!(classified.intent, Intent::Ingest);
        assert_eq!(classified.directory, Some("documents/".to_string()));
    }

    #[test]
    fn test_classify_chat_has_no_references() {
        let classified = classify("hello");
        assert!(classified.paths.is_empty());
        assert!(classified.directory.is_none());
    }

    // ---- Determinism ----

    #[test]
    fn test_classification_is_deterministic() {
        let query = r#"find "a.pdf" and tell me more"#;
        assert_eq!(classify(query), classify(query));
    }

    // ---- Priority: management before search ----

    #[test]
    fn test_show_is_management_before_search() {
        // "show" appears in the management vocabulary and wins over the
        // "show me" search phrase.
        assert_eq!(intent_of("show memory status"), Intent::Manage);
    }
}
