//! Path extraction and validation.
//!
//! Finds file and directory references in raw utterances, partitions them
//! into usable and rejected paths, and derives filesystem-safe memory names.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

/// Document extensions accepted for ingestion.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["pdf", "txt", "epub", "md", "docx"];

/// Maximum length of a sanitized memory name.
pub const MAX_NAME_LEN: usize = 50;

// =============================================================================
// Compiled patterns (compiled once, reused across calls)
// =============================================================================

static DOUBLE_QUOTED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+\.[A-Za-z]{2,4})""#).unwrap());

static SINGLE_QUOTED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']+\.[A-Za-z]{2,4})'").unwrap());

static BARE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([\w\-./\\]+\.[A-Za-z]{2,4})\b").unwrap());

static DOUBLE_QUOTED_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+/)""#).unwrap());

static SINGLE_QUOTED_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']+/)'").unwrap());

static BARE_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([/\\]?[\w\-.]+[/\\])").unwrap());

/// Tokens marking a candidate as URL-like rather than a local file.
const URL_MARKERS: [&str; 4] = ["www.", "http", ".com", ".org"];

// =============================================================================
// Extraction
// =============================================================================

/// Extract candidate document paths from an utterance.
///
/// Quoted tokens (either quote style) ending in a short extension are tried
/// first; only when none are found does the bare-token fallback run, with
/// URL-like tokens filtered out. The result is a deduplicated, sorted set.
pub fn extract_document_paths(query: &str) -> Vec<String> {
    let mut found: BTreeSet<String> = BTreeSet::new();

    for pattern in [&*DOUBLE_QUOTED_PATH, &*SINGLE_QUOTED_PATH] {
        for caps in pattern.captures_iter(query) {
            if let Some(m) = caps.get(1) {
                let candidate = m.as_str().trim();
                if candidate.len() > 1 {
                    found.insert(candidate.to_string());
                }
            }
        }
    }

    if found.is_empty() {
        for caps in BARE_PATH.captures_iter(query) {
            if let Some(m) = caps.get(1) {
                let candidate = m.as_str().trim();
                let lower = candidate.to_lowercase();
                if candidate.len() > 1 && !URL_MARKERS.iter().any(|u| lower.contains(u)) {
                    found.insert(candidate.to_string());
                }
            }
        }
    }

    found.into_iter().collect()
}

/// Extract a directory reference using the trailing-slash heuristic.
pub fn extract_directory_from_query(query: &str) -> Option<String> {
    for pattern in [&*DOUBLE_QUOTED_DIR, &*SINGLE_QUOTED_DIR, &*BARE_DIR] {
        if let Some(caps) = pattern.captures(query) {
            if let Some(m) = caps.get(1) {
                return Some(m.as_str().to_string());
            }
        }
    }
    None
}

// =============================================================================
// Validation
// =============================================================================

/// Why a candidate path was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    NotFound,
    UnsupportedFormat,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::NotFound => f.write_str("file not found"),
            InvalidReason::UnsupportedFormat => f.write_str("unsupported format"),
        }
    }
}

/// Partition of candidate paths into usable and rejected.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub valid: Vec<PathBuf>,
    pub invalid: Vec<(String, InvalidReason)>,
}

impl ValidationReport {
    /// Accepted extensions, for display in negative responses.
    pub fn supported_extensions() -> String {
        SUPPORTED_EXTENSIONS.join(", ")
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Partition every candidate into exactly one of valid or invalid.
///
/// Valid means the file exists and carries a supported extension; invalid
/// entries are tagged with the reason for display.
pub fn validate_file_paths(paths: &[String]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for raw in paths {
        let path = Path::new(raw);
        if !path.exists() {
            report.invalid.push((raw.clone(), InvalidReason::NotFound));
        } else if !has_supported_extension(path) {
            report
                .invalid
                .push((raw.clone(), InvalidReason::UnsupportedFormat));
        } else {
            report.valid.push(path.to_path_buf());
        }
    }

    report
}

/// Single-level scan of a directory for supported documents.
pub fn scan_directory_for_documents(directory: &Path) -> Vec<PathBuf> {
    let mut documents = Vec::new();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot scan directory {}: {}", directory.display(), e);
            return documents;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && has_supported_extension(&path) {
            documents.push(path);
        }
    }

    documents.sort();
    documents
}

// =============================================================================
// Memory names
// =============================================================================

/// Strip reserved filesystem characters and bound the length.
///
/// Always yields a legal, non-empty name.
pub fn sanitize_memory_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    let mut last_was_sep = false;
    for c in replaced.chars() {
        if c == '_' {
            if !last_was_sep {
                collapsed.push(c);
            }
            last_was_sep = true;
        } else {
            collapsed.push(c);
            last_was_sep = false;
        }
    }

    let trimmed: String = collapsed
        .trim_matches('_')
        .chars()
        .take(MAX_NAME_LEN)
        .collect();

    if trimmed.is_empty() {
        "memory".to_string()
    } else {
        trimmed
    }
}

/// Derive a memory name from the documents being ingested.
///
/// A single document contributes its sanitized stem; batches fall back to a
/// generic prefix. A timestamp keeps repeated ingestions distinct.
pub fn generate_memory_name(documents: &[PathBuf]) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");

    match documents {
        [single] => {
            let stem = single
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            sanitize_memory_name(&format!("{}_{}", stem, timestamp))
        }
        [] => format!("memory_{}", timestamp),
        _ => format!("documents_{}", timestamp),
    }
}

// =============================================================================
// Tests
// =============================================================================
