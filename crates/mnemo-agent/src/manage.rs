//! Memory management meta-queries.
//!
//! Three sub-intents selected by keyword: list the registered memories,
//! report aggregate statistics, or fall back to a help text. Statistics
//! re-scan the storage directory directly rather than trusting the registry,
//! so they stay accurate when the directory has drifted.

use std::path::Path;

use tracing::error;

use mnemo_store::{artifact, format_size, MemoryRegistry};

use crate::status::Status;

/// Result of one management call.
#[derive(Debug)]
pub struct ManageOutcome {
    pub status: Status,
    pub response: String,
    pub error: Option<String>,
}

/// Handle a management utterance.
pub fn manage(query: &str, registry: &MemoryRegistry, storage_dir: &Path) -> ManageOutcome {
    let lower = query.to_lowercase();

    if lower.contains("stats") || lower.contains("statistics") {
        stats_response(storage_dir)
    } else if lower.contains("list") || lower.contains("show") {
        list_response(registry)
    } else {
        ManageOutcome {
            status: Status::MemoryManaged,
            response: help_response(),
            error: None,
        }
    }
}

fn list_response(registry: &MemoryRegistry) -> ManageOutcome {
    let entries = registry.snapshot();
    if entries.is_empty() {
        return ManageOutcome {
            status: Status::MemoryManaged,
            response: "No memory stores currently loaded.\n\n\
                       To get started, ingest documents with: Add \"document.pdf\" to memory"
                .to_string(),
            error: None,
        };
    }

    let mut lines = vec!["Active memory stores:".to_string()];
    for entry in entries {
        // Per-entry degradation: a missing artifact never fails the listing.
        let line = match entry.handle.content_size() {
            Some(bytes) => format!("- {}: {}", entry.handle.name, format_size(bytes)),
            None => format!("- {}: (stats unavailable)", entry.handle.name),
        };
        lines.push(line);
    }

    ManageOutcome {
        status: Status::MemoryManaged,
        response: lines.join("\n"),
        error: None,
    }
}

fn stats_response(storage_dir: &Path) -> ManageOutcome {
    match scan_storage(storage_dir) {
        Ok((count, total_bytes)) => {
            let response = format!(
                "Memory statistics:\n\
                 - Total memory stores: {}\n\
                 - Total storage size: {}\n\
                 - Storage location: {}",
                count,
                format_size(total_bytes),
                storage_dir.display()
            );
            ManageOutcome {
                status: Status::MemoryManaged,
                response,
                error: None,
            }
        }
        Err(e) => {
            error!("Failed to scan storage directory: {}", e);
            ManageOutcome {
                status: Status::ManagementError,
                response: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Count content artifacts and their sizes directly from disk.
pub(crate) fn scan_storage(storage_dir: &Path) -> std::io::Result<(usize, u64)> {
    if !storage_dir.is_dir() {
        return Ok((0, 0));
    }

    let mut count = 0usize;
    let mut total = 0u64;
    for entry in std::fs::read_dir(storage_dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_content = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(artifact::CONTENT_EXTENSION));
        if path.is_file() && is_content {
            count += 1;
            total += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }
    Ok((count, total))
}

fn help_response() -> String {
    "Memory management commands:\n\n\
     - `list memories` shows the active memory stores\n\
     - `memory statistics` reports aggregate storage figures\n\n\
     Ask questions to search across all loaded memories, and add documents \
     with: ingest \"file.pdf\". Memories persist between sessions."
        .to_string()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemo_core::error::Result;
    use mnemo_store::{MemoryHandle, MemoryRetriever, ScoredChunk};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct NullRetriever;

    #[async_trait]
    impl MemoryRetriever for NullRetriever {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<ScoredChunk>> {
            Ok(vec![])
        }
    }

    fn register(registry: &MemoryRegistry, name: &str, content_path: PathBuf) {
        registry
            .register(
                MemoryHandle {
                    name: name.to_string(),
                    index_path: artifact::index_path_for(&content_path),
                    content_path,
                },
                Arc::new(NullRetriever),
            )
            .unwrap();
    }

    // ---- list ----

    #[test]
    fn test_list_empty() {
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let outcome = manage("list memories", &registry, dir.path());
        assert_eq!(outcome.status, Status::MemoryManaged);
        assert!(outcome.response.contains("No memory stores"));
    }

    #[test]
    fn test_list_enumerates_registered() {
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let alpha = dir.path().join("alpha.mem");
        std::fs::write(&alpha, b"12345").unwrap();
        register(&registry, "alpha", alpha);
        register(&registry, "beta", dir.path().join("missing.mem"));

        let outcome = manage("list memories", &registry, dir.path());
        assert_eq!(outcome.status, Status::MemoryManaged);
        assert!(outcome.response.contains("- alpha: 5.0 B"));
        // Missing artifact degrades per entry, never fails the listing.
        assert!(outcome.response.contains("- beta: (stats unavailable)"));
    }

    #[test]
    fn test_show_triggers_list() {
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let outcome = manage("show my memories", &registry, dir.path());
        assert!(outcome.response.contains("No memory stores"));
    }

    // ---- stats ----

    #[test]
    fn test_stats_scans_storage_directly() {
        // The registry is empty, but artifacts exist on disk; stats report
        // what the directory actually holds.
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.mem"), b"1234").unwrap();
        std::fs::write(dir.path().join("two.mem"), b"123456").unwrap();
        std::fs::write(dir.path().join("one_index.json"), b"{}").unwrap();

        let outcome = manage("memory stats", &registry, dir.path());
        assert_eq!(outcome.status, Status::MemoryManaged);
        assert!(outcome.response.contains("Total memory stores: 2"));
        assert!(outcome.response.contains("10.0 B"));
    }

    #[test]
    fn test_stats_missing_directory() {
        let registry = MemoryRegistry::new();
        let outcome = manage("statistics", &registry, Path::new("/nonexistent/memories"));
        assert_eq!(outcome.status, Status::MemoryManaged);
        assert!(outcome.response.contains("Total memory stores: 0"));
    }

    #[test]
    fn test_stats_beats_list_when_both_present() {
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let outcome = manage("show stats", &registry, dir.path());
        assert!(outcome.response.contains("Memory statistics"));
    }

    // ---- help ----

    #[test]
    fn test_help_fallback() {
        let registry = MemoryRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let outcome = manage("manage", &registry, dir.path());
        assert_eq!(outcome.status, Status::MemoryManaged);
        assert!(outcome.response.contains("Memory management commands"));
    }
}
