//! Persisted artifact layout.
//!
//! Each named memory is a sibling pair on disk: `<name>.mem` holds the
//! content artifact and `<name>_index.json` the companion index. The index
//! file name is always derived from the content stem, so the pair can be
//! located from either side.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extension of content artifacts.
pub const CONTENT_EXTENSION: &str = "mem";

/// Suffix appended to the content stem to name the companion index.
pub const INDEX_SUFFIX: &str = "_index.json";

/// A registered, queryable reference to one persisted memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHandle {
    /// Sanitized memory name (also the artifact stem).
    pub name: String,
    /// Path to the content artifact.
    pub content_path: PathBuf,
    /// Path to the companion index artifact.
    pub index_path: PathBuf,
}

impl MemoryHandle {
    /// Size of the content artifact in bytes, if it can be read.
    pub fn content_size(&self) -> Option<u64> {
        std::fs::metadata(&self.content_path).ok().map(|m| m.len())
    }
}

/// Derive the companion index path from a content artifact path.
pub fn index_path_for(content_path: &Path) -> PathBuf {
    let stem = content_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    content_path.with_file_name(format!("{}{}", stem, INDEX_SUFFIX))
}

/// Compute the artifact pair for a memory name under a storage directory.
pub fn artifact_paths(storage_dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    let content = storage_dir.join(format!("{}.{}", name, CONTENT_EXTENSION));
    let index = index_path_for(&content);
    (content, index)
}

/// Format a byte count in human-readable units.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_path_for() {
        let index = index_path_for(Path::new("/data/notes.mem"));
        assert_eq!(index, PathBuf::from("/data/notes_index.json"));
    }

    #[test]
    fn test_index_path_preserves_directory() {
        let index = index_path_for(Path::new("/a/b/c/report_20240101.mem"));
        assert_eq!(index, PathBuf::from("/a/b/c/report_20240101_index.json"));
    }

    #[test]
    fn test_artifact_paths() {
        let (content, index) = artifact_paths(Path::new("/memories"), "docs_123");
        assert_eq!(content, PathBuf::from("/memories/docs_123.mem"));
        assert_eq!(index, PathBuf::from("/memories/docs_123_index.json"));
    }

    #[test]
    fn test_content_size_missing_file() {
        let handle = MemoryHandle {
            name: "ghost".to_string(),
            content_path: PathBuf::from("/nonexistent/ghost.mem"),
            index_path: PathBuf::from("/nonexistent/ghost_index.json"),
        };
        assert!(handle.content_size().is_none());
    }

    #[test]
    fn test_content_size_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("mem.mem");
        std::fs::write(&content, b"12345").unwrap();
        let handle = MemoryHandle {
            name: "mem".to_string(),
            index_path: index_path_for(&content),
            content_path: content,
        };
        assert_eq!(handle.content_size(), Some(5));
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(512), "512.0 B");
    }

    #[test]
    fn test_format_size_kilobytes() {
        assert_eq!(format_size(2048), "2.0 KB");
    }

    #[test]
    fn test_format_size_megabytes() {
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_size_zero() {
        assert_eq!(format_size(0), "0.0 B");
    }
}
