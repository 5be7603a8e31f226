//! Startup discovery of persisted memories.
//!
//! Scans a storage directory for content artifacts, requires the companion
//! index to exist, and registers a retriever for each loadable pair.
//! Failures degrade per entry; one unloadable memory never blocks the rest.

use std::path::Path;

use tracing::{debug, error, warn};

use mnemo_core::error::Result;

use crate::artifact::{index_path_for, MemoryHandle, CONTENT_EXTENSION};
use crate::provider::StoreProvider;
use crate::registry::MemoryRegistry;

/// Scan `storage_dir` and register every loadable memory pair.
///
/// Returns the number of memories registered. A missing storage directory
/// is not an error; it simply yields zero memories.
pub fn discover_memories(
    storage_dir: &Path,
    provider: &dyn StoreProvider,
    registry: &MemoryRegistry,
) -> Result<usize> {
    if !storage_dir.is_dir() {
        debug!(
            "Storage directory {} does not exist; nothing to discover",
            storage_dir.display()
        );
        return Ok(0);
    }

    let mut loaded = 0;
    for entry in std::fs::read_dir(storage_dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let content_path = entry.path();
        let is_content = content_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(CONTENT_EXTENSION));
        if !content_path.is_file() || !is_content {
            continue;
        }

        let name = match content_path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        let index_path = index_path_for(&content_path);
        if !index_path.exists() {
            warn!("Memory {} has no companion index; skipping", name);
            continue;
        }

        match provider.open(&content_path, &index_path) {
            Ok(retriever) => {
                let handle = MemoryHandle {
                    name: name.clone(),
                    content_path,
                    index_path,
                };
                registry.register(handle, retriever)?;
                debug!("Discovered memory: {}", name);
                loaded += 1;
            }
            Err(e) => {
                error!("Failed to load memory {}: {}", name, e);
                continue;
            }
        }
    }

    Ok(loaded)
}
