//! Registry of loaded memory handles.
//!
//! Process-wide shared state: the name-to-retriever map consulted by every
//! retrieval fan-out. Guarded by a `RwLock` so registration and clearing
//! mutually exclude in-flight reads — a search can never observe a
//! partially registered handle.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use mnemo_core::error::{MnemoError, Result};

use crate::artifact::MemoryHandle;
use crate::provider::MemoryRetriever;

/// A handle bound 1:1 to its loaded retriever.
#[derive(Clone)]
pub struct RegisteredMemory {
    pub handle: MemoryHandle,
    pub retriever: Arc<dyn MemoryRetriever>,
}

impl std::fmt::Debug for RegisteredMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMemory")
            .field("handle", &self.handle)
            .finish()
    }
}

/// Owned store of registered memories.
///
/// Entries are created on successful ingestion or startup discovery and
/// removed only by an explicit [`clear`](MemoryRegistry::clear) — never
/// implicitly.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, RegisteredMemory>>,
}

impl MemoryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a memory under its handle name, replacing any prior entry
    /// with the same name.
    pub fn register(&self, handle: MemoryHandle, retriever: Arc<dyn MemoryRetriever>) -> Result<()> {
        let name = handle.name.clone();
        let mut entries = self
            .entries
            .write()
            .map_err(|e| MnemoError::Store(format!("registry lock poisoned: {}", e)))?;
        entries.insert(name.clone(), RegisteredMemory { handle, retriever });
        info!("Registered memory: {}", name);
        Ok(())
    }

    /// Look up one memory by name.
    pub fn get(&self, name: &str) -> Option<RegisteredMemory> {
        self.entries.read().ok()?.get(name).cloned()
    }

    /// Snapshot of all registered memories, sorted by name for
    /// deterministic fan-out order.
    pub fn snapshot(&self) -> Vec<RegisteredMemory> {
        let entries = match self.entries.read() {
            Ok(e) => e,
            Err(_) => return vec![],
        };
        let mut all: Vec<RegisteredMemory> = entries.values().cloned().collect();
        all.sort_by(|a, b| a.handle.name.cmp(&b.handle.name));
        all
    }

    /// Sorted names of all registered memories.
    pub fn names(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .map(|m| m.handle.name)
            .collect()
    }

    /// Number of registered memories.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether no memories are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries (used by explicit reload).
    pub fn clear(&self) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| MnemoError::Store(format!("registry lock poisoned: {}", e)))?;
        entries.clear();
        Ok(())
    }
}
