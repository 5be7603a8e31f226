//! Traits defining the opaque knowledge-store collaborator.
//!
//! A [`StoreProvider`] hands out write-side [`MemoryEncoder`]s and opens
//! read-side [`MemoryRetriever`]s from persisted artifact pairs. The
//! orchestrator never sees inside either: chunking, index format, and
//! similarity scoring belong to the implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use mnemo_core::error::Result;

/// Statistics returned by a successful artifact build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    /// Number of content units written to the artifact.
    pub chunks: usize,
    /// Size of the content artifact in bytes.
    pub content_bytes: u64,
}

/// A single scored unit of retrieved text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub text: String,
    pub score: f32,
}

/// Write side: accumulates content units, then persists them as a paired
/// content + index artifact.
pub trait MemoryEncoder: Send {
    /// Add raw text with source metadata.
    fn add_text(&mut self, content: &str, metadata: HashMap<String, String>) -> Result<()>;

    /// Add a structured document (pdf/epub) by path, letting the engine
    /// extract its text.
    fn add_document(&mut self, path: &Path) -> Result<()>;

    /// Number of content units accumulated so far.
    fn chunk_count(&self) -> usize;

    /// Persist the accumulated units as a content artifact plus companion
    /// index artifact.
    fn build(&self, content_path: &Path, index_path: &Path) -> Result<BuildStats>;
}

/// Read side: one loaded memory that can be searched.
#[async_trait]
pub trait MemoryRetriever: Send + Sync {
    /// Search this memory, returning up to `top_k` chunks ordered by
    /// descending relevance.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>>;
}

/// Factory connecting the orchestrator to a concrete store engine.
pub trait StoreProvider: Send + Sync {
    /// Create a fresh encoder for one ingestion batch.
    fn encoder(&self) -> Box<dyn MemoryEncoder>;

    /// Open a retriever over an existing artifact pair.
    ///
    /// Fails with a load error if either artifact is missing or unreadable.
    fn open(&self, content_path: &Path, index_path: &Path) -> Result<Arc<dyn MemoryRetriever>>;
}
