//! Deterministic in-memory store implementation.
//!
//! `MockStoreProvider` persists chunks as plain JSON and scores search
//! results by keyword overlap, so identical inputs always produce
//! identical outputs. This allows testing the orchestration layer without
//! a real store engine; it is not a storage engine itself.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mnemo_core::error::{MnemoError, Result};

use crate::provider::{BuildStats, MemoryEncoder, MemoryRetriever, ScoredChunk, StoreProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MockChunk {
    text: String,
    source: String,
}

/// Store provider backed by JSON artifacts and keyword-overlap scoring.
#[derive(Debug, Clone, Default)]
pub struct MockStoreProvider;

impl MockStoreProvider {
    pub fn new() -> Self {
        Self
    }
}

impl StoreProvider for MockStoreProvider {
    fn encoder(&self) -> Box<dyn MemoryEncoder> {
        Box::new(MockEncoder { chunks: Vec::new() })
    }

    fn open(&self, content_path: &Path, index_path: &Path) -> Result<Arc<dyn MemoryRetriever>> {
        if !index_path.exists() {
            return Err(MnemoError::Store(format!(
                "companion index not found: {}",
                index_path.display()
            )));
        }
        let raw = std::fs::read_to_string(content_path)
            .map_err(|e| MnemoError::Store(format!("cannot read content artifact: {}", e)))?;
        let chunks: Vec<MockChunk> = serde_json::from_str(&raw)
            .map_err(|e| MnemoError::Store(format!("corrupt content artifact: {}", e)))?;
        Ok(Arc::new(MockRetriever { chunks }))
    }
}

/// Encoder accumulating chunks in memory until `build`.
struct MockEncoder {
    chunks: Vec<MockChunk>,
}

impl MemoryEncoder for MockEncoder {
    fn add_text(&mut self, content: &str, metadata: HashMap<String, String>) -> Result<()> {
        if content.trim().is_empty() {
            return Err(MnemoError::Ingestion("empty content".to_string()));
        }
        let source = metadata
            .get("source")
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());
        // One paragraph per chunk; blank lines separate units.
        for block in content.split("\n\n") {
            let block = block.trim();
            if !block.is_empty() {
                self.chunks.push(MockChunk {
                    text: block.to_string(),
                    source: source.clone(),
                });
            }
        }
        Ok(())
    }

    fn add_document(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)
            .map_err(|e| MnemoError::Ingestion(format!("cannot read {}: {}", path.display(), e)))?;
        let content = String::from_utf8_lossy(&bytes);
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source);
        self.add_text(&content, metadata)
    }

    fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    fn build(&self, content_path: &Path, index_path: &Path) -> Result<BuildStats> {
        if self.chunks.is_empty() {
            return Err(MnemoError::Ingestion(
                "no content units to build".to_string(),
            ));
        }
        if let Some(parent) = content_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string(&self.chunks)?;
        std::fs::write(content_path, &content)?;

        let index = serde_json::json!({
            "chunks": self.chunks.len(),
            "sources": self
                .chunks
                .iter()
                .map(|c| c.source.as_str())
                .collect::<Vec<_>>(),
        });
        std::fs::write(index_path, serde_json::to_string(&index)?)?;

        Ok(BuildStats {
            chunks: self.chunks.len(),
            content_bytes: content.len() as u64,
        })
    }
}

/// Retriever scoring chunks by keyword overlap with the query.
struct MockRetriever {
    chunks: Vec<MockChunk>,
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl MemoryRetriever for MockRetriever {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
        let query_words = tokenize(query);
        if query_words.is_empty() {
            return Ok(vec![]);
        }

        let mut scored: Vec<ScoredChunk> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let chunk_words = tokenize(&chunk.text);
                let overlap = query_words
                    .iter()
                    .filter(|w| chunk_words.contains(w))
                    .count();
                if overlap == 0 {
                    return None;
                }
                Some(ScoredChunk {
                    text: chunk.text.clone(),
                    score: overlap as f32 / query_words.len() as f32,
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
