//! Retrieval coordinator.
//!
//! Fans a query across every registered memory concurrently, isolates
//! per-source failures, and merges the tagged results under one global
//! stable sort. A per-handle timeout bounds how long a hung source can
//! hold up the merge.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use mnemo_core::config::RetrievalConfig;
use mnemo_store::{MemoryRegistry, ScoredChunk};

use crate::status::Status;
use crate::types::RetrievedChunk;

/// Result of one retrieval fan-out.
#[derive(Debug)]
pub struct RetrievalOutcome {
    pub status: Status,
    /// Merged chunks, sorted descending by score and truncated.
    pub chunks: Vec<RetrievedChunk>,
    /// Sources whose search failed or timed out; recorded, never fatal.
    pub failed_sources: Vec<String>,
}

/// Coordinates the read side of the pipeline.
pub struct RetrievalCoordinator {
    config: RetrievalConfig,
}

impl RetrievalCoordinator {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    /// Number of top chunks handed to context assembly.
    pub fn context_chunks(&self) -> usize {
        self.config.context_chunks
    }

    /// Search every registered memory and merge the results.
    ///
    /// Zero registered memories is a distinct no-knowledge outcome, never a
    /// search failure.
    pub async fn retrieve(&self, query: &str, registry: &MemoryRegistry) -> RetrievalOutcome {
        let entries = registry.snapshot();
        if entries.is_empty() {
            return RetrievalOutcome {
                status: Status::NoMemories,
                chunks: Vec::new(),
                failed_sources: Vec::new(),
            };
        }

        let per_source = self.config.per_source_top_k;
        let deadline = Duration::from_secs(self.config.handle_timeout_secs);

        // Read-only lookups over Arc'd retrievers; safe to run concurrently.
        let tasks: Vec<_> = entries
            .iter()
            .map(|entry| {
                let retriever = entry.retriever.clone();
                let name = entry.handle.name.clone();
                let query = query.to_string();
                tokio::spawn(async move {
                    let result = timeout(deadline, retriever.search(&query, per_source)).await;
                    (name, result)
                })
            })
            .collect();

        let mut per_source_results: Vec<(String, Vec<ScoredChunk>)> = Vec::new();
        let mut failed_sources = Vec::new();

        // Collect in registration-name order so the merge is deterministic.
        for task in tasks {
            match task.await {
                Ok((name, Ok(Ok(chunks)))) => per_source_results.push((name, chunks)),
                Ok((name, Ok(Err(e)))) => {
                    warn!("Search failed for memory {}: {}", name, e);
                    failed_sources.push(name);
                }
                Ok((name, Err(_))) => {
                    warn!(
                        "Search timed out for memory {} after {:?}",
                        name, deadline
                    );
                    failed_sources.push(name);
                }
                Err(e) => {
                    warn!("Search task panicked: {}", e);
                }
            }
        }

        let chunks = merge_ranked(per_source_results, self.config.max_merged);
        info!(
            "Retrieved {} chunks ({} sources failed)",
            chunks.len(),
            failed_sources.len()
        );

        RetrievalOutcome {
            status: Status::ContextRetrieved,
            chunks,
            failed_sources,
        }
    }
}

/// Tag per-source results with source name and in-source rank, then merge
/// into one list, stable-sorted descending by score and truncated.
///
/// The sort is stable, so ties keep their original per-source order.
pub fn merge_ranked(
    per_source: Vec<(String, Vec<ScoredChunk>)>,
    max_merged: usize,
) -> Vec<RetrievedChunk> {
    let mut merged: Vec<RetrievedChunk> = per_source
        .into_iter()
        .flat_map(|(source, chunks)| {
            chunks
                .into_iter()
                .enumerate()
                .map(move |(i, chunk)| RetrievedChunk {
                    text: chunk.text,
                    score: chunk.score,
                    source: source.clone(),
                    rank: i + 1,
                })
        })
        .collect();

    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    merged.truncate(max_merged);
    merged
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemo_core::error::{MnemoError, Result};
    use mnemo_store::{MemoryHandle, MemoryRetriever};
    use std::path::PathBuf;
    use std::sync::Arc;

    struct FixedRetriever {
        chunks: Vec<ScoredChunk>,
    }

    #[async_trait]
    impl MemoryRetriever for FixedRetriever {
        async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<ScoredChunk>> {
            Ok(self.chunks.iter().take(top_k).cloned().collect())
        }
    }

    struct FailingRetriever;

    #[async_trait]
    impl MemoryRetriever for FailingRetriever {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<ScoredChunk>> {
            Err(MnemoError::Search("index corrupt".to_string()))
        }
    }

    struct HangingRetriever;

    #[async_trait]
    impl MemoryRetriever for HangingRetriever {
        async fn search(&self, _query: &str, _top_k: usize) -> Result<Vec<ScoredChunk>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        }
    }

    fn chunk(text: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            text: text.to_string(),
            score,
        }
    }

    fn register(registry: &MemoryRegistry, name: &str, retriever: Arc<dyn MemoryRetriever>) {
        registry
            .register(
                MemoryHandle {
                    name: name.to_string(),
                    content_path: PathBuf::from(format!("/mem/{}.mem", name)),
                    index_path: PathBuf::from(format!("/mem/{}_index.json", name)),
                },
                retriever,
            )
            .unwrap();
    }

    fn coordinator() -> RetrievalCoordinator {
        RetrievalCoordinator::new(RetrievalConfig::default())
    }

    fn fast_coordinator() -> RetrievalCoordinator {
        RetrievalCoordinator::new(RetrievalConfig {
            handle_timeout_secs: 1,
            ..RetrievalConfig::default()
        })
    }

    // ---- merge_ranked ----

    #[test]
    fn test_merge_sorts_descending() {
        let merged = merge_ranked(
            vec![
                ("a".to_string(), vec![chunk("low", 0.2), chunk("high", 0.9)]),
                ("b".to_string(), vec![chunk("mid", 0.5)]),
            ],
            10,
        );
        let scores: Vec<f32> = merged.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![0.9, 0.5, 0.2]);
    }

    #[test]
    fn test_merge_is_stable_on_ties() {
        let merged = merge_ranked(
            vec![
                ("a".to_string(), vec![chunk("a1", 0.5), chunk("a2", 0.5)]),
                ("b".to_string(), vec![chunk("b1", 0.5)]),
            ],
            10,
        );
        let texts: Vec<&str> = merged.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_merge_tags_source_and_rank() {
        let merged = merge_ranked(
            vec![("notes".to_string(), vec![chunk("x", 0.9), chunk("y", 0.8)])],
            10,
        );
        assert_eq!(merged[0].source, "notes");
        assert_eq!(merged[0].rank, 1);
        assert_eq!(merged[1].rank, 2);
    }

    #[test]
    fn test_merge_truncates() {
        let chunks: Vec<ScoredChunk> = (0..20)
            .map(|i| chunk(&format!("c{}", i), 1.0 - i as f32 * 0.01))
            .collect();
        let merged = merge_ranked(vec![("a".to_string(), chunks)], 10);
        assert_eq!(merged.len(), 10);
    }

    #[test]
    fn test_merge_empty_input() {
        assert!(merge_ranked(vec![], 10).is_empty());
    }

    #[test]
    fn test_merge_sorts_before_truncating() {
        // The best chunk from a later source survives truncation.
        let merged = merge_ranked(
            vec![
                (
                    "a".to_string(),
                    (0..10).map(|i| chunk(&format!("a{}", i), 0.5)).collect(),
                ),
                ("b".to_string(), vec![chunk("best", 0.99)]),
            ],
            10,
        );
        assert_eq!(merged[0].text, "best");
    }

    // ---- Fan-out ----

    #[tokio::test]
    async fn test_no_memories_is_distinct_status() {
        let registry = MemoryRegistry::new();
        let outcome = coordinator().retrieve("anything", &registry).await;
        assert_eq!(outcome.status, Status::NoMemories);
        assert!(outcome.chunks.is_empty());
        assert!(outcome.failed_sources.is_empty());
    }

    #[tokio::test]
    async fn test_single_source_retrieval() {
        let registry = MemoryRegistry::new();
        register(
            &registry,
            "notes",
            Arc::new(FixedRetriever {
                chunks: vec![chunk("relevant text", 0.8)],
            }),
        );

        let outcome = coordinator().retrieve("query", &registry).await;
        assert_eq!(outcome.status, Status::ContextRetrieved);
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.chunks[0].source, "notes");
    }

    #[tokio::test]
    async fn test_failing_source_is_isolated() {
        let registry = MemoryRegistry::new();
        register(
            &registry,
            "alpha",
            Arc::new(FixedRetriever {
                chunks: vec![chunk("from alpha", 0.7)],
            }),
        );
        register(&registry, "broken", Arc::new(FailingRetriever));
        register(
            &registry,
            "gamma",
            Arc::new(FixedRetriever {
                chunks: vec![chunk("from gamma", 0.6)],
            }),
        );

        let outcome = coordinator().retrieve("query", &registry).await;
        assert_eq!(outcome.status, Status::ContextRetrieved);
        assert_eq!(outcome.chunks.len(), 2);
        assert_eq!(outcome.failed_sources, vec!["broken"]);
    }

    #[tokio::test]
    async fn test_hung_source_does_not_block_merge() {
        let registry = MemoryRegistry::new();
        register(&registry, "hung", Arc::new(HangingRetriever));
        register(
            &registry,
            "live",
            Arc::new(FixedRetriever {
                chunks: vec![chunk("still here", 0.9)],
            }),
        );

        let outcome = fast_coordinator().retrieve("query", &registry).await;
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.failed_sources, vec!["hung"]);
    }

    #[tokio::test]
    async fn test_all_sources_failing_yields_empty_retrieval() {
        let registry = MemoryRegistry::new();
        register(&registry, "a", Arc::new(FailingRetriever));
        register(&registry, "b", Arc::new(FailingRetriever));

        let outcome = coordinator().retrieve("query", &registry).await;
        // Source failures are reported, never escalated to a search failure.
        assert_eq!(outcome.status, Status::ContextRetrieved);
        assert!(outcome.chunks.is_empty());
        assert_eq!(outcome.failed_sources.len(), 2);
    }

    #[tokio::test]
    async fn test_per_source_top_k_applied() {
        let registry = MemoryRegistry::new();
        let many: Vec<ScoredChunk> = (0..50)
            .map(|i| chunk(&format!("c{}", i), 1.0 - i as f32 * 0.001))
            .collect();
        register(&registry, "big", Arc::new(FixedRetriever { chunks: many }));

        let outcome = coordinator().retrieve("query", &registry).await;
        // Bounded by per_source_top_k (5), below the merge cap.
        assert_eq!(outcome.chunks.len(), 5);
    }

    #[tokio::test]
    async fn test_merge_cap_across_sources() {
        let registry = MemoryRegistry::new();
        for name in ["a", "b", "c"] {
            let chunks: Vec<ScoredChunk> =
                (0..5).map(|i| chunk(&format!("{}{}", name, i), 0.5)).collect();
            register(&registry, name, Arc::new(FixedRetriever { chunks }));
        }

        let outcome = coordinator().retrieve("query", &registry).await;
        // 15 candidates truncated to the global cap of 10.
        assert_eq!(outcome.chunks.len(), 10);
    }
}
