//! The agent: central coordinator wiring classification, routing, and the
//! pipeline nodes.
//!
//! One request runs as a sequential pipeline over a canonical
//! [`RequestState`]; routing is an exhaustive match over the closed
//! [`Intent`] union, so every utterance takes exactly one branch. All node
//! failures are recovered into status tags and rendered by the terminal
//! error handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use mnemo_core::config::MnemoConfig;
use mnemo_core::message::ChatMessage;
use mnemo_llm::ChatModel;
use mnemo_store::{discover_memories, MemoryRegistry, MockStoreProvider, StoreProvider};

use crate::assemble::assemble_context;
use crate::error::AgentError;
use crate::explain;
use crate::ingest::IngestionCoordinator;
use crate::intent;
use crate::manage;
use crate::respond;
use crate::retrieve::RetrievalCoordinator;
use crate::session::SessionStore;
use crate::status::Status;
use crate::types::{Intent, RequestState};

/// The branch a classified intent dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Ingestion,
    Retrieval,
    Management,
    ErrorHandler,
}

/// Exhaustive routing table over the closed intent union.
///
/// Chat and search both route to retrieval; the classifier still separates
/// them so a future divergence is a one-arm change here.
fn route(intent: Intent) -> Route {
    match intent {
        Intent::Ingest => Route::Ingestion,
        Intent::Search | Intent::Chat => Route::Retrieval,
        Intent::Manage => Route::Management,
        Intent::Error => Route::ErrorHandler,
    }
}

/// Result of the convenience ingestion entrypoint.
#[derive(Debug)]
pub struct IngestReport {
    pub response: String,
    /// Names of all memories registered after the call.
    pub active_memories: Vec<String>,
}

/// Aggregate storage figures, read directly from the storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub total_memories: usize,
    pub total_size_bytes: u64,
    pub storage_dir: PathBuf,
}

/// Builder for [`RagAgent`].
pub struct RagAgentBuilder {
    config: MnemoConfig,
    provider: Option<Arc<dyn StoreProvider>>,
    model: Option<Box<dyn ChatModel>>,
}

impl Default for RagAgentBuilder {
    fn default() -> Self {
        Self {
            config: MnemoConfig::default(),
            provider: None,
            model: None,
        }
    }
}

impl RagAgentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: MnemoConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the storage directory only.
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.general.storage_dir = dir.into().to_string_lossy().into_owned();
        self
    }

    /// Supply the knowledge-store collaborator.
    pub fn with_store(mut self, provider: impl StoreProvider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Supply the generation collaborator directly, bypassing provider
    /// selection.
    pub fn with_model(mut self, model: impl ChatModel + 'static) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    /// Construct the agent and load persisted memories.
    ///
    /// Fails when no generation collaborator is usable; this is the only
    /// construction-time fatal condition.
    pub fn build(self) -> Result<RagAgent, AgentError> {
        let model = match self.model {
            Some(model) => model,
            None => mnemo_llm::build_model(&self.config.llm)?,
        };
        let provider = self
            .provider
            .unwrap_or_else(|| Arc::new(MockStoreProvider::new()));

        let storage_dir = PathBuf::from(&self.config.general.storage_dir);
        std::fs::create_dir_all(&storage_dir).map_err(mnemo_core::error::MnemoError::from)?;

        let registry = MemoryRegistry::new();
        let loaded = discover_memories(&storage_dir, provider.as_ref(), &registry)?;
        info!(
            "Agent initialized with {} ({} memories loaded from {})",
            model.describe(),
            loaded,
            storage_dir.display()
        );

        Ok(RagAgent {
            retrieval: RetrievalCoordinator::new(self.config.retrieval.clone()),
            provider,
            model,
            registry,
            sessions: SessionStore::new(),
            storage_dir,
        })
    }
}

/// Conversational RAG orchestrator.
pub struct RagAgent {
    provider: Arc<dyn StoreProvider>,
    model: Box<dyn ChatModel>,
    registry: MemoryRegistry,
    sessions: SessionStore,
    retrieval: RetrievalCoordinator,
    storage_dir: PathBuf,
}

impl RagAgent {
    pub fn builder() -> RagAgentBuilder {
        RagAgentBuilder::new()
    }

    /// Process one utterance and return the response text.
    ///
    /// The single process-facing entrypoint: classifies, routes to exactly
    /// one branch, and always returns a best-effort response rather than
    /// aborting on node failures.
    pub async fn query(&self, text: &str, session_id: &str) -> Result<String, AgentError> {
        info!("Processing query for session {}", session_id);
        let mut state = RequestState::new(text, session_id);

        let classified = intent::classify(text);
        state.intent = classified.intent;
        debug!("Detected intent: {}", state.intent);

        match route(state.intent) {
            Route::ErrorHandler => {
                state.advance(Status::AnalysisError)?;
            }
            Route::Ingestion => {
                state.advance(Status::Analyzed)?;
                self.run_ingestion(&mut state)?;
            }
            Route::Retrieval => {
                state.advance(Status::Analyzed)?;
                self.run_retrieval(&mut state).await?;
            }
            Route::Management => {
                state.advance(Status::Analyzed)?;
                self.run_management(&mut state)?;
            }
        }

        if state.status().is_failure() {
            let rendered = explain::render(
                state.status(),
                state.response.as_deref(),
                state.error_message.as_deref(),
                explain::wants_diagnostics(&state.query),
            );
            state.response = Some(rendered);
            state.advance(Status::ErrorHandled)?;
        }

        info!("Query processed with status {}", state.status());
        Ok(state
            .response
            .take()
            .unwrap_or_else(|| "No response generated.".to_string()))
    }

    fn run_ingestion(&self, state: &mut RequestState) -> Result<(), AgentError> {
        let coordinator =
            IngestionCoordinator::new(self.provider.as_ref(), &self.registry, &self.storage_dir);
        let outcome = coordinator.ingest_query(&state.query);
        state.advance(outcome.status)?;
        state.produced_memory = outcome.artifact;
        state.error_message = outcome.error;
        state.response = Some(outcome.response);
        Ok(())
    }

    async fn run_retrieval(&self, state: &mut RequestState) -> Result<(), AgentError> {
        let outcome = self.retrieval.retrieve(&state.query, &self.registry).await;
        state.retrieved = outcome.chunks;
        state.advance(outcome.status)?;

        if state.status() == Status::ContextRetrieved {
            match assemble_context(&state.retrieved, self.retrieval.context_chunks()) {
                Some(assembled) => {
                    state.context = vec![assembled];
                    state.advance(Status::ContextAssembled)?;
                }
                None => state.advance(Status::NoContext)?,
            }
        }

        if state.status() == Status::ContextAssembled {
            let history = self.sessions.history(&state.session_id);
            match respond::generate(self.model.as_ref(), &history, &state.query, &state.context)
                .await
            {
                Ok(turn) => {
                    self.sessions.append_turn(
                        &state.session_id,
                        ChatMessage::user(turn.prompt),
                        ChatMessage::assistant(turn.answer.clone()),
                    );
                    state.response = Some(turn.answer);
                    state.advance(Status::ResponseGenerated)?;
                }
                Err(e) => {
                    error!("Generation failed: {}", e);
                    state.error_message = Some(e.to_string());
                    state.advance(Status::GenerationError)?;
                }
            }
        }

        Ok(())
    }

    fn run_management(&self, state: &mut RequestState) -> Result<(), AgentError> {
        let outcome = manage::manage(&state.query, &self.registry, &self.storage_dir);
        state.advance(outcome.status)?;
        state.error_message = outcome.error;
        if !outcome.response.is_empty() {
            state.response = Some(outcome.response);
        }
        Ok(())
    }

    /// Convenience wrapper around [`query`](Self::query) for programmatic
    /// ingestion of known paths.
    pub async fn ingest<S: AsRef<str>>(&self, paths: &[S]) -> Result<IngestReport, AgentError> {
        let quoted: Vec<String> = paths
            .iter()
            .map(|p| format!("\"{}\"", p.as_ref()))
            .collect();
        let query = format!("Please ingest these documents: {}", quoted.join(", "));
        let response = self.query(&query, "default").await?;
        Ok(IngestReport {
            response,
            active_memories: self.registry.names(),
        })
    }

    /// Names of all registered memories.
    pub fn list_memories(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Aggregate statistics from a direct scan of the storage directory.
    pub fn memory_stats(&self) -> MemoryStats {
        let (total_memories, total_size_bytes) =
            manage::scan_storage(&self.storage_dir).unwrap_or((0, 0));
        MemoryStats {
            total_memories,
            total_size_bytes,
            storage_dir: self.storage_dir.clone(),
        }
    }

    /// Clear the registry and re-run startup discovery.
    pub fn reload_memories(&self) -> Result<usize, AgentError> {
        self.registry.clear()?;
        let loaded = discover_memories(&self.storage_dir, self.provider.as_ref(), &self.registry)?;
        info!("Reloaded {} memories", loaded);
        Ok(loaded)
    }

    /// Snapshot of a session's conversational history.
    pub fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions.history(session_id)
    }

    /// Explicitly clear a session's history.
    pub fn clear_history(&self, session_id: &str) {
        self.sessions.clear(session_id);
    }

    /// The storage directory holding persisted memory artifacts.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_is_exhaustive_and_stable() {
        assert_eq!(route(Intent::Ingest), Route::Ingestion);
        assert_eq!(route(Intent::Search), Route::Retrieval);
        assert_eq!(route(Intent::Chat), Route::Retrieval);
        assert_eq!(route(Intent::Manage), Route::Management);
        assert_eq!(route(Intent::Error), Route::ErrorHandler);
    }

    #[test]
    fn test_chat_and_search_merge() {
        assert_eq!(route(Intent::Chat), route(Intent::Search));
    }
}
