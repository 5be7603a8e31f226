//! Core pipeline data types.

use serde::Serialize;

use mnemo_store::MemoryHandle;

use crate::error::AgentError;
use crate::status::{validate_transition, Status};

/// Classified purpose of an utterance; drives routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Ingest,
    Search,
    Chat,
    Manage,
    Error,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Ingest => "ingest",
            Intent::Search => "search",
            Intent::Chat => "chat",
            Intent::Manage => "manage",
            Intent::Error => "error",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored unit of retrieved text with source attribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    /// Name of the memory the chunk came from.
    pub source: String,
    /// 1-based rank within its source, before the global merge.
    pub rank: usize,
}

/// The canonical request/response record passed through the pipeline.
#[derive(Debug)]
pub struct RequestState {
    pub query: String,
    pub session_id: String,
    pub intent: Intent,
    status: Status,
    pub context: Vec<String>,
    pub retrieved: Vec<RetrievedChunk>,
    pub response: Option<String>,
    /// Descriptor of the memory produced by an ingestion call, if any.
    pub produced_memory: Option<MemoryHandle>,
    pub error_message: Option<String>,
}

impl RequestState {
    /// Fresh record for an incoming utterance.
    pub fn new(query: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: session_id.into(),
            intent: Intent::Chat,
            status: Status::Initialized,
            context: Vec::new(),
            retrieved: Vec::new(),
            response: None,
            produced_memory: None,
            error_message: None,
        }
    }

    /// Current pipeline status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Advance to the next status, validating against the transition table.
    ///
    /// The status is monotonic; it is never reset and an invalid advance is
    /// a structural error.
    pub fn advance(&mut self, to: Status) -> Result<(), AgentError> {
        validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = RequestState::new("hello", "session-1");
        assert_eq!(state.status(), Status::Initialized);
        assert_eq!(state.query, "hello");
        assert_eq!(state.session_id, "session-1");
        assert!(state.response.is_none());
        assert!(state.retrieved.is_empty());
    }

    #[test]
    fn test_advance_valid_path() {
        let mut state = RequestState::new("q", "s");
        state.advance(Status::Analyzed).unwrap();
        state.advance(Status::ContextRetrieved).unwrap();
        state.advance(Status::ContextAssembled).unwrap();
        state.advance(Status::ResponseGenerated).unwrap();
        assert_eq!(state.status(), Status::ResponseGenerated);
    }

    #[test]
    fn test_advance_invalid_is_structural_error() {
        let mut state = RequestState::new("q", "s");
        let err = state.advance(Status::ResponseGenerated).unwrap_err();
        assert!(matches!(err, AgentError::InvalidTransition(_, _)));
        // Failed advance leaves the status untouched.
        assert_eq!(state.status(), Status::Initialized);
    }

    #[test]
    fn test_failure_path_terminates_in_error_handled() {
        let mut state = RequestState::new("q", "s");
        state.advance(Status::Analyzed).unwrap();
        state.advance(Status::NoMemories).unwrap();
        state.advance(Status::ErrorHandled).unwrap();
        assert!(state.status().is_terminal());
    }

    #[test]
    fn test_intent_display() {
        assert_eq!(Intent::Ingest.to_string(), "ingest");
        assert_eq!(Intent::Manage.to_string(), "manage");
    }
}
