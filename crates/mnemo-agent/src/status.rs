//! Processing status state machine with validated transitions.
//!
//! Every request advances through a fixed stage graph:
//! Initialized -> Analyzed -> one branch outcome -> (assembly/response for
//! the retrieval branch) -> terminal. Failure-tagged statuses route to
//! ErrorHandled. Invalid transitions are structural errors, not accepted
//! strings.

use crate::error::AgentError;

/// The stage/outcome tag attached to a request as it traverses the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Initialized,
    Analyzed,
    AnalysisError,
    IngestionComplete,
    NoDocuments,
    InvalidDocuments,
    IngestionError,
    ContextRetrieved,
    NoMemories,
    RetrievalError,
    ContextAssembled,
    NoContext,
    AssemblyError,
    ResponseGenerated,
    GenerationError,
    MemoryManaged,
    ManagementError,
    ErrorHandled,
}

impl Status {
    /// Snake-case tag, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Initialized => "initialized",
            Status::Analyzed => "analyzed",
            Status::AnalysisError => "analysis_error",
            Status::IngestionComplete => "ingestion_complete",
            Status::NoDocuments => "no_documents",
            Status::InvalidDocuments => "invalid_documents",
            Status::IngestionError => "ingestion_error",
            Status::ContextRetrieved => "context_retrieved",
            Status::NoMemories => "no_memories",
            Status::RetrievalError => "retrieval_error",
            Status::ContextAssembled => "context_assembled",
            Status::NoContext => "no_context",
            Status::AssemblyError => "assembly_error",
            Status::ResponseGenerated => "response_generated",
            Status::GenerationError => "generation_error",
            Status::MemoryManaged => "memory_managed",
            Status::ManagementError => "management_error",
            Status::ErrorHandled => "error_handled",
        }
    }

    /// Statuses that must route through the terminal error handler.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Status::AnalysisError
                | Status::NoDocuments
                | Status::InvalidDocuments
                | Status::IngestionError
                | Status::NoMemories
                | Status::RetrievalError
                | Status::NoContext
                | Status::AssemblyError
                | Status::GenerationError
                | Status::ManagementError
        )
    }

    /// Statuses with no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::IngestionComplete
                | Status::ResponseGenerated
                | Status::MemoryManaged
                | Status::ErrorHandled
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate that a status transition is allowed.
///
/// Valid transitions:
/// - Initialized -> Analyzed | AnalysisError
/// - Analyzed -> any branch outcome (ingestion, retrieval, management)
/// - ContextRetrieved -> ContextAssembled | NoContext | AssemblyError
/// - ContextAssembled -> ResponseGenerated | GenerationError
/// - any failure status -> ErrorHandled
pub fn validate_transition(from: Status, to: Status) -> Result<(), AgentError> {
    let valid = match (from, to) {
        (Status::Initialized, Status::Analyzed | Status::AnalysisError) => true,
        (
            Status::Analyzed,
            Status::IngestionComplete
            | Status::NoDocuments
            | Status::InvalidDocuments
            | Status::IngestionError
            | Status::ContextRetrieved
            | Status::NoMemories
            | Status::RetrievalError
            | Status::MemoryManaged
            | Status::ManagementError,
        ) => true,
        (
            Status::ContextRetrieved,
            Status::ContextAssembled | Status::NoContext | Status::AssemblyError,
        ) => true,
        (Status::ContextAssembled, Status::ResponseGenerated | Status::GenerationError) => true,
        (from, Status::ErrorHandled) => from.is_failure(),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AgentError::InvalidTransition(from, to))
    }
}
