//! Error types for the orchestration layer.

use mnemo_core::error::MnemoError;

use crate::status::Status;

/// Errors from the agent pipeline.
///
/// Operational failures inside pipeline nodes never surface here; they are
/// recovered into status tags and rendered by the terminal error handler.
/// These variants cover structural faults only.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("invalid status transition: {0} -> {1}")]
    InvalidTransition(Status, Status),
    #[error(transparent)]
    Core(#[from] MnemoError),
}
