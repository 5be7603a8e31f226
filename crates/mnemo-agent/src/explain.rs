//! Terminal error handler.
//!
//! Pure renderer over the closed failure taxonomy. Every error-tagged
//! status routes through here exactly once before the pipeline terminates;
//! a node-composed negative response is preserved, everything else gets the
//! fixed per-category explanation.

use crate::status::Status;

/// Whether the utterance asked for diagnostics to be included.
pub fn wants_diagnostics(query: &str) -> bool {
    query.to_lowercase().contains("debug")
}

/// Fixed explanation for a failure category.
fn category_message(status: Status) -> &'static str {
    match status {
        Status::AnalysisError => {
            "I encountered an error analyzing your query. Please try rephrasing your request."
        }
        Status::IngestionError => {
            "There was an error processing your documents. Please check the file paths and formats."
        }
        Status::RetrievalError => {
            "I couldn't search the knowledge base properly. Please try a different query."
        }
        Status::GenerationError => {
            "I encountered an error generating a response. Please try again."
        }
        Status::NoMemories => {
            "No memory stores are currently loaded. Please ingest some documents first, \
             for example: Add \"document.pdf\" to memory"
        }
        Status::NoContext => {
            "No relevant information was found for your query. Try using different keywords, \
             adding relevant documents to memory, or being more specific in your question."
        }
        _ => "An unexpected error occurred. Please try again.",
    }
}

/// Render the terminal response for a failure.
///
/// A response already composed by the failing node (e.g. ingestion's
/// negative results, which enumerate the rejected paths) wins over the
/// fixed category message. When the utterance requested diagnostics and a
/// captured message exists, it is appended verbatim.
pub fn render(
    status: Status,
    node_response: Option<&str>,
    error_message: Option<&str>,
    diagnostics: bool,
) -> String {
    let base = node_response
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| category_message(status).to_string());

    match error_message {
        Some(detail) if diagnostics => format!("{}\n\nDebug info: {}", base, detail),
        _ => base,
    }
}
