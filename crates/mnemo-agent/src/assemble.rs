//! Context assembly.
//!
//! Pure transform from ranked chunks to the labeled context block handed to
//! the response generator.

use crate::types::RetrievedChunk;

/// Render the top `limit` chunks as enumerated, labeled blocks joined by
/// blank lines.
///
/// Returns `None` for zero input chunks so the empty-context case stays an
/// explicit status rather than an empty string passed downstream.
pub fn assemble_context(chunks: &[RetrievedChunk], limit: usize) -> Option<String> {
    if chunks.is_empty() || limit == 0 {
        return None;
    }

    let parts: Vec<String> = chunks
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, chunk)| {
            format!(
                "[Context {}] (Relevance: {:.3}, Source: {})\n{}",
                i + 1,
                chunk.score,
                chunk.source,
                chunk.text
            )
        })
        .collect();

    Some(parts.join("\n\n"))
}
