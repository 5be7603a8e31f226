//! Response generation.
//!
//! Builds the prompt around the assembled context (or its absence), invokes
//! the generation collaborator once, and returns both sides of the turn.
//! The caller records the turn in session history only on success, so a
//! failed generation never leaves a half-completed turn behind.

use mnemo_core::error::Result;
use mnemo_core::message::ChatMessage;
use mnemo_llm::ChatModel;

/// A completed generation turn: the prompt that was sent and the answer.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedTurn {
    pub prompt: String,
    pub answer: String,
}

/// Build the user-turn prompt for the given query and context fragments.
pub fn build_prompt(query: &str, context: &[String]) -> String {
    if context.is_empty() {
        return format!(
            "The user asked: \"{}\"\n\n\
             However, no relevant context was found in the knowledge base. \
             Provide a helpful response explaining that no relevant information \
             was found and suggest how they might:\n\n\
             1. Add relevant documents to the knowledge base\n\
             2. Refine their query to be more specific\n\
             3. Use different keywords\n\n\
             Be polite and helpful.",
            query
        );
    }

    let context_text = context.join("\n\n");
    format!(
        "Based on the following context from the knowledge base, answer the \
         user's question comprehensively and accurately.\n\n\
         Context:\n{}\n\n\
         User question: \"{}\"\n\n\
         Instructions:\n\
         - Use information only from the provided context\n\
         - If the context does not fully answer the question, acknowledge this limitation\n\
         - Be specific and cite relevant details from the context\n\
         - If multiple sources provide different perspectives, mention this",
        context_text, query
    )
}

/// Invoke the collaborator once over history plus the new prompt.
///
/// The prompt is appended to a copy of the history for the call; any
/// collaborator failure propagates untouched so the caller can convert it
/// into a generation-error status without mutating session state.
pub async fn generate(
    model: &dyn ChatModel,
    history: &[ChatMessage],
    query: &str,
    context: &[String],
) -> Result<GeneratedTurn> {
    let prompt = build_prompt(query, context);

    let mut messages = history.to_vec();
    messages.push(ChatMessage::user(prompt.clone()));

    let answer = model.generate(&messages).await?;
    Ok(GeneratedTurn { prompt, answer })
}
