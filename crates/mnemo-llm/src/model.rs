//! The generation collaborator seam.

use async_trait::async_trait;

use mnemo_core::error::Result;
use mnemo_core::message::ChatMessage;

/// A generative model that turns an ordered, role-tagged history into one
/// assistant turn.
///
/// Implementations perform exactly one generation per call. Cancellation is
/// cooperative: dropping the returned future abandons the in-flight call.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the next assistant turn for the given history.
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Human-readable provider/model label for logging.
    fn describe(&self) -> String;
}
