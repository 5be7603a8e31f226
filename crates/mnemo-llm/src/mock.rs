//! Deterministic chat model for testing.
//!
//! Returns scripted replies in order, falling back to echoing the last user
//! message. A failing variant exercises generation-error paths.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use mnemo_core::error::{MnemoError, Result};
use mnemo_core::message::{ChatMessage, Role};

use crate::model::ChatModel;

/// Scripted mock implementation of [`ChatModel`].
#[derive(Debug, Default)]
pub struct MockChatModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    fail: bool,
}

impl MockChatModel {
    /// A model that echoes the last user message.
    pub fn new() -> Self {
        Self::default()
    }

    /// A model that returns the given replies in order, then echoes.
    pub fn with_replies(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A model whose every call fails.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Number of generation calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// The history passed to the most recent call.
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.calls.lock().ok()?.last().cloned()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if self.fail {
            return Err(MnemoError::Generation("mock model failure".to_string()));
        }
        if let Ok(mut replies) = self.replies.lock() {
            if let Some(reply) = replies.pop_front() {
                return Ok(reply);
            }
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(format!("echo: {}", last_user))
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let model = MockChatModel::with_replies(["first", "second"]);
        let history = vec![ChatMessage::user("hi")];
        assert_eq!(model.generate(&history).await.unwrap(), "first");
        assert_eq!(model.generate(&history).await.unwrap(), "second");
        // Exhausted script falls back to echo.
        assert_eq!(model.generate(&history).await.unwrap(), "echo: hi");
    }

    #[tokio::test]
    async fn test_failing_model() {
        let model = MockChatModel::failing();
        let result = model.generate(&[ChatMessage::user("hi")]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_records_calls() {
        let model = MockChatModel::new();
        model.generate(&[ChatMessage::user("one")]).await.unwrap();
        model.generate(&[ChatMessage::user("two")]).await.unwrap();
        assert_eq!(model.call_count(), 2);
        let last = model.last_messages().unwrap();
        assert_eq!(last[0].content, "two");
    }

    #[tokio::test]
    async fn test_echo_uses_last_user_message() {
        let model = MockChatModel::new();
        let history = vec![
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
            ChatMessage::user("follow-up"),
        ];
        assert_eq!(model.generate(&history).await.unwrap(), "echo: follow-up");
    }
}
