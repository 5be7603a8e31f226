//! Shared foundation for the mnemo workspace.
//!
//! Defines the top-level error type, configuration loading, and the
//! role-tagged chat message types used across the store, llm, and agent
//! crates.

pub mod config;
pub mod error;
pub mod message;

pub use config::{GeneralConfig, LlmConfig, MnemoConfig, RetrievalConfig};
pub use error::{MnemoError, Result};
pub use message::{ChatMessage, Role};
