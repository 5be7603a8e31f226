//! Generation collaborator interface for mnemo.
//!
//! Defines the [`ChatModel`] trait the agent invokes with role-tagged
//! message history, plus provider selection from configured credentials.
//! The model itself is opaque; this crate only owns the seam and the
//! HTTP plumbing to reach hosted providers.

pub mod mock;
pub mod model;
pub mod provider;

pub use mock::MockChatModel;
pub use model::ChatModel;
pub use provider::{available_providers, build_model, Provider};
