//! Knowledge-store collaborator interface for mnemo.
//!
//! The store engine itself (chunking, compressed indexing, similarity
//! search) is an external collaborator behind the traits in [`provider`].
//! This crate owns everything above that seam: the persisted artifact
//! layout, the registry of loaded memory handles, and startup discovery
//! of previously persisted memories.

pub mod artifact;
pub mod discovery;
pub mod mock;
pub mod provider;
pub mod registry;

pub use artifact::{artifact_paths, format_size, index_path_for, MemoryHandle};
pub use discovery::discover_memories;
pub use mock::MockStoreProvider;
pub use provider::{BuildStats, MemoryEncoder, MemoryRetriever, ScoredChunk, StoreProvider};
pub use registry::{MemoryRegistry, RegisteredMemory};
