use thiserror::Error;

/// Top-level error type for the mnemo system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for MnemoError`
/// so that the `?` operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MnemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for MnemoError {
    fn from(err: toml::de::Error) -> Self {
        MnemoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MnemoError {
    fn from(err: toml::ser::Error) -> Self {
        MnemoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for MnemoError {
    fn from(err: serde_json::Error) -> Self {
        MnemoError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for mnemo operations.
pub type Result<T> = std::result::Result<T, MnemoError>;
