use thiserror::Error;

/// Top-level error type for the Shoptalk system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// ShoptalkError` so that the `?` operator works seamlessly across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShoptalkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    Index(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ShoptalkError {
    fn from(err: toml::de::Error) -> Self {
        ShoptalkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ShoptalkError {
    fn from(err: toml::ser::Error) -> Self {
        ShoptalkError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ShoptalkError {
    fn from(err: serde_json::Error) -> Self {
        ShoptalkError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Shoptalk operations.
pub type Result<T> = std::result::Result<T, ShoptalkError>;
