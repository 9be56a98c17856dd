//! Error types for the conversational dispatch layer.

use shoptalk_core::error::ShoptalkError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("retrieval unavailable: {0}")]
    RetrievalUnavailable(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("request deadline of {0}s exceeded")]
    Timeout(u64),
    #[error("persistence failed: {0}")]
    Persistence(String),
    #[error("no specialist registered for handler id: {0}")]
    UnknownHandler(String),
}

impl From<ShoptalkError> for ChatError {
    fn from(err: ShoptalkError) -> Self {
        match err {
            ShoptalkError::Embedding(msg) | ShoptalkError::Index(msg) => {
                ChatError::RetrievalUnavailable(msg)
            }
            ShoptalkError::Generation(msg) => ChatError::Upstream(msg),
            other => ChatError::Upstream(other.to_string()),
        }
    }
}
