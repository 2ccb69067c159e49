use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Upstream request failed: {0}")]
    UpstreamRequestError(String),

    #[error("Failed to parse LLM response as JSON: {0}")]
    ResponseFormatError(String),

    #[error("Storage operation failed: {0}")]
    StorageError(String),

    #[error("Text recognition failed: {0}")]
    OcrError(String),

    #[error("Profile store error: {0}")]
    ProfileStoreError(String),

    #[error("Internal server error")]
    InternalServerError,
}
