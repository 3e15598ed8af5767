use std::io;
use thiserror::Error;

/// Result type for index build and query operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Error types for the index pipeline.
///
/// Per-document extraction failures are NOT errors: they are recovered
/// inside the pipeline (the document is recorded with `empty` extraction
/// quality and zero chunks). Only corpus-level conditions reach this enum.
#[derive(Debug, Error)]
pub enum IndexError {
    // Configuration
    #[error("Corpus directory not found: {0}")]
    CorpusDirNotFound(String),

    #[error("No chunks produced from corpus - check the PDF directory and extraction quality")]
    EmptyCorpus,

    // Filesystem
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Index file not found: {0}")]
    IndexNotFound(String),

    // Embedding collaborator
    #[error("Embedding request failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding response length mismatch: sent {sent} texts, received {received} vectors")]
    LengthMismatch { sent: usize, received: usize },
}
