//! Error types for the retrieval subsystem.

use tutor_core::TutorError;

/// Errors from embedding and vector-store calls.
///
/// These never escape [`crate::PartitionedRetriever::retrieve`]; retrieval
/// failure degrades to an empty outcome rather than failing the turn.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("embedding error: {0}")]
    Embedding(String),
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("store error: {0}")]
    Store(String),
}

impl From<RetrievalError> for TutorError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Embedding(msg) => TutorError::Embedding(msg),
            RetrievalError::DimensionMismatch { .. } => TutorError::Embedding(err.to_string()),
            RetrievalError::Store(msg) => TutorError::Search(msg),
        }
    }
}
