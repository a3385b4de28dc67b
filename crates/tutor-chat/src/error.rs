//! Error types for the conversational engine.

use tutor_core::TutorError;

/// Errors surfaced to callers of the session orchestrator.
///
/// Retrieval failures never appear here; they degrade inside the retriever.
/// Generation failures also never appear here; they become an apologetic
/// text reply. What remains is input validation and session bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("tutoring is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("generation error: {0}")]
    Generation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<TutorError> for ChatError {
    fn from(err: TutorError) -> Self {
        match err {
            TutorError::Generation(msg) => ChatError::Generation(msg),
            other => ChatError::Internal(other.to_string()),
        }
    }
}
