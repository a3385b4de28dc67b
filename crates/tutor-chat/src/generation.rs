//! Answer-generation contract.
//!
//! The engine never talks to a model directly; it builds prompts and hands
//! them to an injected provider. `history: None` must be honored as a
//! stateless call.

use async_trait::async_trait;

use tutor_core::types::Role;

use crate::error::ChatError;

/// A prior turn flattened to plain text, as a generation backend expects it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: String,
}

/// External answer-generation contract.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate an answer from system instructions and user content,
    /// optionally conditioned on prior turns.
    async fn generate(
        &self,
        system: &str,
        user: &str,
        history: Option<&[HistoryMessage]>,
    ) -> Result<String, ChatError>;
}
