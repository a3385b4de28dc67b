//! Conversational tutoring engine.
//!
//! Classifies each message's intent, gates conversational memory, retrieves
//! partitioned workshop material, assembles prompts, and classifies the
//! generated reply. Generation itself, embeddings, and vector search are
//! injected through traits.

pub mod context;
pub mod engine;
pub mod error;
pub mod generation;
pub mod intent;
pub mod memory;
pub mod prompt;
pub mod response;

pub use context::{ConversationContext, SessionManager, TutorSession};
pub use engine::SessionOrchestrator;
pub use error::ChatError;
pub use generation::{GenerationProvider, HistoryMessage};
pub use intent::{AmbiguityResolver, IntentClassifier, IntentKind, IntentResult, NoopResolver};
pub use memory::MemoryGate;
pub use prompt::{select_template, PromptBuilder, TemplateId};
pub use response::{ReplyKind, TurnReply};
