//! Shared types, configuration, and errors for the tutoring engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::{EngineConfig, MemoryConfig, RetrievalConfig, TutorConfig};
pub use error::{Result, TutorError};
pub use types::{Role, Turn, TurnContent};
