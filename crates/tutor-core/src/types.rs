//! Conversation turn types shared across the engine.
//!
//! History entries arrive from callers in two shapes: plain text, or a
//! structured assistant reply carrying an answer plus a key-point list.
//! Both are normalized into [`Turn`] once at the boundary; nothing past
//! this module deals with loosely shaped entries.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user", alias = "human")]
    User,
    #[serde(rename = "assistant", alias = "ai", alias = "model")]
    Assistant,
}

/// Content of a turn: plain text or a structured assistant reply.
///
/// Untagged so that both `"content": "..."` and
/// `"content": {"answer": "...", "key_points": [...]}` deserialize without
/// the caller declaring which shape it sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Structured {
        answer: String,
        #[serde(default, alias = "keyPoints")]
        key_points: Vec<String>,
    },
    Text(String),
}

impl TurnContent {
    /// Render the content as a single flat string.
    ///
    /// Structured replies concatenate the answer with a bulleted key-point
    /// list so downstream consumers receive uniform prose.
    pub fn flattened(&self) -> String {
        match self {
            TurnContent::Text(text) => text.clone(),
            TurnContent::Structured { answer, key_points } => {
                if key_points.is_empty() {
                    answer.clone()
                } else {
                    let bullets: Vec<String> =
                        key_points.iter().map(|kp| format!("\u{2022} {}", kp)).collect();
                    format!("{}\n\nKey Points:\n{}", answer, bullets.join("\n"))
                }
            }
        }
    }

    /// True when the flattened content is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            TurnContent::Text(text) => text.trim().is_empty(),
            TurnContent::Structured { answer, key_points } => {
                answer.trim().is_empty() && key_points.is_empty()
            }
        }
    }
}

/// A single prior turn in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    /// Convenience constructor for a plain-text user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Convenience constructor for a plain-text assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: TurnContent::Text(text.into()),
        }
    }
}
