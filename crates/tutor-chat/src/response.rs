//! Generated-answer classification and repair.
//!
//! Generation output is free text shaped by prompt instructions; this module
//! decides how the caller should render it and patches the one malformation
//! worth fixing (a structured answer missing its key-points block).

use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a reply should be rendered by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Farewell,
    Decline,
    Structured,
    Text,
}

/// One reply to one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReply {
    pub answer: String,
    pub kind: ReplyKind,
}

impl TurnReply {
    pub fn new(answer: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            answer: answer.into(),
            kind,
        }
    }
}

const OUT_OF_SCOPE_MARKER: char = '\u{26a0}';
const ADMISSION_MARKER: &str = "I don't have";
const ANSWER_MARKER: &str = "<strong>Answer:</strong>";
const KEY_POINTS_MARKER: &str = "<strong>Key Points:</strong>";

/// Block appended when a structured answer lost its key-points section.
const EMPTY_KEY_POINTS: &str = "\n\n<strong>Key Points:</strong>\n<ul></ul>";

/// Classify a generated answer, repairing it first when warranted.
///
/// Declines are detected before any repair so an out-of-scope reply is never
/// dressed up as structured. Repair only applies when retrieval produced
/// context, since a context-free answer was never asked to be structured.
pub fn process(answer: String, context_available: bool) -> TurnReply {
    let trimmed = answer.trim_start();
    if trimmed.starts_with(OUT_OF_SCOPE_MARKER) || answer.contains(ADMISSION_MARKER) {
        debug!("Classified reply as decline");
        return TurnReply::new(answer, ReplyKind::Decline);
    }

    let mut answer = answer;
    if context_available && answer.contains(ANSWER_MARKER) && !answer.contains(KEY_POINTS_MARKER)
    {
        debug!("Repairing structured reply missing key points");
        answer.push_str(EMPTY_KEY_POINTS);
    }

    if answer.contains(ANSWER_MARKER) && answer.contains(KEY_POINTS_MARKER) {
        TurnReply::new(answer, ReplyKind::Structured)
    } else {
        TurnReply::new(answer, ReplyKind::Text)
    }
}

// =============================================================================
// Tests
// =============================================================================
