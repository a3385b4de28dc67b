//! Conversation memory gate.
//!
//! History is withheld from generation by default; only continuation turns
//! receive a short window of recent turns. Keeping non-continuation queries
//! stateless avoids topic bleed-through and keeps token cost flat.

use tracing::warn;

use tutor_core::config::MemoryConfig;
use tutor_core::types::Turn;

use crate::generation::HistoryMessage;

/// Characters per estimated token.
const CHARS_PER_TOKEN: usize = 4;

/// Decides whether, and how much, history accompanies a generation call.
pub struct MemoryGate {
    config: MemoryConfig,
}

impl MemoryGate {
    pub fn new(config: MemoryConfig) -> Self {
        Self { config }
    }

    /// Select the history for one generation call.
    ///
    /// Returns `None` unless the turn is a continuation; continuations get
    /// the last `window` turns flattened to plain text. Blank entries are
    /// skipped.
    pub fn select(&self, history: &[Turn], is_continuation: bool) -> Option<Vec<HistoryMessage>> {
        if !is_continuation {
            return None;
        }

        let start = history.len().saturating_sub(self.config.window);
        let selected: Vec<HistoryMessage> = history[start..]
            .iter()
            .filter(|turn| {
                if turn.content.is_blank() {
                    warn!("Skipping blank history entry");
                    false
                } else {
                    true
                }
            })
            .map(|turn| HistoryMessage {
                role: turn.role,
                content: turn.content.flattened(),
            })
            .collect();

        Some(selected)
    }

    /// Whether the history has grown past the summarization threshold.
    ///
    /// Advisory only; callers may log or expose it, nothing here summarizes.
    pub fn should_summarize(&self, history: &[Turn]) -> bool {
        let total_chars: usize = history.iter().map(|t| t.content.flattened().len()).sum();
        total_chars / CHARS_PER_TOKEN > self.config.summarize_threshold_tokens
    }
}

// =============================================================================
// Tests
// =============================================================================
