//! Per-session conversational state.
//!
//! Each session owns exactly one [`ConversationContext`]; the orchestrator
//! keys sessions by id and never shares a context between conversations.
//! The context is what lets a bare "tell me more" find its topic.

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tutor_retrieval::{Partition, RetrievalOutcome};

/// What the engine remembers about the last answered query.
///
/// Cleared on greeting and farewell, overwritten after every answered
/// non-continuation query, read-only during continuation turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Topic label of the best chunk behind the last answer.
    pub last_topic: Option<String>,
    /// Verbatim text of the last non-continuation query.
    pub last_query: Option<String>,
    /// Partition that won arbitration for the last answer.
    pub last_partition: Option<Partition>,
    /// Keywords for narrowing a follow-up search; only set after an
    /// overview-partition answer.
    pub keyword_hint: Vec<String>,
}

impl ConversationContext {
    /// Record the outcome of an answered non-continuation query.
    pub fn record(&mut self, query: &str, outcome: &RetrievalOutcome) {
        self.last_query = Some(query.to_string());
        self.last_topic = outcome.chunks.first().map(|c| c.topic.clone());
        self.last_partition = outcome.dominant_partition;
        self.keyword_hint = outcome.overview_keywords.clone();
    }

    /// Forget everything; the next continuation will have nothing to lean on.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// True when a continuation turn can be tied back to a prior query.
    pub fn has_anchor(&self) -> bool {
        self.last_query.is_some()
    }
}

/// One live conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorSession {
    pub id: Uuid,
    pub started_at: i64,
    pub last_message_at: i64,
    pub message_count: usize,
    pub context: ConversationContext,
}

/// Creates sessions and decides when they have gone stale.
pub struct SessionManager {
    timeout_minutes: u32,
}

impl SessionManager {
    pub fn new(timeout_minutes: u32) -> Self {
        Self { timeout_minutes }
    }

    pub fn create_session(&self) -> TutorSession {
        let now = Local::now().timestamp();
        TutorSession {
            id: Uuid::new_v4(),
            started_at: now,
            last_message_at: now,
            message_count: 0,
            context: ConversationContext::default(),
        }
    }

    /// A session expires after `timeout_minutes` of silence.
    pub fn is_expired(&self, session: &TutorSession) -> bool {
        let idle = Local::now().timestamp() - session.last_message_at;
        idle > i64::from(self.timeout_minutes) * 60
    }

    /// Bump activity bookkeeping after a handled message.
    pub fn touch(&self, session: &mut TutorSession) {
        session.last_message_at = Local::now().timestamp();
        session.message_count += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
