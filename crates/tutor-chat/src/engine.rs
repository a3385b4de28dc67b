//! Session orchestrator: the per-turn pipeline.
//!
//! classify -> short-circuit greetings/farewells -> gate memory -> retrieve
//! -> build prompt -> generate -> classify the reply. Every turn ends in a
//! reply; retrieval and generation failures degrade instead of erroring.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{info, warn};
use uuid::Uuid;

use tutor_core::config::TutorConfig;
use tutor_core::types::Turn;
use tutor_retrieval::{EmbeddingProvider, Partition, PartitionedRetriever, VectorStore};

use crate::context::{ConversationContext, SessionManager, TutorSession};
use crate::error::ChatError;
use crate::generation::GenerationProvider;
use crate::intent::{AmbiguityResolver, IntentClassifier, IntentKind};
use crate::memory::MemoryGate;
use crate::prompt::{select_template, PromptBuilder};
use crate::response::{self, ReplyKind, TurnReply};

/// Reply used when generation fails or times out.
const GENERATION_APOLOGY: &str =
    "I apologize, but I ran into a problem while answering. Please try asking again.";

/// Central coordinator owning sessions and wiring the pipeline stages.
pub struct SessionOrchestrator {
    classifier: IntentClassifier,
    gate: MemoryGate,
    retriever: PartitionedRetriever,
    builder: PromptBuilder,
    generator: Arc<dyn GenerationProvider>,
    manager: SessionManager,
    sessions: Mutex<HashMap<Uuid, TutorSession>>,
    config: TutorConfig,
}

impl SessionOrchestrator {
    /// Build an orchestrator around the injected providers.
    pub fn new(
        config: TutorConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn GenerationProvider>,
    ) -> Self {
        let retriever = PartitionedRetriever::new(embedder, store, config.retrieval.clone());
        Self {
            classifier: IntentClassifier::default(),
            gate: MemoryGate::new(config.memory.clone()),
            retriever,
            builder: PromptBuilder,
            generator,
            manager: SessionManager::new(config.engine.session_timeout_minutes),
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Replace the default no-op ambiguity resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn AmbiguityResolver>) -> Self {
        self.classifier = IntentClassifier::new(resolver);
        self
    }

    /// Handle one incoming message.
    ///
    /// Returns the reply and the session id (existing, or freshly created
    /// when none was given or the given one expired).
    pub async fn handle_message(
        &self,
        message: &str,
        history: &[Turn],
        session_id: Option<Uuid>,
    ) -> Result<(TurnReply, Uuid), ChatError> {
        if !self.config.engine.enabled {
            return Err(ChatError::Disabled);
        }
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let max = self.config.engine.max_message_length;
        if message.chars().count() > max {
            return Err(ChatError::MessageTooLong(max));
        }

        let sid = self.resolve_session(session_id)?;
        let intent = self.classifier.classify(message, history).await;
        info!(kind = ?intent.kind, confidence = intent.confidence, "Classified message");

        // Social turns answer from canned replies and reset the context;
        // no retrieval, no generation.
        match intent.kind {
            IntentKind::Greeting => {
                let reply = TurnReply::new(self.builder.greeting(), ReplyKind::Greeting);
                self.finish_turn(sid, |ctx| ctx.clear())?;
                return Ok((reply, sid));
            }
            IntentKind::Farewell => {
                let reply = TurnReply::new(self.builder.farewell(), ReplyKind::Farewell);
                self.finish_turn(sid, |ctx| ctx.clear())?;
                return Ok((reply, sid));
            }
            IntentKind::Continuation | IntentKind::Query => {}
        }

        let context = self.context_snapshot(sid)?;
        let gated_history = self.gate.select(history, intent.is_continuation);
        if self.gate.should_summarize(history) {
            info!("Conversation history has grown past the summarization threshold");
        }

        // Retrieval always runs on the literal message; a continuation is
        // tied back to the prior topic by the keyword hint, and only when
        // the last answer came from the overview partition.
        let hint = (intent.is_continuation
            && context.last_partition == Some(Partition::Overview))
        .then(|| context.keyword_hint.clone());

        let outcome = self.retriever.retrieve(message, hint.as_deref()).await;

        let template = select_template(&intent, outcome.threshold_met, outcome.dominant_partition);
        let system = self.builder.system_instructions(template);
        let user = self.builder.user_content(message, &outcome.chunks);

        let timeout = Duration::from_secs(self.config.engine.generation_timeout_secs);
        let generated = match tokio::time::timeout(
            timeout,
            self.generator.generate(&system, &user, gated_history.as_deref()),
        )
        .await
        {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(error = %e, "Generation failed");
                None
            }
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "Generation timed out");
                None
            }
        };

        let reply = match generated {
            Some(text) => response::process(text, outcome.threshold_met),
            None => TurnReply::new(GENERATION_APOLOGY, ReplyKind::Text),
        };

        // Continuations read the context without overwriting it; fresh
        // queries become the new anchor.
        let record = !intent.is_continuation;
        self.finish_turn(sid, |ctx| {
            if record {
                ctx.record(message, &outcome);
            }
        })?;

        Ok((reply, sid))
    }

    /// Look up a session, mostly for inspection and tests.
    pub fn get_session(&self, session_id: Uuid) -> Option<TutorSession> {
        self.sessions
            .lock()
            .ok()
            .and_then(|s| s.get(&session_id).cloned())
    }

    /// Drop a session and its context.
    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        let mut sessions = lock_sessions(&self.sessions)?;
        if sessions.remove(&session_id).is_some() {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id))
        }
    }

    // -- Private helpers --

    /// Resolve or create a session, discarding expired ones.
    fn resolve_session(&self, requested: Option<Uuid>) -> Result<Uuid, ChatError> {
        let mut sessions = lock_sessions(&self.sessions)?;

        if let Some(sid) = requested {
            if let Some(session) = sessions.get(&sid) {
                if !self.manager.is_expired(session) {
                    return Ok(sid);
                }
                info!(session_id = %sid, "Session expired, starting a new one");
                sessions.remove(&sid);
            }
        }

        let session = self.manager.create_session();
        let sid = session.id;
        sessions.insert(sid, session);
        Ok(sid)
    }

    fn context_snapshot(&self, sid: Uuid) -> Result<ConversationContext, ChatError> {
        let sessions = lock_sessions(&self.sessions)?;
        Ok(sessions
            .get(&sid)
            .map(|s| s.context.clone())
            .unwrap_or_default())
    }

    /// Apply a context mutation and bump session bookkeeping.
    fn finish_turn(
        &self,
        sid: Uuid,
        mutate: impl FnOnce(&mut ConversationContext),
    ) -> Result<(), ChatError> {
        let mut sessions = lock_sessions(&self.sessions)?;
        if let Some(session) = sessions.get_mut(&sid) {
            mutate(&mut session.context);
            self.manager.touch(session);
        }
        Ok(())
    }
}

fn lock_sessions(
    sessions: &Mutex<HashMap<Uuid, TutorSession>>,
) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, TutorSession>>, ChatError> {
    sessions
        .lock()
        .map_err(|e| ChatError::Internal(format!("session lock poisoned: {}", e)))
}

// =============================================================================
// Tests
// =============================================================================
