//! Intent classification for incoming messages.
//!
//! A fixed, ordered rule table is evaluated first-match-wins; an optional
//! semantic resolver breaks ties for very short inputs that the rules could
//! not place. Classification never fails.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tutor_core::types::{Role, Turn};

/// What the user is doing with this message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    Farewell,
    Continuation,
    Query,
}

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentResult {
    pub kind: IntentKind,
    pub is_continuation: bool,
    /// Rule matches carry 1.0; resolver answers 0.8; empty input 0.0.
    pub confidence: f32,
}

impl IntentResult {
    fn with_confidence(kind: IntentKind, confidence: f32) -> Self {
        Self {
            kind,
            is_continuation: kind == IntentKind::Continuation,
            confidence,
        }
    }
}

// =============================================================================
// Rule table (compiled once; evaluation order is part of the contract)
// =============================================================================

/// Ordered `(pattern, kind)` rules. Greetings and farewells must span the
/// whole message; continuation cues may appear anywhere in it.
static RULES: LazyLock<Vec<(Regex, IntentKind)>> = LazyLock::new(|| {
    let mk = |p: &str| Regex::new(p).expect("Invalid intent regex");
    vec![
        (
            mk(r"(?i)^\s*(hi|hello|hey|greetings|good\s+(morning|afternoon|evening)|sup|yo)\s*[!.,]?\s*$"),
            IntentKind::Greeting,
        ),
        (
            mk(r"(?i)^\s*((thanks|thank\s+you)[,!]?\s+)?(bye|goodbye|farewell|see\s+you(\s+later)?)\s*[!.]?\s*$"),
            IntentKind::Farewell,
        ),
        (
            mk(r"(?i)\b(tell\s+me\s+more|can\s+you\s+elaborate|elaborate|go\s+deeper|expand|more\s+detail|keep\s+going|what\s+else|explain\s+further|go\s+on|give\s+me\s+more|continue)\b"),
            IntentKind::Continuation,
        ),
        (
            mk(r"(?i)^\s*(more|and)\s*\??\s*$"),
            IntentKind::Continuation,
        ),
    ]
});

/// How much of the last assistant turn the resolver is shown.
const RESOLVER_CONTEXT_CHARS: usize = 200;

/// Inputs at or below this token count are eligible for semantic fallback.
const RESOLVER_MAX_TOKENS: usize = 3;

/// Semantic fallback for short messages the rule table classified as a
/// plain query. One call per message, no retry; `None` means no opinion.
#[async_trait]
pub trait AmbiguityResolver: Send + Sync {
    async fn resolve(&self, message: &str, last_assistant: Option<&str>) -> Option<IntentKind>;
}

/// Default resolver that never has an opinion.
#[derive(Debug, Default)]
pub struct NoopResolver;

#[async_trait]
impl AmbiguityResolver for NoopResolver {
    async fn resolve(&self, _message: &str, _last_assistant: Option<&str>) -> Option<IntentKind> {
        None
    }
}

/// Rule-first intent classifier.
pub struct IntentClassifier {
    resolver: Arc<dyn AmbiguityResolver>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(Arc::new(NoopResolver))
    }
}

impl IntentClassifier {
    pub fn new(resolver: Arc<dyn AmbiguityResolver>) -> Self {
        Self { resolver }
    }

    /// Classify a message against the conversation so far.
    ///
    /// Empty or whitespace-only input is a `Query` with confidence 0.0.
    pub async fn classify(&self, text: &str, history: &[Turn]) -> IntentResult {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return IntentResult::with_confidence(IntentKind::Query, 0.0);
        }

        for (pattern, kind) in RULES.iter() {
            if pattern.is_match(trimmed) {
                debug!(?kind, "Intent matched by rule");
                return IntentResult::with_confidence(*kind, 1.0);
            }
        }

        // Short inputs like "cnn?" or "yo!" carry little signal for the
        // rules; give the resolver one chance before settling on Query.
        if trimmed.split_whitespace().count() <= RESOLVER_MAX_TOKENS {
            let last_assistant = last_assistant_snippet(history);
            if let Some(kind) = self
                .resolver
                .resolve(trimmed, last_assistant.as_deref())
                .await
            {
                if matches!(
                    kind,
                    IntentKind::Greeting | IntentKind::Continuation | IntentKind::Query
                ) {
                    info!(?kind, "Intent resolved semantically");
                    return IntentResult::with_confidence(kind, 0.8);
                }
                debug!(?kind, "Resolver answer outside accepted kinds, ignoring");
            }
        }

        IntentResult::with_confidence(IntentKind::Query, 1.0)
    }
}

/// Most recent assistant turn, truncated for the resolver.
fn last_assistant_snippet(history: &[Turn]) -> Option<String> {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::Assistant)
        .map(|t| {
            t.content
                .flattened()
                .chars()
                .take(RESOLVER_CONTEXT_CHARS)
                .collect()
        })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tutor_core::types::Turn;

    async fn classify(text: &str) -> IntentResult {
        IntentClassifier::default().classify(text, &[]).await
    }

    // ---- Greetings ----

    #[tokio::test]
    async fn test_greeting_forms() {
        for text in [
            "hi",
            "Hello",
            "hey!",
            "greetings",
            "good morning",
            "Good Afternoon",
            "good evening.",
            "sup",
            "yo,",
            "  hi  ",
        ] {
            let result = classify(text).await;
            assert_eq!(result.kind, IntentKind::Greeting, "input: {text:?}");
            assert_eq!(result.confidence, 1.0);
        }
    }

    #[tokio::test]
    async fn test_greeting_must_span_whole_message() {
        let result = classify("hi, what is machine learning?").await;
        assert_eq!(result.kind, IntentKind::Query);
    }

    // ---- Farewells ----

    #[tokio::test]
    async fn test_farewell_forms() {
        for text in [
            "bye",
            "Goodbye!",
            "see you",
            "see you later",
            "farewell",
            "thanks, bye",
            "thank you, goodbye",
            "thanks bye!",
        ] {
            let result = classify(text).await;
            assert_eq!(result.kind, IntentKind::Farewell, "input: {text:?}");
        }
    }

    #[tokio::test]
    async fn test_bare_thanks_is_not_farewell() {
        let result = classify("thanks").await;
        assert_ne!(result.kind, IntentKind::Farewell);
    }

    // ---- Continuations ----

    #[tokio::test]
    async fn test_continuation_cues_anywhere() {
        for text in [
            "tell me more",
            "please tell me more about that",
            "can you elaborate?",
            "elaborate",
            "go deeper",
            "expand on this",
            "I want more detail",
            "continue",
            "keep going",
            "what else is there",
            "explain further please",
            "go on",
            "give me more",
        ] {
            let result = classify(text).await;
            assert_eq!(result.kind, IntentKind::Continuation, "input: {text:?}");
            assert!(result.is_continuation);
        }
    }

    #[tokio::test]
    async fn test_bare_continuation_tokens() {
        for text in ["more", "more?", "and?", "continue?"] {
            let result = classify(text).await;
            assert_eq!(result.kind, IntentKind::Continuation, "input: {text:?}");
        }
    }

    #[tokio::test]
    async fn test_and_inside_sentence_is_not_continuation() {
        let result = classify("cats and dogs").await;
        assert_eq!(result.kind, IntentKind::Query);
    }

    // ---- Default and empty ----

    #[tokio::test]
    async fn test_default_is_query() {
        let result = classify("what is a neural network?").await;
        assert_eq!(result.kind, IntentKind::Query);
        assert!(!result.is_continuation);
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_empty_input_is_low_confidence_query() {
        for text in ["", "   ", "\t\n"] {
            let result = classify(text).await;
            assert_eq!(result.kind, IntentKind::Query, "input: {text:?}");
            assert_eq!(result.confidence, 0.0);
        }
    }

    // ---- Rule ordering ----

    #[tokio::test]
    async fn test_greeting_beats_continuation_substring() {
        // "hey" alone is a greeting even though short inputs exist in the
        // continuation table too.
        let result = classify("hey").await;
        assert_eq!(result.kind, IntentKind::Greeting);
    }

    // ---- Semantic fallback ----

    /// Resolver scripted to a fixed answer, recording what it was shown.
    struct ScriptedResolver {
        answer: Option<IntentKind>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedResolver {
        fn new(answer: Option<IntentKind>) -> Self {
            Self {
                answer,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AmbiguityResolver for ScriptedResolver {
        async fn resolve(
            &self,
            message: &str,
            last_assistant: Option<&str>,
        ) -> Option<IntentKind> {
            self.calls
                .lock()
                .unwrap()
                .push((message.to_string(), last_assistant.map(String::from)));
            self.answer
        }
    }

    #[tokio::test]
    async fn test_resolver_answer_accepted_with_fallback_confidence() {
        let resolver = Arc::new(ScriptedResolver::new(Some(IntentKind::Continuation)));
        let classifier = IntentClassifier::new(Arc::clone(&resolver) as _);
        let result = classifier.classify("cnn?", &[]).await;

        assert_eq!(result.kind, IntentKind::Continuation);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(resolver.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolver_farewell_answer_rejected() {
        let resolver = Arc::new(ScriptedResolver::new(Some(IntentKind::Farewell)));
        let classifier = IntentClassifier::new(resolver as _);
        let result = classifier.classify("ok then", &[]).await;

        assert_eq!(result.kind, IntentKind::Query);
        assert_eq!(result.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_resolver_skipped_for_long_inputs() {
        let resolver = Arc::new(ScriptedResolver::new(Some(IntentKind::Greeting)));
        let classifier = IntentClassifier::new(Arc::clone(&resolver) as _);
        let result = classifier
            .classify("what are the main kinds of learning", &[])
            .await;

        assert_eq!(result.kind, IntentKind::Query);
        assert!(resolver.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_skipped_when_rule_matched() {
        let resolver = Arc::new(ScriptedResolver::new(Some(IntentKind::Query)));
        let classifier = IntentClassifier::new(Arc::clone(&resolver) as _);
        classifier.classify("hello", &[]).await;
        assert!(resolver.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolver_sees_truncated_last_assistant_turn() {
        let resolver = Arc::new(ScriptedResolver::new(None));
        let classifier = IntentClassifier::new(Arc::clone(&resolver) as _);

        let long_answer = "x".repeat(500);
        let history = vec![
            Turn::user("what is AI?"),
            Turn::assistant(&long_answer),
        ];
        let result = classifier.classify("why?", &history).await;

        assert_eq!(result.kind, IntentKind::Query);
        let calls = resolver.calls.lock().unwrap();
        let snippet = calls[0].1.as_ref().unwrap();
        assert_eq!(snippet.len(), 200);
    }

    #[tokio::test]
    async fn test_resolver_gets_none_without_assistant_turns() {
        let resolver = Arc::new(ScriptedResolver::new(None));
        let classifier = IntentClassifier::new(Arc::clone(&resolver) as _);
        let history = vec![Turn::user("hello there")];
        classifier.classify("why?", &history).await;

        let calls = resolver.calls.lock().unwrap();
        assert!(calls[0].1.is_none());
    }
}
