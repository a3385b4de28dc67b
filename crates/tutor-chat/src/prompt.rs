//! Prompt templates and assembly.
//!
//! Template selection is a pure lookup over three axes: verbosity
//! (standard vs extended), framing (overview vs knowledge base), and
//! whether any retrieved context is available. The builder renders the
//! chosen template into system instructions plus user content.

use tracing::debug;

use tutor_retrieval::{Partition, RetrievedChunk};

use crate::intent::IntentResult;

/// Maximum chunks embedded into one prompt.
const MAX_PROMPT_CHUNKS: usize = 3;

/// Per-chunk character budget inside the prompt.
const CHUNK_CHAR_LIMIT: usize = 800;

/// One cell of the template grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateId {
    OverviewStandard,
    OverviewExtended,
    KnowledgeStandard,
    KnowledgeExtended,
    NoContextStandard,
    NoContextExtended,
}

impl TemplateId {
    pub fn extended(&self) -> bool {
        matches!(
            self,
            TemplateId::OverviewExtended
                | TemplateId::KnowledgeExtended
                | TemplateId::NoContextExtended
        )
    }
}

/// Pick the template for one generation call.
pub fn select_template(
    intent: &IntentResult,
    context_available: bool,
    dominant_partition: Option<Partition>,
) -> TemplateId {
    let template = match (context_available, intent.is_continuation) {
        (false, false) => TemplateId::NoContextStandard,
        (false, true) => TemplateId::NoContextExtended,
        (true, extended) => match dominant_partition {
            Some(Partition::Overview) => {
                if extended {
                    TemplateId::OverviewExtended
                } else {
                    TemplateId::OverviewStandard
                }
            }
            _ => {
                if extended {
                    TemplateId::KnowledgeExtended
                } else {
                    TemplateId::KnowledgeStandard
                }
            }
        },
    };
    debug!(?template, "Selected prompt template");
    template
}

const BASE_PERSONA: &str = "You are a friendly workshop tutor. Answer strictly from the \
provided workshop material; never invent facts beyond it. Format every answer as \
<strong>Answer:</strong> followed by your explanation, then <strong>Key Points:</strong> \
followed by a short bulleted list.";

const OVERVIEW_ADDENDUM: &str = "The material describes a workshop presentation. Keep a \
warm, welcoming tone and present every listed feature, activity, and career path; do not \
drop items from the lists.";

const STANDARD_LENGTH: &str = "Keep the answer between 150 and 250 words.";

const EXTENDED_ADDENDUM: &str = "The learner asked to go deeper on the previous topic. \
Build on what was already said instead of repeating it, and aim for 300 to 450 words.";

const NO_CONTEXT_ADDENDUM: &str = "No workshop material matched this question. Start your \
reply with \u{26a0} and say that you don't have information on this topic in the workshop \
material, then suggest asking about a covered topic. Do not answer from general knowledge.";

const GREETING_REPLY: &str = "Hello! I'm your workshop tutor. Ask me anything about the \
topics we cover and I'll walk you through them.";

const FAREWELL_REPLY: &str = "Goodbye! Come back any time you want to keep exploring the \
workshop topics.";

/// Renders templates into generation inputs and holds the canned replies.
#[derive(Debug, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// System instructions for a template.
    pub fn system_instructions(&self, template: TemplateId) -> String {
        let mut parts = vec![BASE_PERSONA];
        match template {
            TemplateId::OverviewStandard | TemplateId::OverviewExtended => {
                parts.push(OVERVIEW_ADDENDUM);
            }
            TemplateId::NoContextStandard | TemplateId::NoContextExtended => {
                parts.push(NO_CONTEXT_ADDENDUM);
            }
            _ => {}
        }
        if template.extended() {
            parts.push(EXTENDED_ADDENDUM);
        } else {
            parts.push(STANDARD_LENGTH);
        }
        parts.join("\n\n")
    }

    /// User content: the question plus up to three truncated chunks.
    ///
    /// The question goes in verbatim on every turn; depth requests are
    /// carried by the extended-mode system addendum, not by rewording here.
    pub fn user_content(&self, question: &str, chunks: &[RetrievedChunk]) -> String {
        if chunks.is_empty() {
            return question.to_string();
        }

        let mut sections = Vec::with_capacity(MAX_PROMPT_CHUNKS + 1);
        for chunk in chunks.iter().take(MAX_PROMPT_CHUNKS) {
            sections.push(truncate_chars(&chunk.text, CHUNK_CHAR_LIMIT));
        }
        format!(
            "Workshop material:\n\n{}\n\nQuestion: {}",
            sections.join("\n\n---\n\n"),
            question
        )
    }

    pub fn greeting(&self) -> String {
        GREETING_REPLY.to_string()
    }

    pub fn farewell(&self) -> String {
        FAREWELL_REPLY.to_string()
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
