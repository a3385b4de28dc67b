//! Partitioned retriever: cross-partition search and arbitration.
//!
//! Both partitions are always searched, then the best match wins. The
//! asymmetric thresholds plus score comparison let a conversation pivot
//! freely between an introductory topic and a deep topic turn-by-turn
//! without the caller declaring which partition applies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tutor_core::config::RetrievalConfig;

use crate::embedding::EmbeddingProvider;
use crate::store::{Document, Partition, ScoredDocument, SearchRequest, VectorStore};

/// A retrieved snippet ready for prompt assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Flattened prose rendering of the document.
    pub text: String,
    /// Topic label of the source document.
    pub topic: String,
    /// Which partition the document came from.
    pub partition: Partition,
    /// Similarity score of the match.
    pub score: f32,
    /// Identifier of the source document.
    pub doc_id: String,
}

/// Outcome of one retrieval pass.
///
/// Invariant: `chunks` is empty iff `threshold_met` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    pub chunks: Vec<RetrievedChunk>,
    pub threshold_met: bool,
    /// Partition that won arbitration, when any result survived.
    pub dominant_partition: Option<Partition>,
    /// Keyword set of the winning overview document, kept so a later
    /// continuation turn can filter the knowledge base by it.
    pub overview_keywords: Vec<String>,
}

impl RetrievalOutcome {
    fn empty() -> Self {
        Self::default()
    }
}

/// Semantic retrieval across the overview and knowledge-base partitions.
pub struct PartitionedRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl PartitionedRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Retrieve relevant context for a query.
    ///
    /// `keyword_hint` is only populated on continuation turns tied to a
    /// prior overview match; it narrows the knowledge-base search before
    /// silently falling back to an unfiltered one.
    ///
    /// Never fails: embedding or store errors degrade to an empty outcome,
    /// which downstream selects the "no information available" prompt.
    pub async fn retrieve(
        &self,
        query: &str,
        keyword_hint: Option<&[String]>,
    ) -> RetrievalOutcome {
        let embedding = match self.embedder.embed(query).await {
            Ok(vector) => {
                if vector.len() != self.config.embedding_dimensions {
                    warn!(
                        expected = self.config.embedding_dimensions,
                        actual = vector.len(),
                        "Query embedding has wrong dimensionality"
                    );
                    return RetrievalOutcome::empty();
                }
                vector
            }
            Err(e) => {
                warn!(error = %e, "Failed to embed query");
                return RetrievalOutcome::empty();
            }
        };

        // Independent I/O-bound calls with no ordering dependency;
        // arbitration only needs both score sets.
        let overview_request = SearchRequest {
            embedding: embedding.clone(),
            partition: Partition::Overview,
            limit: self.config.overview_limit,
            min_score: self.config.overview_threshold,
            keywords: None,
        };
        let (overview, knowledge_base) = tokio::join!(
            self.search_partition(overview_request),
            self.search_knowledge_base(&embedding, keyword_hint),
        );

        let overview_score = overview.first().map(|d| d.score).unwrap_or(0.0);
        let kb_score = knowledge_base.first().map(|d| d.score).unwrap_or(0.0);
        info!(
            overview_score,
            kb_score, "Arbitrating between partition results"
        );

        // Best match wins. A very strong overview match answers alone so a
        // precise introduction is not diluted with tangential depth; ties
        // favor the knowledge base so depth beats framing.
        if overview_score > self.config.strong_overview_score {
            return self.format_results(&overview[..1], Partition::Overview);
        }
        if kb_score >= overview_score && !knowledge_base.is_empty() {
            let top = knowledge_base.len().min(self.config.knowledge_base_top);
            return self.format_results(&knowledge_base[..top], Partition::KnowledgeBase);
        }
        if !overview.is_empty() {
            return self.format_results(&overview[..1], Partition::Overview);
        }

        info!("No results above threshold in either partition");
        RetrievalOutcome::empty()
    }

    /// Run one partition search, degrading to no results on failure so the
    /// other partition still participates in arbitration.
    async fn search_partition(&self, request: SearchRequest) -> Vec<ScoredDocument> {
        match self.store.search(&request).await {
            Ok(results) => results,
            Err(e) => {
                warn!(
                    partition = ?request.partition,
                    error = %e,
                    "Partition search failed"
                );
                Vec::new()
            }
        }
    }

    /// Knowledge-base search with optional keyword narrowing.
    ///
    /// A keyword-filtered search that returns zero rows falls back to the
    /// unfiltered search over the same partition and same embedding.
    async fn search_knowledge_base(
        &self,
        embedding: &[f32],
        keyword_hint: Option<&[String]>,
    ) -> Vec<ScoredDocument> {
        let base_request = SearchRequest {
            embedding: embedding.to_vec(),
            partition: Partition::KnowledgeBase,
            limit: self.config.knowledge_base_limit,
            min_score: self.config.knowledge_base_threshold,
            keywords: None,
        };

        if let Some(keywords) = keyword_hint.filter(|k| !k.is_empty()) {
            let filtered_request = SearchRequest {
                keywords: Some(keywords.to_vec()),
                ..base_request.clone()
            };
            let filtered = self.search_partition(filtered_request).await;
            if !filtered.is_empty() {
                info!(
                    results = filtered.len(),
                    "Keyword-filtered knowledge-base search matched"
                );
                return filtered;
            }
            info!("No keyword match, falling back to unfiltered search");
        }

        self.search_partition(base_request).await
    }

    /// Flatten the winning documents into prose chunks.
    fn format_results(
        &self,
        results: &[ScoredDocument],
        partition: Partition,
    ) -> RetrievalOutcome {
        let mut chunks = Vec::with_capacity(results.len());
        for scored in results {
            let text = match partition {
                Partition::Overview => format_overview_chunk(&scored.document),
                Partition::KnowledgeBase => match format_knowledge_chunk(&scored.document) {
                    Some(text) => text,
                    None => {
                        warn!(
                            doc_id = %scored.document.id,
                            "Document has no content or summary, skipping"
                        );
                        continue;
                    }
                },
            };
            chunks.push(RetrievedChunk {
                text,
                topic: scored.document.topic.clone(),
                partition,
                score: scored.score,
                doc_id: scored.document.id.clone(),
            });
        }

        if chunks.is_empty() {
            return RetrievalOutcome::empty();
        }

        let overview_keywords = if partition == Partition::Overview {
            results
                .first()
                .map(|s| s.document.keywords.clone())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        info!(
            count = chunks.len(),
            partition = ?partition,
            "Retrieval complete"
        );

        RetrievalOutcome {
            chunks,
            threshold_met: true,
            dominant_partition: Some(partition),
            overview_keywords,
        }
    }
}

/// Render an overview document's structured fields as flat prose so
/// generation receives uniform paragraphs.
fn format_overview_chunk(doc: &Document) -> String {
    let mut parts = vec![
        format!("Topic: {}", doc.topic),
        "Category: Workshop Presentation".to_string(),
        String::new(),
    ];

    let data = doc.overview.clone().unwrap_or_default();

    if let Some(intro) = &data.intro {
        parts.push(format!("Introduction: {}", intro));
        parts.push(String::new());
    }
    if let Some(description) = &data.description {
        parts.push(format!("Description: {}", description));
        parts.push(String::new());
    }
    push_item_section(&mut parts, "Key Features:", &data.features);
    push_item_section(&mut parts, "Activities:", &data.activities);
    push_item_section(&mut parts, "Career Opportunities:", &data.careers);

    if !data.key_benefits.is_empty() {
        parts.push("Key Benefits:".to_string());
        for benefit in &data.key_benefits {
            parts.push(format!("- {}", benefit));
        }
        parts.push(String::new());
    }

    parts.join("\n")
}

fn push_item_section(parts: &mut Vec<String>, heading: &str, items: &[crate::store::ItemEntry]) {
    if items.is_empty() {
        return;
    }
    parts.push(heading.to_string());
    for item in items {
        if item.title.is_empty() || item.description.is_empty() {
            continue;
        }
        let mut line = format!("- {}: {}", item.title, item.description);
        if let Some(example) = &item.example {
            line.push_str(&format!(" Example: {}", example));
        }
        parts.push(line);
    }
    parts.push(String::new());
}

/// Render a knowledge-base document, preferring full content over summary.
/// Returns `None` when the document carries neither.
fn format_knowledge_chunk(doc: &Document) -> Option<String> {
    let body = doc
        .content
        .as_deref()
        .filter(|c| !c.is_empty())
        .or(doc.summary.as_deref().filter(|s| !s.is_empty()))?;

    Some(format!(
        "Topic: {}\nCategory: {}\nLevel: {}\n\nContent:\n{}",
        doc.topic,
        doc.category.as_deref().unwrap_or("N/A"),
        doc.level.as_deref().unwrap_or("N/A"),
        body
    ))
}

// =============================================================================
// Tests
// =============================================================================
