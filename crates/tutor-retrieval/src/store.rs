//! Vector document store contract and document shapes.
//!
//! The store executes approximate nearest-neighbor search externally; the
//! engine only builds requests and consumes scored documents. Two logical
//! partitions share one store: curated overview material with structured
//! fields, and flat knowledge-base entries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// One of the two logically separate content partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Overview,
    KnowledgeBase,
}

/// A titled entry inside overview material (feature, activity, or career).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub example: Option<String>,
}

/// Structured fields carried only by overview-partition documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewData {
    #[serde(default)]
    pub intro: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<ItemEntry>,
    #[serde(default)]
    pub activities: Vec<ItemEntry>,
    #[serde(default)]
    pub careers: Vec<ItemEntry>,
    #[serde(default, alias = "keyBenefits")]
    pub key_benefits: Vec<String>,
}

/// A document as stored in the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub topic: String,
    pub partition: Partition,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub overview: Option<OverviewData>,
}

/// A document paired with its similarity score, `score` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}

/// A similarity-search request against one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub embedding: Vec<f32>,
    pub partition: Partition,
    pub limit: usize,
    pub min_score: f32,
    /// When present, restrict candidates to documents whose keyword set
    /// intersects this list.
    pub keywords: Option<Vec<String>>,
}

/// External vector-search contract.
///
/// Implementations must return results ordered by descending score and
/// must not return entries below `min_score`. The store is never mutated
/// through this interface.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<ScoredDocument>, RetrievalError>;
}
