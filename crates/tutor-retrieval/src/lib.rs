//! Partitioned semantic retrieval for the tutoring engine.
//!
//! Queries two content partitions (curated overview material and the deeper
//! knowledge base) through an external vector-store contract, applies
//! per-partition thresholds, and arbitrates which partition's results feed
//! the answer.

pub mod embedding;
pub mod error;
pub mod retriever;
pub mod store;

pub use embedding::{EmbeddingProvider, MockEmbedding};
pub use error::RetrievalError;
pub use retriever::{PartitionedRetriever, RetrievalOutcome, RetrievedChunk};
pub use store::{
    Document, ItemEntry, OverviewData, Partition, ScoredDocument, SearchRequest, VectorStore,
};
