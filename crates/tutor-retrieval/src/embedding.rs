//! Embedding provider contract.
//!
//! The engine never computes embeddings itself; it hands query text to an
//! injected provider and validates the dimensionality of what comes back.
//! `MockEmbedding` provides deterministic hash-based vectors for testing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;

use crate::error::RetrievalError;

/// Service for turning query text into a fixed-dimensional vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;

    /// Dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Deterministic hash-based embedding for tests.
///
/// The same text always maps to the same vector, and different texts are
/// very unlikely to collide. Not semantically meaningful.
#[derive(Debug, Clone)]
pub struct MockEmbedding {
    dimensions: usize,
}

impl MockEmbedding {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vector = Vec::with_capacity(self.dimensions);
        for i in 0..self.dimensions {
            let mut hasher = DefaultHasher::new();
            text.hash(&mut hasher);
            i.hash(&mut hasher);
            let value = (hasher.finish() % 2000) as f32 / 1000.0 - 1.0;
            vector.push(value);
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_embedding_is_deterministic() {
        let mock = MockEmbedding::new(64);
        let a = mock.embed("neural networks").await.unwrap();
        let b = mock.embed("neural networks").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embedding_differs_across_texts() {
        let mock = MockEmbedding::new(64);
        let a = mock.embed("neural networks").await.unwrap();
        let b = mock.embed("decision trees").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_mock_embedding_dimensions() {
        let mock = MockEmbedding::default();
        assert_eq!(mock.dimensions(), 1024);
        let vector = mock.embed("anything").await.unwrap();
        assert_eq!(vector.len(), 1024);
    }

    #[tokio::test]
    async fn test_mock_embedding_values_bounded() {
        let mock = MockEmbedding::new(128);
        let vector = mock.embed("bounds").await.unwrap();
        assert!(vector.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
