//! Similarity index abstraction
//!
//! The service only needs "given text, return the nearest stored passages".
//! The LanceDB-backed index implements this for production; tests substitute
//! their own implementations.

use anyhow::Result;
use async_trait::async_trait;

/// A stored passage returned by a similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
  /// Passage text as stored in the index
  pub text: String,
  /// Similarity score (0.0-1.0, higher is more similar)
  pub similarity: f32,
}

impl Passage {
  pub fn new(text: impl Into<String>, similarity: f32) -> Self {
    Self { text: text.into(), similarity }
  }
}

/// Read-only nearest-neighbour search over precomputed passages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
  /// Up to `k` passages nearest to `query`, most similar first
  async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>>;

  /// Number of passages held by the index
  async fn passage_count(&self) -> Result<usize>;
}
