//! Summarization model abstraction

use anyhow::Result;
use async_trait::async_trait;

/// Longest summary the model may generate, in model tokens
pub const MAX_SUMMARY_TOKENS: usize = 150;

/// Shortest summary the model may generate, in model tokens
pub const MIN_SUMMARY_TOKENS: usize = 60;

/// Generation length bounds, fixed when the model is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBounds {
  pub min_tokens: usize,
  pub max_tokens: usize,
}

impl Default for SummaryBounds {
  fn default() -> Self {
    Self { min_tokens: MIN_SUMMARY_TOKENS, max_tokens: MAX_SUMMARY_TOKENS }
  }
}

/// Text-to-shorter-text model with deterministic output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
  async fn summarize(&self, text: &str) -> Result<String>;
}
