//! Retrieval-augmented summarization: nearest passages in, summary out

use anyhow::{bail, Result};

use super::similarity::{Passage, SimilarityIndex};
use super::summarizer::Summarizer;

/// Number of passages retrieved for each query
pub const RETRIEVAL_K: usize = 3;

/// Concatenate passages with single spaces, keeping the index's rank order
pub fn join_passages(passages: &[Passage]) -> String {
  passages.iter().map(|passage| passage.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// Retrieve the nearest passages for `query` and summarize them
///
/// An empty retrieval or an empty generated summary is an error, so a
/// successful result always carries text.
pub async fn summarize_query(
  index: &dyn SimilarityIndex,
  summarizer: &dyn Summarizer,
  query: &str,
) -> Result<String> {
  let passages = index.search(query, RETRIEVAL_K).await?;
  if passages.is_empty() {
    bail!("Similarity index returned no passages");
  }

  let combined = join_passages(&passages);
  let summary = summarizer.summarize(&combined).await?;

  let summary = summary.trim();
  if summary.is_empty() {
    bail!("Summarization model produced an empty summary");
  }

  Ok(summary.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::server::services::similarity::MockSimilarityIndex;
  use crate::server::services::summarizer::MockSummarizer;
  use anyhow::anyhow;

  fn passages() -> Vec<Passage> {
    vec![
      Passage::new("late fee charged twice", 0.92),
      Passage::new("bank refused to refund", 0.88),
      Passage::new("fees on closed account", 0.81),
    ]
  }

  #[test]
  fn test_join_passages_uses_single_spaces_in_rank_order() {
    assert_eq!(
      join_passages(&passages()),
      "late fee charged twice bank refused to refund fees on closed account"
    );
    assert_eq!(join_passages(&[]), "");
  }

  #[tokio::test]
  async fn test_summarize_query_retrieves_three_and_summarizes_concatenation() {
    let mut index = MockSimilarityIndex::new();
    index
      .expect_search()
      .withf(|query, k| query == "late fees" && *k == RETRIEVAL_K)
      .times(1)
      .returning(|_, _| Ok(passages()));

    let mut summarizer = MockSummarizer::new();
    summarizer
      .expect_summarize()
      .withf(|text| text == "late fee charged twice bank refused to refund fees on closed account")
      .times(1)
      .returning(|_| Ok("  Customers report duplicate late fees.  ".to_string()));

    let summary = summarize_query(&index, &summarizer, "late fees").await.unwrap();
    assert_eq!(summary, "Customers report duplicate late fees.");
  }

  #[tokio::test]
  async fn test_empty_retrieval_is_an_error() {
    let mut index = MockSimilarityIndex::new();
    index.expect_search().returning(|_, _| Ok(Vec::new()));
    let mut summarizer = MockSummarizer::new();
    summarizer.expect_summarize().never();

    let err = summarize_query(&index, &summarizer, "anything").await.unwrap_err();
    assert!(err.to_string().contains("no passages"));
  }

  #[tokio::test]
  async fn test_blank_summary_is_an_error() {
    let mut index = MockSimilarityIndex::new();
    index.expect_search().returning(|_, _| Ok(passages()));
    let mut summarizer = MockSummarizer::new();
    summarizer.expect_summarize().returning(|_| Ok("   ".to_string()));

    assert!(summarize_query(&index, &summarizer, "fees").await.is_err());
  }

  #[tokio::test]
  async fn test_model_failure_propagates() {
    let mut index = MockSimilarityIndex::new();
    index.expect_search().returning(|_, _| Ok(passages()));
    let mut summarizer = MockSummarizer::new();
    summarizer.expect_summarize().returning(|_| Err(anyhow!("session run failed")));

    let err = summarize_query(&index, &summarizer, "fees").await.unwrap_err();
    assert_eq!(err.to_string(), "session run failed");
  }
}
