//! Nearest-passage search over the LanceDB table

use anyhow::{anyhow, Result};
use arrow::array::{Array, Float32Array, StringArray};
use arrow::record_batch::RecordBatch;
use futures::stream::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Table;

use crate::server::services::similarity::Passage;

/// The `k` passages closest to `query_embedding`, most similar first
pub async fn search_passages(table: &Table, query_embedding: &[f32], k: usize) -> Result<Vec<Passage>> {
  let mut stream = table
    .vector_search(query_embedding)?
    .column("embedding")
    .limit(k)
    .execute()
    .await
    .map_err(|e| anyhow!("Vector search failed: {}", e))?;

  let mut passages = Vec::new();
  while let Some(batch) = stream.next().await {
    let batch = batch.map_err(|e| anyhow!("Error reading batch: {}", e))?;
    passages.extend(passages_from_batch(&batch)?);
  }

  // Batches are not guaranteed to arrive in distance order
  passages.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
  passages.truncate(k);

  if passages.is_empty() {
    bentley::verbose!("No similar passages found");
  }
  Ok(passages)
}

pub(crate) fn passages_from_batch(batch: &RecordBatch) -> Result<Vec<Passage>> {
  let texts = batch
    .column_by_name("text")
    .ok_or_else(|| anyhow!("Missing 'text' column"))?
    .as_any()
    .downcast_ref::<StringArray>()
    .ok_or_else(|| anyhow!("Failed to cast 'text' column to StringArray"))?;
  let distances =
    batch.column_by_name("_distance").and_then(|col| col.as_any().downcast_ref::<Float32Array>());

  let passages = (0..batch.num_rows())
    .map(|row| {
      let distance = distances.filter(|d| !d.is_null(row)).map_or(2.0, |d| d.value(row));
      Passage::new(texts.value(row), distance_to_similarity(distance))
    })
    .collect();
  Ok(passages)
}

/// Squared-L2 distance between unit vectors mapped onto `[0, 1]`
pub fn distance_to_similarity(distance: f32) -> f32 {
  (2.0 - distance.clamp(0.0, 2.0)) / 2.0
}
