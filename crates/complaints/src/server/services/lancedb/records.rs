//! Arrow conversion for passage rows

use anyhow::{anyhow, Result};
use arrow::array::{Array, FixedSizeListBuilder, Float32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// One indexed passage: a complaint narrative and its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct PassageRecord {
  pub complaint_id: i64,
  pub text: String,
  pub embedding: Vec<f32>,
}

impl PassageRecord {
  pub fn row_id(&self) -> String {
    format!("complaint:{}", self.complaint_id)
  }
}

pub fn passage_schema(dimension: usize) -> SchemaRef {
  Arc::new(Schema::new(vec![
    Field::new("id", DataType::Utf8, false),
    Field::new("complaint_id", DataType::Int64, false),
    Field::new("text", DataType::Utf8, false),
    Field::new(
      "embedding",
      DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dimension as i32),
      false,
    ),
  ]))
}

/// Build a batch from passages that all share `dimension`
pub fn records_to_arrow_batch(records: &[PassageRecord], dimension: usize) -> Result<RecordBatch> {
  if records.is_empty() {
    return Err(anyhow!("Cannot create RecordBatch from empty records"));
  }
  if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimension) {
    return Err(anyhow!(
      "Complaint {} has a {}-dimensional embedding, expected {}",
      bad.complaint_id,
      bad.embedding.len(),
      dimension
    ));
  }

  let ids = StringArray::from(records.iter().map(PassageRecord::row_id).collect::<Vec<_>>());
  let complaint_ids = Int64Array::from(records.iter().map(|r| r.complaint_id).collect::<Vec<_>>());
  let texts = StringArray::from(records.iter().map(|r| r.text.as_str()).collect::<Vec<_>>());

  let mut embeddings = FixedSizeListBuilder::new(
    Float32Array::builder(dimension * records.len()),
    dimension as i32,
  );
  for record in records {
    embeddings.values().append_slice(&record.embedding);
    embeddings.append(true);
  }

  let columns: Vec<Arc<dyn Array>> = vec![
    Arc::new(ids),
    Arc::new(complaint_ids),
    Arc::new(texts),
    Arc::new(embeddings.finish()),
  ];

  RecordBatch::try_new(passage_schema(dimension), columns)
    .map_err(|e| anyhow!("Failed to create RecordBatch: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: i64, embedding: Vec<f32>) -> PassageRecord {
    PassageRecord { complaint_id: id, text: format!("narrative {id}"), embedding }
  }

  #[test]
  fn test_batch_has_one_row_per_passage() {
    let batch =
      records_to_arrow_batch(&[record(7, vec![1.0, 0.0]), record(9, vec![0.0, 1.0])], 2).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 4);
    let ids = batch.column_by_name("id").unwrap().as_any().downcast_ref::<StringArray>().unwrap();
    assert_eq!(ids.value(1), "complaint:9");
  }

  #[test]
  fn test_rejects_empty_and_mismatched_dimensions() {
    assert!(records_to_arrow_batch(&[], 2).is_err());
    let err = records_to_arrow_batch(&[record(1, vec![1.0, 0.0, 0.0])], 2).unwrap_err();
    assert!(err.to_string().contains("Complaint 1"));
  }
}
