//! Sentence embeddings for passages and queries
//!
//! The index builder and the query service must embed with the same model, so
//! the model id lives here and nowhere else.

use anyhow::{anyhow, Result};
use ort::session::Session;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};

use super::onnx::{fetch_model_files, load_session, load_tokenizer, to_i64_tensor};

pub const EMBEDDING_MODEL: &str = "Xenova/all-mpnet-base-v2";
const TOKENIZER_FILE: &str = "tokenizer.json";
const MODEL_FILE: &str = "onnx/model.onnx";

/// Longest input the encoder accepts; longer passages are truncated
const MAX_SEQUENCE_LENGTH: usize = 384;

pub struct EmbeddingModel {
  session: Session,
  tokenizer: Tokenizer,
}

#[cfg(not(tarpaulin_include))]
impl EmbeddingModel {
  /// Download (or reuse the cached copy of) the embedding model and load it
  pub async fn load() -> Result<Self> {
    bentley::info!("Loading embedding model {EMBEDDING_MODEL}...");

    let files = fetch_model_files(EMBEDDING_MODEL, &[TOKENIZER_FILE, MODEL_FILE]).await?;
    let mut tokenizer = load_tokenizer(&files[0])?;
    tokenizer
      .with_truncation(Some(TruncationParams { max_length: MAX_SEQUENCE_LENGTH, ..Default::default() }))
      .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    tokenizer.with_padding(None);
    let session = load_session(&files[1])?;

    Ok(Self { session, tokenizer })
  }

  /// Unit-length embedding for a single text
  pub fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
    let encoding =
      self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mask = encoding.get_attention_mask().to_vec();

    let mut input = HashMap::new();
    input.insert("input_ids".to_string(), to_i64_tensor(encoding.get_ids())?);
    input.insert("attention_mask".to_string(), to_i64_tensor(&mask)?);
    if self.session.inputs.iter().any(|input| input.name == "token_type_ids") {
      input.insert("token_type_ids".to_string(), to_i64_tensor(encoding.get_type_ids())?);
    }

    let output = self.session.run(input)?;
    let hidden = output
      .get("last_hidden_state")
      .or_else(|| output.get("token_embeddings"))
      .ok_or_else(|| anyhow!("No output found from model - expected 'last_hidden_state'"))?;
    let (shape, data) = hidden.try_extract_tensor::<f32>()?;

    let pooled = mean_pool(shape.as_ref(), data, &mask)?;
    Ok(normalize_embedding(pooled))
  }
}

/// Mean of the token vectors selected by the attention mask
///
/// `shape` is `[1, seq_len, hidden]` and `data` the row-major hidden states.
pub fn mean_pool(shape: &[i64], data: &[f32], attention_mask: &[u32]) -> Result<Vec<f32>> {
  if shape.len() != 3 {
    return Err(anyhow!("Expected a [batch, seq, hidden] tensor, got shape {:?}", shape));
  }
  let seq_length = shape[1] as usize;
  let hidden_size = shape[2] as usize;
  if data.len() < seq_length * hidden_size {
    return Err(anyhow!("Tensor data shorter than its shape {:?}", shape));
  }

  let mut pooled = vec![0.0f32; hidden_size];
  let mut counted = 0usize;
  for token in 0..seq_length {
    if attention_mask.get(token).copied().unwrap_or(1) == 0 {
      continue;
    }
    let start = token * hidden_size;
    for (sum, &value) in pooled.iter_mut().zip(&data[start..start + hidden_size]) {
      *sum += value;
    }
    counted += 1;
  }

  if counted > 0 {
    for value in pooled.iter_mut() {
      *value /= counted as f32;
    }
  }
  Ok(pooled)
}

/// Scale to unit L2 norm; zero vectors are returned unchanged
pub fn normalize_embedding(mut embedding: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
  if magnitude < f32::EPSILON {
    bentley::warn!("Zero-magnitude embedding detected - returning unchanged");
    return embedding;
  }

  for value in embedding.iter_mut() {
    *value /= magnitude;
  }
  embedding
}

/// Thread-safe handle that runs the model off the async executor
#[derive(Clone)]
pub struct Embedder {
  model: Arc<Mutex<EmbeddingModel>>,
}

#[cfg(not(tarpaulin_include))]
impl Embedder {
  pub fn new(model: EmbeddingModel) -> Self {
    Self { model: Arc::new(Mutex::new(model)) }
  }

  pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let model = Arc::clone(&self.model);
    let text = text.to_string();
    tokio::task::spawn_blocking(move || {
      let mut model = model.lock().map_err(|_| anyhow!("Embedding model lock poisoned"))?;
      model.embed(&text)
    })
    .await
    .map_err(|e| anyhow!("Embedding task failed: {}", e))?
  }
}
