//! Abstractive summarization with a distilled BART encoder-decoder
//!
//! Decoding is greedy instead of the 4-beam search in the model's published
//! generation config, so identical input always produces identical output.
//! The decoder is re-run over the full prefix each step; the exported graph
//! without past key values keeps the session count at two.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use ndarray::Array3;
use ort::{session::Session, value::Value};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};

use super::onnx::{fetch_model_files, load_session, load_tokenizer, to_i64_tensor};
use super::summarizer::{SummaryBounds, Summarizer};

pub const SUMMARIZATION_MODEL: &str = "Xenova/distilbart-cnn-12-6";
const TOKENIZER_FILE: &str = "tokenizer.json";
const CONFIG_FILE: &str = "config.json";
const ENCODER_FILE: &str = "onnx/encoder_model.onnx";
const DECODER_FILE: &str = "onnx/decoder_model.onnx";

/// Encoder positional limit; longer input is truncated
const MAX_INPUT_TOKENS: usize = 1024;

/// Repeated n-grams of this size are never generated
const NO_REPEAT_NGRAM_SIZE: usize = 3;

/// Special token ids, read from the model's config.json
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecialTokens {
  pub decoder_start_token_id: i64,
  pub eos_token_id: i64,
  pub forced_bos_token_id: Option<i64>,
  pub pad_token_id: i64,
}

impl Default for SpecialTokens {
  fn default() -> Self {
    Self { decoder_start_token_id: 2, eos_token_id: 2, forced_bos_token_id: Some(0), pad_token_id: 1 }
  }
}

impl SpecialTokens {
  fn from_config(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .map_err(|e| anyhow!("Failed to read model config {}: {}", path.display(), e))?;
    let tokens = serde_json::from_str(&raw)?;
    Ok(tokens)
  }
}

pub struct BartModel {
  encoder: Session,
  decoder: Session,
  tokenizer: Tokenizer,
  tokens: SpecialTokens,
}

#[cfg(not(tarpaulin_include))]
impl BartModel {
  pub async fn load() -> Result<Self> {
    bentley::info!("Loading summarization model {SUMMARIZATION_MODEL}...");

    let files = fetch_model_files(
      SUMMARIZATION_MODEL,
      &[TOKENIZER_FILE, CONFIG_FILE, ENCODER_FILE, DECODER_FILE],
    )
    .await?;

    let mut tokenizer = load_tokenizer(&files[0])?;
    tokenizer
      .with_truncation(Some(TruncationParams { max_length: MAX_INPUT_TOKENS, ..Default::default() }))
      .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
    tokenizer.with_padding(None);

    let tokens = SpecialTokens::from_config(&files[1])?;
    let encoder = load_session(&files[2])?;
    let decoder = load_session(&files[3])?;

    Ok(Self { encoder, decoder, tokenizer, tokens })
  }

  pub fn summarize(&mut self, text: &str, bounds: SummaryBounds) -> Result<String> {
    let encoding =
      self.tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let input_ids = encoding.get_ids().to_vec();
    let attention_mask = encoding.get_attention_mask().to_vec();

    let hidden_states = self.encode(&input_ids, &attention_mask)?;
    let generated = self.decode(&hidden_states, &attention_mask, bounds)?;

    let ids: Vec<u32> = generated.iter().filter_map(|&id| u32::try_from(id).ok()).collect();
    let summary =
      self.tokenizer.decode(&ids, true).map_err(|e| anyhow!("Detokenization failed: {}", e))?;
    Ok(summary.trim().to_string())
  }

  fn encode(&mut self, input_ids: &[u32], attention_mask: &[u32]) -> Result<Array3<f32>> {
    let mut input = HashMap::new();
    input.insert("input_ids".to_string(), to_i64_tensor(input_ids)?);
    input.insert("attention_mask".to_string(), to_i64_tensor(attention_mask)?);

    let output = self.encoder.run(input)?;
    let hidden = output
      .get("last_hidden_state")
      .ok_or_else(|| anyhow!("Encoder produced no 'last_hidden_state'"))?;
    let (shape, data) = hidden.try_extract_tensor::<f32>()?;
    let dims: &[i64] = shape.as_ref();
    if dims.len() != 3 {
      return Err(anyhow!("Unexpected encoder output shape {:?}", dims));
    }

    let array = Array3::from_shape_vec(
      (dims[0] as usize, dims[1] as usize, dims[2] as usize),
      data.to_vec(),
    )?;
    Ok(array)
  }

  fn decode(
    &mut self,
    hidden_states: &Array3<f32>,
    attention_mask: &[u32],
    bounds: SummaryBounds,
  ) -> Result<Vec<i64>> {
    let mut sequence = vec![self.tokens.decoder_start_token_id];

    while sequence.len() < bounds.max_tokens {
      let mut input = HashMap::new();
      input.insert("input_ids".to_string(), to_i64_tensor(&sequence)?);
      input.insert("encoder_attention_mask".to_string(), to_i64_tensor(attention_mask)?);
      let states: Value = Value::from_array(hidden_states.clone())?.into();
      input.insert("encoder_hidden_states".to_string(), states);

      let output = self.decoder.run(input)?;
      let logits =
        output.get("logits").ok_or_else(|| anyhow!("Decoder produced no 'logits'"))?;
      let (shape, data) = logits.try_extract_tensor::<f32>()?;
      let mut scores = last_position_logits(shape.as_ref(), data)?.to_vec();

      constrain_logits(&mut scores, &sequence, &self.tokens, bounds);
      let next = argmax(&scores).ok_or_else(|| anyhow!("Every candidate token was banned"))?;

      sequence.push(next);
      if next == self.tokens.eos_token_id {
        break;
      }
    }

    Ok(sequence)
  }
}

/// Logits for the final decoder position of a `[1, seq, vocab]` tensor
pub fn last_position_logits<'a>(shape: &[i64], data: &'a [f32]) -> Result<&'a [f32]> {
  if shape.len() != 3 || shape[1] < 1 {
    return Err(anyhow!("Unexpected logits shape {:?}", shape));
  }
  let seq_length = shape[1] as usize;
  let vocab_size = shape[2] as usize;
  let start = (seq_length - 1) * vocab_size;
  data
    .get(start..start + vocab_size)
    .ok_or_else(|| anyhow!("Logits shorter than their shape {:?}", shape))
}

/// Apply the generation rules to the next-token scores
///
/// `sequence` includes the decoder start token, and lengths count it.
pub fn constrain_logits(
  scores: &mut [f32],
  sequence: &[i64],
  tokens: &SpecialTokens,
  bounds: SummaryBounds,
) {
  if sequence.len() == 1 {
    if let Some(bos) = tokens.forced_bos_token_id {
      force_token(scores, bos);
      return;
    }
  }

  if sequence.len() < bounds.min_tokens {
    ban_token(scores, tokens.eos_token_id);
  }

  if sequence.len() + 1 >= bounds.max_tokens {
    force_token(scores, tokens.eos_token_id);
    return;
  }

  for token in banned_ngram_tokens(sequence, NO_REPEAT_NGRAM_SIZE) {
    ban_token(scores, token);
  }
}

/// Tokens that would complete an n-gram already present in `sequence`
pub fn banned_ngram_tokens(sequence: &[i64], n: usize) -> HashSet<i64> {
  let mut banned = HashSet::new();
  if n == 0 || sequence.len() + 1 < n {
    return banned;
  }

  let prefix = &sequence[sequence.len() + 1 - n..];
  for window in sequence.windows(n) {
    if &window[..n - 1] == prefix {
      banned.insert(window[n - 1]);
    }
  }
  banned
}

/// Index of the highest finite score
pub fn argmax(scores: &[f32]) -> Option<i64> {
  scores
    .iter()
    .enumerate()
    .filter(|(_, score)| score.is_finite())
    .fold(None, |best: Option<(usize, f32)>, (index, &score)| match best {
      Some((_, top)) if top >= score => best,
      _ => Some((index, score)),
    })
    .map(|(index, _)| index as i64)
}

fn ban_token(scores: &mut [f32], token: i64) {
  if let Some(score) = usize::try_from(token).ok().and_then(|i| scores.get_mut(i)) {
    *score = f32::NEG_INFINITY;
  }
}

fn force_token(scores: &mut [f32], token: i64) {
  for (index, score) in scores.iter_mut().enumerate() {
    if index as i64 != token {
      *score = f32::NEG_INFINITY;
    }
  }
}

/// Summarizer backed by [`BartModel`], safe to share across request handlers
#[derive(Clone)]
pub struct BartSummarizer {
  model: Arc<Mutex<BartModel>>,
  bounds: SummaryBounds,
}

#[cfg(not(tarpaulin_include))]
impl BartSummarizer {
  pub fn new(model: BartModel, bounds: SummaryBounds) -> Self {
    Self { model: Arc::new(Mutex::new(model)), bounds }
  }
}

#[cfg(not(tarpaulin_include))]
#[async_trait]
impl Summarizer for BartSummarizer {
  async fn summarize(&self, text: &str) -> Result<String> {
    let model = Arc::clone(&self.model);
    let bounds = self.bounds;
    let text = text.to_string();
    tokio::task::spawn_blocking(move || {
      let mut model = model.lock().map_err(|_| anyhow!("Summarization model lock poisoned"))?;
      model.summarize(&text, bounds)
    })
    .await
    .map_err(|e| anyhow!("Summarization task failed: {}", e))?
  }
}
