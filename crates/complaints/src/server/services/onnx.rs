//! Shared ONNX Runtime plumbing: model download, session setup, tensor helpers

use anyhow::{anyhow, Result};
use hf_hub::api::tokio::Api;
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

#[cfg(target_os = "linux")]
use ort::execution_providers::CUDAExecutionProvider;
#[cfg(target_os = "macos")]
use ort::execution_providers::CoreMLExecutionProvider;
use ort::{
  execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch},
  session::Session,
  value::Value,
};

/// Download `files` from a Hugging Face model repository, returning local paths in order
#[cfg(not(tarpaulin_include))]
pub async fn fetch_model_files(model: &str, files: &[&str]) -> Result<Vec<PathBuf>> {
  let api = Api::new().map_err(|e| anyhow!("HF API initialization failed: {}", e))?;
  let repo = api.model(model.to_string());

  let mut paths = Vec::with_capacity(files.len());
  for file in files {
    let path = repo
      .get(file)
      .await
      .map_err(|e| anyhow!("Failed to download {} from {}: {}", file, model, e))?;
    bentley::verbose!("Fetched {model}/{file}");
    paths.push(path);
  }
  Ok(paths)
}

#[cfg(not(tarpaulin_include))]
pub fn load_tokenizer(path: &Path) -> Result<Tokenizer> {
  Tokenizer::from_file(path).map_err(|e| anyhow!("Failed to load tokenizer: {}", e))
}

#[cfg(not(tarpaulin_include))]
pub fn load_session(path: &Path) -> Result<Session> {
  let session = Session::builder()?
    .with_execution_providers(execution_providers())?
    .commit_from_file(path)
    .map_err(|e| anyhow!("Failed to load ONNX model {}: {}", path.display(), e))?;
  Ok(session)
}

#[cfg(not(tarpaulin_include))]
fn execution_providers() -> Vec<ExecutionProviderDispatch> {
  let mut providers = Vec::new();

  #[cfg(target_os = "macos")]
  {
    providers.push(CoreMLExecutionProvider::default().into());
  }

  #[cfg(target_os = "linux")]
  {
    if is_cuda_available() {
      providers.push(CUDAExecutionProvider::default().build().error_on_failure());
    }
  }

  providers.push(CPUExecutionProvider::default().into());
  providers
}

/// Hardware-level CUDA check; ONNX Runtime falls back to CPU when absent
#[cfg(target_os = "linux")]
fn is_cuda_available() -> bool {
  std::process::Command::new("nvidia-smi")
    .output()
    .map(|output| output.status.success())
    .unwrap_or(false)
}

/// A `[1, len]` int64 tensor, the shape every text model here takes ids and masks in
pub fn to_i64_tensor<T: Copy + Into<i64>>(values: &[T]) -> Result<Value> {
  let ids: Vec<i64> = values.iter().map(|&x| x.into()).collect();
  let array: Array2<i64> = Array2::from_shape_vec((1, ids.len()), ids)?;
  let tensor: Value = Value::from_array(array)?.into();
  Ok(tensor)
}
