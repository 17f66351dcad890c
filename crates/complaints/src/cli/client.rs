//! HTTP client for the complaint query service

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::server::types::{ComplaintResponse, StatusResponse, SummarizeRequest, SummarizeResponse};

pub const SERVER_URL_ENV: &str = "COMPLAINTS_SERVER_URL";
pub const TIMEOUT_ENV: &str = "COMPLAINTS_TIMEOUT_SECS";

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Transport-level failures; error payloads from the service are not errors here
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("Failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("Could not reach the query service at {url}: {source}")]
  Transport { url: String, source: reqwest::Error },

  #[error("Query service returned HTTP {status} for {url}")]
  Status { url: String, status: StatusCode },

  #[error("Unreadable response from {url}: {source}")]
  Decode { url: String, source: reqwest::Error },
}

/// Configuration for the query service client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
  /// Base URL of the service (e.g., "http://127.0.0.1:8000")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: DEFAULT_SERVER_URL.to_string(), timeout_secs: DEFAULT_TIMEOUT_SECS }
  }
}

impl ClientConfig {
  /// Read `COMPLAINTS_SERVER_URL` and `COMPLAINTS_TIMEOUT_SECS`, falling back to defaults
  pub fn from_env() -> Self {
    let base_url = std::env::var(SERVER_URL_ENV)
      .ok()
      .map(|url| url.trim().trim_end_matches('/').to_string())
      .filter(|url| !url.is_empty())
      .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    let timeout_secs = std::env::var(TIMEOUT_ENV)
      .ok()
      .and_then(|secs| secs.trim().parse().ok())
      .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Self { base_url, timeout_secs }
  }
}

/// Thin client over the service's two data endpoints
pub struct ComplaintsClient {
  client: Client,
  config: ClientConfig,
}

impl ComplaintsClient {
  pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(ClientError::Build)?;

    Ok(Self { client, config })
  }

  /// POST /summarize
  pub async fn summarize(&self, query: &str) -> Result<SummarizeResponse, ClientError> {
    let url = format!("{}/summarize", self.config.base_url);
    let request = SummarizeRequest { query: query.to_string() };
    let response = self
      .client
      .post(&url)
      .json(&request)
      .send()
      .await
      .map_err(|source| ClientError::Transport { url: url.clone(), source })?;

    decode(url, response).await
  }

  /// GET /complaint/{id}
  pub async fn lookup(&self, id: i64) -> Result<ComplaintResponse, ClientError> {
    let url = format!("{}/complaint/{}", self.config.base_url, id);
    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|source| ClientError::Transport { url: url.clone(), source })?;

    decode(url, response).await
  }

  /// GET /status with a short timeout
  pub async fn health_check(&self) -> Result<StatusResponse, ClientError> {
    let url = format!("{}/status", self.config.base_url);
    let response = self
      .client
      .get(&url)
      .timeout(Duration::from_secs(5))
      .send()
      .await
      .map_err(|source| ClientError::Transport { url: url.clone(), source })?;

    decode(url, response).await
  }
}

async fn decode<T: DeserializeOwned>(url: String, response: reqwest::Response) -> Result<T, ClientError> {
  let status = response.status();
  if status != StatusCode::OK {
    return Err(ClientError::Status { url, status });
  }
  response.json().await.map_err(|source| ClientError::Decode { url, source })
}

/// Get the configured client (checks environment variables)
pub fn get_client() -> Result<ComplaintsClient, ClientError> {
  ComplaintsClient::with_config(ClientConfig::from_env())
}
