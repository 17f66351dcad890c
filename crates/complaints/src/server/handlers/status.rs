//! Status and version endpoint handlers

use axum::{extract::State, response::Json};

use crate::server::context::ServiceContext;
use crate::server::types::{StatusResponse, VersionResponse};

/// GET /status - Health check with dataset and index sizes
pub async fn status(State(ctx): State<ServiceContext>) -> Json<StatusResponse> {
  let passages = match ctx.index.passage_count().await {
    Ok(count) => Some(count),
    Err(e) => {
      ctx.logs.warn(&format!("Failed to count index passages: {e}"), "status-api").await;
      None
    }
  };

  Json(StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    records: ctx.dataset.len(),
    passages,
  })
}

/// GET /version - Returns current service version
pub async fn version() -> Json<VersionResponse> {
  Json(VersionResponse { version: env!("CARGO_PKG_VERSION").to_string() })
}
