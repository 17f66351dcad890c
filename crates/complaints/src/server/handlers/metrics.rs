//! Prometheus scrape endpoint

use axum::{extract::State, http::header, response::IntoResponse};

use crate::server::context::ServiceContext;

/// GET /metrics - Request counters in Prometheus text format
pub async fn metrics(State(ctx): State<ServiceContext>) -> impl IntoResponse {
  let passages = ctx.index.passage_count().await.ok();
  let body = ctx.metrics.to_prometheus(ctx.dataset.len(), passages);
  ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
