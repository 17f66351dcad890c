//! Summarize endpoint handler

use axum::{
  extract::{Extension, Json, State},
  response::Json as ResponseJson,
};
use bentley::daemon_logs::Level;
use std::time::Instant;

use crate::server::context::ServiceContext;
use crate::server::metrics::Endpoint;
use crate::server::middleware::RequestContext;
use crate::server::services::pipeline::summarize_query;
use crate::server::types::{SummarizeRequest, SummarizeResponse, EMPTY_QUERY, SUMMARIZE_FAILED};

const COMPONENT: &str = "summarize-api";

/// POST /summarize - Summarize the passages nearest to a free-text query
///
/// Failures are logged with their full detail but answered with one generic
/// message so model and index internals stay off the wire.
pub async fn summarize(
  State(ctx): State<ServiceContext>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<SummarizeRequest>,
) -> ResponseJson<SummarizeResponse> {
  let query = request.query.as_str();
  if query.trim().is_empty() {
    ctx.metrics.record_error(Endpoint::Summarize);
    context.log_warn("Rejected empty summarize query", COMPONENT).await;
    return ResponseJson(SummarizeResponse::error(EMPTY_QUERY));
  }

  let start_time = Instant::now();
  let result = summarize_query(ctx.index.as_ref(), ctx.summarizer.as_ref(), query).await;
  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

  match result {
    Ok(summary) => {
      context
        .log_query_outcome(
          Level::Success,
          &format!("Summarized query in {duration_ms:.2}ms"),
          COMPONENT,
          query,
          duration_ms,
        )
        .await;
      ResponseJson(SummarizeResponse::Summary { summary })
    }
    Err(e) => {
      ctx.metrics.record_error(Endpoint::Summarize);
      context
        .log_query_outcome(
          Level::Error,
          &format!("Summarization failed after {duration_ms:.2}ms: {e:#}"),
          COMPONENT,
          query,
          duration_ms,
        )
        .await;
      ResponseJson(SummarizeResponse::error(SUMMARIZE_FAILED))
    }
  }
}
