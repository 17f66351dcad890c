//! Logs endpoint handler

use axum::{
  extract::{Extension, Query, State},
  http::StatusCode,
  response::Json,
};
use bentley::daemon_logs::Level;

use crate::server::context::ServiceContext;
use crate::server::middleware::RequestContext;
use crate::server::types::{LogsQuery, LogsResponse};

const DEFAULT_LIMIT: usize = 100;

/// GET /logs - Most recent service log entries, oldest first
pub async fn get_logs(
  State(ctx): State<ServiceContext>,
  Extension(context): Extension<RequestContext>,
  Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, (StatusCode, String)> {
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
  let level = query.level.as_deref().and_then(Level::parse_filter);

  match ctx.logs.get_logs(Some(limit), level).await {
    Ok(logs) => Ok(Json(LogsResponse { logs })),
    Err(e) => {
      context.log_error(&format!("Failed to read logs: {e}"), "logs-api").await;
      Err((StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to read logs: {e}")))
    }
  }
}
