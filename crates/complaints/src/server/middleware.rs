//! Per-request context and logging middleware
//!
//! Every routed request gets a [`RequestContext`] in its extensions. Handlers
//! log through it so entries carry the request id, method and path.

use axum::{
  extract::{MatchedPath, Request, State},
  middleware::Next,
  response::Response,
};
use bentley::daemon_logs::{DaemonLogs, Level, LogContext};
use std::time::Instant;
use uuid::Uuid;

use crate::server::context::ServiceContext;
use crate::server::metrics::Endpoint;

/// Request metadata plus a handle to the service log
#[derive(Clone)]
pub struct RequestContext {
  pub request_id: Uuid,
  pub method: String,
  pub path: String,
  pub endpoint: Endpoint,
  logs: DaemonLogs,
}

impl RequestContext {
  pub fn new(method: &str, path: &str, endpoint: Endpoint, logs: DaemonLogs) -> Self {
    Self {
      request_id: Uuid::new_v4(),
      method: method.to_string(),
      path: path.to_string(),
      endpoint,
      logs,
    }
  }

  fn context(&self) -> LogContext {
    LogContext {
      request_id: Some(self.request_id.to_string()),
      method: Some(self.method.clone()),
      path: Some(self.path.clone()),
      ..Default::default()
    }
  }

  pub async fn log_info(&self, message: &str, component: &str) {
    self.log(Level::Info, message, component, self.context()).await;
  }

  pub async fn log_warn(&self, message: &str, component: &str) {
    self.log(Level::Warn, message, component, self.context()).await;
  }

  pub async fn log_error(&self, message: &str, component: &str) {
    self.log(Level::Error, message, component, self.context()).await;
  }

  /// Log the outcome of an operation run for a free-text query
  pub async fn log_query_outcome(
    &self,
    level: Level,
    message: &str,
    component: &str,
    query: &str,
    duration_ms: f64,
  ) {
    let context = LogContext {
      query: Some(query.to_string()),
      duration_ms: Some(duration_ms),
      ..self.context()
    };
    self.log(level, message, component, context).await;
  }

  pub async fn log_request_complete(&self, status_code: u16, duration_ms: f64) {
    let context =
      LogContext { status_code: Some(status_code), duration_ms: Some(duration_ms), ..self.context() };
    let message = format!("{} {} -> {} ({duration_ms:.2}ms)", self.method, self.path, status_code);
    self.log(Level::Verbose, &message, "http-request", context).await;
  }

  async fn log(&self, level: Level, message: &str, component: &str, context: LogContext) {
    let message = format!("[{}] {}", self.request_id, message);
    self.logs.record(level, component, &message, Some(context)).await;
  }
}

/// Attach a [`RequestContext`], then log and count the completed request
pub async fn request_context_middleware(
  State(ctx): State<ServiceContext>,
  request: Request,
  next: Next,
) -> Response {
  let endpoint = request
    .extensions()
    .get::<MatchedPath>()
    .map_or(Endpoint::Other, |matched| Endpoint::from_route(matched.as_str()));
  let context =
    RequestContext::new(request.method().as_str(), request.uri().path(), endpoint, ctx.logs.clone());

  let start_time = Instant::now();
  let mut request = request;
  request.extensions_mut().insert(context.clone());

  let response = next.run(request).await;

  let elapsed = start_time.elapsed();
  ctx.metrics.record_request(endpoint, elapsed);
  if !response.status().is_success() {
    ctx.metrics.record_error(endpoint);
  }
  context.log_request_complete(response.status().as_u16(), elapsed.as_secs_f64() * 1000.0).await;

  response
}
