//! Axum router configuration for all endpoints

use axum::{
  middleware::from_fn_with_state,
  routing::{get, post},
  Router,
};

use crate::server::context::ServiceContext;
use crate::server::handlers::{complaint, logs, metrics, status, summarize};
use crate::server::middleware::request_context_middleware;

/// Create the application router over a fully loaded service context
pub fn create_router(ctx: ServiceContext) -> Router {
  Router::new()
    .route("/summarize", post(summarize::summarize))
    .route("/complaint/{id}", get(complaint::get_complaint))
    // Operational endpoints
    .route("/status", get(status::status))
    .route("/version", get(status::version))
    .route("/logs", get(logs::get_logs))
    .route("/metrics", get(metrics::metrics))
    .route_layer(from_fn_with_state(ctx.clone(), request_context_middleware))
    .with_state(ctx)
}
