//! REST server startup and configuration

use anyhow::{anyhow, Result};
use axum::{serve, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::context::ServiceContext;
use crate::server::routing::create_router;

/// The router with tracing and CORS layers applied
pub fn build_app(ctx: ServiceContext) -> Router {
  create_router(ctx).layer(
    ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()),
  )
}

/// Bind `addr` and serve until the process is stopped
pub async fn start_server(addr: SocketAddr, ctx: ServiceContext) -> Result<()> {
  let logs = ctx.logs.clone();
  let app = build_app(ctx);

  let listener = TcpListener::bind(addr)
    .await
    .map_err(|e| anyhow!("Failed to bind {addr}: {e}"))?;
  logs.info(&format!("Server listening on {addr}"), "complaints-server").await;

  match serve(listener, app).await {
    Ok(()) => {
      logs.info("Server shutdown gracefully", "complaints-server").await;
      Ok(())
    }
    Err(e) => {
      logs.error(&format!("Server error: {e}"), "complaints-server").await;
      Err(anyhow!("Server error: {}", e))
    }
  }
}

/// Default location of the persistent service log
pub fn default_logs_path() -> PathBuf {
  dirs::home_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join(".complaints")
    .join("server.logs.jsonl")
}
