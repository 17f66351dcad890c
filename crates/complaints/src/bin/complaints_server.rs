//! Complaints query service
//!
//! Loads the dataset, the passage index and both ONNX models once, then serves
//! summarization and lookup over HTTP.

use anyhow::{Context, Result};
use bentley::daemon_logs::DaemonLogs;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use complaints::dataset::{Dataset, SERVICE_COLUMNS};
use complaints::server::context::ServiceContext;
use complaints::server::services::bart::{BartModel, BartSummarizer};
use complaints::server::services::embeddings::{Embedder, EmbeddingModel};
use complaints::server::services::lancedb::{LanceDbIndex, DEFAULT_TABLE};
use complaints::server::services::summarizer::SummaryBounds;
use complaints::server::startup::{default_logs_path, start_server};

#[derive(Parser)]
#[command(name = "complaints_server")]
#[command(about = "Complaints summarization and lookup service")]
#[command(version)]
struct Args {
  /// Server bind address
  #[arg(long, default_value = "127.0.0.1:8000")]
  bind: SocketAddr,

  /// Complaint CSV export
  #[arg(long, env = "COMPLAINTS_DATA", default_value = "cleaned_complaints.csv")]
  data: PathBuf,

  /// LanceDB directory written by complaints_indexer
  #[arg(long, env = "COMPLAINTS_INDEX_DIR", default_value = "complaints_index")]
  index_dir: PathBuf,

  /// Passage table inside the index directory
  #[arg(long, env = "COMPLAINTS_TABLE", default_value = DEFAULT_TABLE)]
  table: String,

  /// JSONL service log (defaults to ~/.complaints/server.logs.jsonl)
  #[arg(long)]
  logs: Option<PathBuf>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Lance and ONNX Runtime log heavily at info
  let filter = if args.verbose {
    EnvFilter::new("info,lance=warn,lance_datafusion=warn,datafusion=warn,ort=warn")
  } else {
    EnvFilter::new("complaints=info,lance=error,lance_datafusion=error,datafusion=error,ort=error,warn")
  };
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let logs_path = args.logs.unwrap_or_else(default_logs_path);
  let logs = DaemonLogs::new(&logs_path)
    .with_context(|| format!("Failed to open service log {}", logs_path.display()))?;
  logs
    .info(&format!("Starting complaints server v{}", env!("CARGO_PKG_VERSION")), "complaints-server")
    .await;

  let dataset = Dataset::load(&args.data, SERVICE_COLUMNS)?;
  logs
    .info(&format!("Loaded {} complaints from {}", dataset.len(), args.data.display()), "complaints-server")
    .await;

  let embedder = Embedder::new(EmbeddingModel::load().await?);
  let index = LanceDbIndex::open(&args.index_dir, &args.table, embedder).await?;
  let summarizer = BartSummarizer::new(BartModel::load().await?, SummaryBounds::default());
  logs.info("Models and passage index loaded", "complaints-server").await;

  let ctx = ServiceContext::new(dataset, Arc::new(index), Arc::new(summarizer), logs);
  start_server(args.bind, ctx).await
}
