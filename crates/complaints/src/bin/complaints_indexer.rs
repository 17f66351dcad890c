//! Builds the passage index the query service searches
//!
//! Every usable narrative in the dataset is embedded and written to a LanceDB
//! table, replacing whatever the table held before.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use complaints::dataset::{ComplaintRecord, Dataset, CLEANED_NARRATIVE, NARRATIVE};
use complaints::server::services::embeddings::{Embedder, EmbeddingModel};
use complaints::server::services::lancedb::{open_store, PassageRecord, DEFAULT_TABLE, EMBEDDING_DIMENSION};

/// Passages written per LanceDB append
const WRITE_BATCH_SIZE: usize = 256;

#[derive(Clone, Copy, ValueEnum)]
enum NarrativeColumn {
  /// `cleaned_narrative`
  Cleaned,
  /// `Consumer complaint narrative`
  Raw,
}

impl NarrativeColumn {
  fn header(self) -> &'static str {
    match self {
      Self::Cleaned => CLEANED_NARRATIVE,
      Self::Raw => NARRATIVE,
    }
  }

  fn text(self, record: &ComplaintRecord) -> Option<&str> {
    match self {
      Self::Cleaned => record.usable_cleaned_narrative(),
      Self::Raw => record.usable_narrative(),
    }
  }
}

#[derive(Parser)]
#[command(name = "complaints_indexer")]
#[command(about = "Embed complaint narratives into the passage index")]
#[command(version)]
struct Args {
  /// Complaint CSV export
  #[arg(long, env = "COMPLAINTS_DATA", default_value = "cleaned_complaints.csv")]
  data: PathBuf,

  /// LanceDB directory to write
  #[arg(long, env = "COMPLAINTS_INDEX_DIR", default_value = "complaints_index")]
  index_dir: PathBuf,

  /// Passage table inside the index directory
  #[arg(long, env = "COMPLAINTS_TABLE", default_value = DEFAULT_TABLE)]
  table: String,

  /// Narrative column to embed
  #[arg(long, value_enum, default_value = "cleaned")]
  column: NarrativeColumn,

  /// Index at most this many passages
  #[arg(long)]
  limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  tracing_subscriber::registry()
    .with(fmt::layer())
    .with(EnvFilter::new("lance=error,lance_datafusion=error,datafusion=error,ort=error,warn"))
    .init();

  let dataset = Dataset::load(&args.data, &[args.column.header()])?;
  let passages: Vec<(i64, &str)> = dataset
    .records()
    .iter()
    .filter_map(|record| args.column.text(record).map(|text| (record.id, text)))
    .take(args.limit.unwrap_or(usize::MAX))
    .collect();

  if passages.is_empty() {
    bail!("No usable '{}' values in {}", args.column.header(), args.data.display());
  }
  bentley::info!(
    "Indexing {} of {} complaints into '{}'",
    passages.len(),
    dataset.len(),
    args.table
  );

  let embedder = Embedder::new(EmbeddingModel::load().await?);
  let store = open_store(&args.index_dir, &args.table).await?;
  let mut writer = store.rebuild(EMBEDDING_DIMENSION).await?;

  let progress = ProgressBar::new(passages.len() as u64);
  if let Ok(style) = ProgressStyle::default_bar()
    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages ({percent}%)")
  {
    progress.set_style(style.progress_chars("#>-"));
  }

  let mut batch = Vec::with_capacity(WRITE_BATCH_SIZE);
  for (id, text) in passages {
    let embedding = embedder.embed(text).await?;
    batch.push(PassageRecord { complaint_id: id, text: text.to_string(), embedding });
    progress.inc(1);

    if batch.len() >= WRITE_BATCH_SIZE {
      writer.write(&batch).await?;
      batch.clear();
    }
  }
  writer.write(&batch).await?;
  progress.finish_and_clear();

  let written = writer.commit().await?;
  bentley::success!(
    "Indexed {} passages into {} ({})",
    written,
    args.index_dir.display(),
    store.table_name()
  );
  Ok(())
}
