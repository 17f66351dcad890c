//! LanceDB connection setup

use anyhow::{anyhow, Result};
use lancedb::{connect, Connection};
use std::path::Path;

/// Connect to the index directory, creating it on first use
pub async fn create_connection(index_dir: &Path) -> Result<Connection> {
  if !index_dir.exists() {
    std::fs::create_dir_all(index_dir).map_err(|e| {
      anyhow!("Failed to create index directory {}: {}", index_dir.display(), e)
    })?;
  }

  connect(&index_dir.to_string_lossy())
    .execute()
    .await
    .map_err(|e| anyhow!("Failed to connect to LanceDB at {}: {}", index_dir.display(), e))
}
