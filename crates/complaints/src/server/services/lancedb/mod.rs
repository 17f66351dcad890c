//! LanceDB-backed passage index
//!
//! Passages are complaint narratives embedded ahead of time by the indexer
//! binary. At query time the query text is embedded with the same model and
//! matched against the stored vectors.

pub mod connection;
pub mod records;
pub mod search;
pub mod store;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

use super::embeddings::Embedder;
use super::similarity::{Passage, SimilarityIndex};
use connection::create_connection;
use search::search_passages;

pub use records::PassageRecord;
pub use store::{PassageStore, PassageWriter};

/// Default table name shared by the indexer and the server
pub const DEFAULT_TABLE: &str = "complaint_passages";

/// Output width of the embedding model
pub const EMBEDDING_DIMENSION: usize = 768;

pub async fn open_store(index_dir: &Path, table_name: &str) -> Result<PassageStore> {
  let connection = create_connection(index_dir).await?;
  Ok(PassageStore::new(connection, table_name))
}

/// Read-only similarity index over a populated passage table
pub struct LanceDbIndex {
  store: PassageStore,
  embedder: Embedder,
}

#[cfg(not(tarpaulin_include))]
impl LanceDbIndex {
  /// Open an existing table; a missing table is an error since the server cannot rebuild it
  pub async fn open(index_dir: &Path, table_name: &str, embedder: Embedder) -> Result<Self> {
    let store = open_store(index_dir, table_name).await?;
    if !store.table_exists().await? {
      anyhow::bail!(
        "No passage table '{}' in {}. Run complaints_indexer first.",
        table_name,
        index_dir.display()
      );
    }
    Ok(Self { store, embedder })
  }
}

#[cfg(not(tarpaulin_include))]
#[async_trait]
impl SimilarityIndex for LanceDbIndex {
  async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>> {
    let embedding = self.embedder.embed(query).await?;
    let table = self.store.open_table().await?;
    search_passages(&table, &embedding, k).await
  }

  async fn passage_count(&self) -> Result<usize> {
    self.store.count_passages().await
  }
}
