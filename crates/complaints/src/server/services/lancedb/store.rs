//! Table lifecycle for the passage index
//!
//! A rebuild writes into a staging table. The live table is only replaced
//! when the rebuild is committed, so a failed indexing run leaves the
//! previous passages searchable.

use anyhow::{anyhow, bail, Result};
use arrow::record_batch::{RecordBatch, RecordBatchIterator};
use futures::stream::StreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::table::AddDataMode;
use lancedb::{Connection, Table};

use super::records::{records_to_arrow_batch, PassageRecord};

/// Owns the connection and knows which table holds the passages
pub struct PassageStore {
  connection: Connection,
  table_name: String,
}

impl PassageStore {
  pub fn new(connection: Connection, table_name: impl Into<String>) -> Self {
    Self { connection, table_name: table_name.into() }
  }

  pub fn table_name(&self) -> &str {
    &self.table_name
  }

  fn staging_name(&self) -> String {
    format!("{}_staging", self.table_name)
  }

  async fn has_table(&self, name: &str) -> Result<bool> {
    let tables = self
      .connection
      .table_names()
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to list tables: {}", e))?;
    Ok(tables.iter().any(|table| table == name))
  }

  async fn open_named(&self, name: &str) -> Result<Table> {
    self
      .connection
      .open_table(name)
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to open table '{}': {}", name, e))
  }

  pub async fn table_exists(&self) -> Result<bool> {
    self.has_table(&self.table_name).await
  }

  pub async fn open_table(&self) -> Result<Table> {
    self.open_named(&self.table_name).await
  }

  pub async fn count_passages(&self) -> Result<usize> {
    let table = self.open_table().await?;
    let count = table.count_rows(None).await?;
    Ok(count)
  }

  /// Start a rebuild into the staging table, clearing leftovers from an
  /// earlier run that never committed
  pub async fn rebuild(&self, dimension: usize) -> Result<PassageWriter<'_>> {
    let staging_name = self.staging_name();
    let staging = if self.has_table(&staging_name).await? {
      let table = self.open_named(&staging_name).await?;
      table
        .delete("id IS NOT NULL")
        .await
        .map_err(|e| anyhow!("Failed to clear table '{}': {}", staging_name, e))?;
      bentley::verbose!("Cleared stale staging passages from '{}'", staging_name);
      Some(table)
    } else {
      None
    };

    Ok(PassageWriter { store: self, staging_name, staging, dimension, written: 0 })
  }
}

/// Appends passage batches to the staging table during a rebuild
pub struct PassageWriter<'a> {
  store: &'a PassageStore,
  staging_name: String,
  staging: Option<Table>,
  dimension: usize,
  written: usize,
}

impl PassageWriter<'_> {
  pub async fn write(&mut self, records: &[PassageRecord]) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let batch = records_to_arrow_batch(records, self.dimension)?;
    let schema = batch.schema();
    let batch_iter = RecordBatchIterator::new(vec![Ok(batch)], schema);

    match &self.staging {
      Some(table) => {
        table
          .add(batch_iter)
          .execute()
          .await
          .map_err(|e| anyhow!("Failed to store {} passages: {}", records.len(), e))?;
      }
      None => {
        let table = self
          .store
          .connection
          .create_table(&self.staging_name, batch_iter)
          .execute()
          .await
          .map_err(|e| anyhow!("Failed to create table '{}': {}", self.staging_name, e))?;
        self.staging = Some(table);
      }
    }

    self.written += records.len();
    Ok(())
  }

  /// Passages written so far in this rebuild
  pub fn written(&self) -> usize {
    self.written
  }

  /// Replace the live table with everything staged, in a single overwrite
  pub async fn commit(self) -> Result<usize> {
    let Some(staging) = self.staging else {
      bail!("No passages were written; '{}' was left unchanged", self.store.table_name);
    };

    let mut stream = staging
      .query()
      .execute()
      .await
      .map_err(|e| anyhow!("Failed to read staged passages: {}", e))?;
    let mut batches: Vec<RecordBatch> = Vec::new();
    while let Some(batch) = stream.next().await {
      batches.push(batch.map_err(|e| anyhow!("Error reading staged batch: {}", e))?);
    }
    let Some(schema) = batches.first().map(RecordBatch::schema) else {
      bail!("Staging table '{}' is empty", self.staging_name);
    };
    let batch_iter = RecordBatchIterator::new(batches.into_iter().map(Ok), schema);

    let live_name = self.store.table_name();
    if self.store.table_exists().await? {
      self
        .store
        .open_table()
        .await?
        .add(batch_iter)
        .mode(AddDataMode::Overwrite)
        .execute()
        .await
        .map_err(|e| anyhow!("Failed to replace table '{}': {}", live_name, e))?;
    } else {
      self
        .store
        .connection
        .create_table(live_name, batch_iter)
        .execute()
        .await
        .map_err(|e| anyhow!("Failed to create table '{}': {}", live_name, e))?;
    }

    staging
      .delete("id IS NOT NULL")
      .await
      .map_err(|e| anyhow!("Failed to clear table '{}': {}", self.staging_name, e))?;
    Ok(self.written)
  }
}
