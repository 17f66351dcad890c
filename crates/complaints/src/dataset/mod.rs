//! Complaint dataset loading and lookup
//!
//! Both the dashboard and the query service read the same CSV export through
//! [`Dataset::load`]. Each component names the columns it needs beyond the core
//! set; missing columns and duplicate identifiers fail the load instead of
//! surfacing later as empty views.

pub mod aggregate;
pub mod filter;
pub mod record;

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use record::{usable_text, ComplaintRecord};

pub const COMPLAINT_ID: &str = "Complaint ID";
pub const DATE_RECEIVED: &str = "Date received";
pub const PRODUCT: &str = "Product";
pub const ISSUE: &str = "Issue";
pub const COMPANY: &str = "Company";
pub const STATE: &str = "State";
pub const NARRATIVE: &str = "Consumer complaint narrative";
pub const CLEANED_NARRATIVE: &str = "cleaned_narrative";

/// Columns every consumer of the dataset relies on
pub const CORE_COLUMNS: &[&str] = &[COMPLAINT_ID, DATE_RECEIVED, PRODUCT, ISSUE, COMPANY];

/// Extra columns the query service needs for lookups
pub const SERVICE_COLUMNS: &[&str] = &[CLEANED_NARRATIVE];

/// Extra columns the dashboard needs for region filtering
pub const DASHBOARD_COLUMNS: &[&str] = &[STATE];

#[derive(Debug, Error)]
pub enum DatasetError {
  #[error("Failed to read dataset {path}: {source}")]
  Read { path: PathBuf, source: csv::Error },

  #[error("Dataset {path} is missing required column '{column}'")]
  MissingColumn { path: PathBuf, column: String },

  #[error("Malformed row {row} in {path}: {source}")]
  Row { path: PathBuf, row: usize, source: csv::Error },

  #[error("Duplicate complaint ID {id} in {path} (row {row})")]
  DuplicateId { path: PathBuf, id: i64, row: usize },
}

/// Immutable, indexed view of the complaint dataset
#[derive(Debug)]
pub struct Dataset {
  source: PathBuf,
  records: Vec<ComplaintRecord>,
  by_id: HashMap<i64, usize>,
}

impl Dataset {
  /// Load a CSV export, requiring the core columns plus `extra_columns`
  pub fn load<P: AsRef<Path>>(path: P, extra_columns: &[&str]) -> Result<Self, DatasetError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
      .trim(csv::Trim::Headers)
      .from_path(path)
      .map_err(|source| DatasetError::Read { path: path.to_path_buf(), source })?;

    Self::from_csv(reader, path, extra_columns)
  }

  /// Load CSV content from any reader; `source` is only used in messages
  pub fn from_reader<R: io::Read>(
    reader: R,
    source: &Path,
    extra_columns: &[&str],
  ) -> Result<Self, DatasetError> {
    let reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    Self::from_csv(reader, source, extra_columns)
  }

  /// Build a dataset from already parsed records
  pub fn from_records(records: Vec<ComplaintRecord>) -> Result<Self, DatasetError> {
    Self::index(PathBuf::from("<memory>"), records)
  }

  fn from_csv<R: io::Read>(
    mut reader: csv::Reader<R>,
    source: &Path,
    extra_columns: &[&str],
  ) -> Result<Self, DatasetError> {
    let headers = reader
      .headers()
      .map_err(|source_err| DatasetError::Read { path: source.to_path_buf(), source: source_err })?
      .clone();

    for column in CORE_COLUMNS.iter().chain(extra_columns) {
      if !headers.iter().any(|header| header == *column) {
        return Err(DatasetError::MissingColumn {
          path: source.to_path_buf(),
          column: column.to_string(),
        });
      }
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<ComplaintRecord>().enumerate() {
      let record = row.map_err(|source_err| DatasetError::Row {
        path: source.to_path_buf(),
        row: index + 1,
        source: source_err,
      })?;
      records.push(record);
    }

    Self::index(source.to_path_buf(), records)
  }

  fn index(source: PathBuf, records: Vec<ComplaintRecord>) -> Result<Self, DatasetError> {
    let mut by_id = HashMap::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
      if by_id.insert(record.id, position).is_some() {
        return Err(DatasetError::DuplicateId { path: source, id: record.id, row: position + 1 });
      }
    }

    Ok(Self { source, records, by_id })
  }

  pub fn source(&self) -> &Path {
    &self.source
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// All records in file order
  pub fn records(&self) -> &[ComplaintRecord] {
    &self.records
  }

  /// The record with the given identifier
  pub fn get(&self, id: i64) -> Option<&ComplaintRecord> {
    self.by_id.get(&id).map(|&position| &self.records[position])
  }

  /// Distinct region codes, sorted
  pub fn regions(&self) -> Vec<&str> {
    let regions: BTreeSet<&str> =
      self.records.iter().filter_map(|record| record.state.as_deref()).collect();
    regions.into_iter().collect()
  }

  /// Distinct organizations with at least one record in `region`, sorted
  pub fn companies_in_region(&self, region: &str) -> Vec<&str> {
    let companies: BTreeSet<&str> =
      self.in_region(region).filter_map(|record| record.company.as_deref()).collect();
    companies.into_iter().collect()
  }

  pub fn in_region<'a, 'f>(&'a self, region: &'f str) -> impl Iterator<Item = &'a ComplaintRecord> + 'f
  where
    'a: 'f,
  {
    self.records.iter().filter(move |record| record.state.as_deref() == Some(region))
  }

  pub fn for_company<'a, 'f>(
    &'a self,
    company: &'f str,
  ) -> impl Iterator<Item = &'a ComplaintRecord> + 'f
  where
    'a: 'f,
  {
    self.records.iter().filter(move |record| record.company.as_deref() == Some(company))
  }

  /// Records matching both the region and the organization
  pub fn filtered<'a, 'f>(
    &'a self,
    region: &'f str,
    company: &'f str,
  ) -> impl Iterator<Item = &'a ComplaintRecord> + 'f
  where
    'a: 'f,
  {
    self.in_region(region).filter(move |record| record.company.as_deref() == Some(company))
  }
}
