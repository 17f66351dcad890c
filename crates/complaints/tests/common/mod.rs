//! Shared fixtures: in-memory index and summarizer, sample dataset, service context

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use bentley::daemon_logs::DaemonLogs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use complaints::dataset::{Dataset, SERVICE_COLUMNS};
use complaints::server::context::ServiceContext;
use complaints::server::services::similarity::{Passage, SimilarityIndex};
use complaints::server::services::summarizer::Summarizer;

pub const SAMPLE_CSV: &str = "\
Complaint ID,Date received,Product,Issue,Company,State,Consumer complaint narrative,cleaned_narrative,Timely response?,Consumer disputed?
3189109,2019-03-01,Credit reporting,Incorrect information on your report,Acme Bank,TX,My credit report shows an account I never opened.,my credit report shows an account i never opened,Yes,No
3189110,2019-03-15,Mortgage,Trouble during payment process,Acme Bank,TX,,,Yes,Yes
3189111,2019-04-02,Credit card,Fees or interest,Beta Loans,TX,They charged a late fee twice.,they charged a late fee twice,No,No
3189112,2019-04-20,Credit reporting,Incorrect information on your report,Acme Bank,CA,Wrong address on file.,wrong address on file,Yes,No
3189113,2019-05-01,Debt collection,Attempts to collect debt not owed,Gamma Collections,CA,nan,NaN,Yes,
";

/// Index that returns its passages in order and counts searches
pub struct FakeIndex {
  passages: Vec<Passage>,
  fail: bool,
  searches: AtomicUsize,
}

impl FakeIndex {
  pub fn with_passages(texts: &[&str]) -> Self {
    let passages = texts
      .iter()
      .enumerate()
      .map(|(rank, text)| Passage::new(*text, 1.0 - rank as f32 * 0.1))
      .collect();
    Self { passages, fail: false, searches: AtomicUsize::new(0) }
  }

  pub fn failing() -> Self {
    Self { passages: Vec::new(), fail: true, searches: AtomicUsize::new(0) }
  }

  pub fn searches(&self) -> usize {
    self.searches.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl SimilarityIndex for FakeIndex {
  async fn search(&self, _query: &str, k: usize) -> Result<Vec<Passage>> {
    self.searches.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      bail!("vector search failed: table is corrupt");
    }
    Ok(self.passages.iter().take(k).cloned().collect())
  }

  async fn passage_count(&self) -> Result<usize> {
    if self.fail {
      bail!("table is corrupt");
    }
    Ok(self.passages.len())
  }
}

/// Summarizer that echoes a fixed reply and remembers its inputs
pub struct FakeSummarizer {
  reply: String,
  inputs: Mutex<Vec<String>>,
}

impl FakeSummarizer {
  pub fn replying(reply: &str) -> Self {
    Self { reply: reply.to_string(), inputs: Mutex::new(Vec::new()) }
  }

  pub fn inputs(&self) -> Vec<String> {
    self.inputs.lock().map(|inputs| inputs.clone()).unwrap_or_default()
  }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
  async fn summarize(&self, text: &str) -> Result<String> {
    if let Ok(mut inputs) = self.inputs.lock() {
      inputs.push(text.to_string());
    }
    Ok(self.reply.clone())
  }
}

pub fn sample_dataset() -> Dataset {
  Dataset::from_reader(SAMPLE_CSV.as_bytes(), Path::new("sample.csv"), SERVICE_COLUMNS).unwrap()
}

pub fn write_sample_csv(dir: &Path) -> std::path::PathBuf {
  let path = dir.join("complaints.csv");
  std::fs::write(&path, SAMPLE_CSV).unwrap();
  path
}

/// Context over the sample dataset with a silent log in `temp`
pub fn service_context(
  temp: &TempDir,
  index: Arc<dyn SimilarityIndex>,
  summarizer: Arc<dyn Summarizer>,
) -> ServiceContext {
  service_context_over(temp, sample_dataset(), index, summarizer)
}

pub fn service_context_over(
  temp: &TempDir,
  dataset: Dataset,
  index: Arc<dyn SimilarityIndex>,
  summarizer: Arc<dyn Summarizer>,
) -> ServiceContext {
  let logs = DaemonLogs::new_with_silent(temp.path().join("server.logs.jsonl"), true).unwrap();
  ServiceContext::new(dataset, index, summarizer, logs)
}
