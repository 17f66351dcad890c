//! Everything a request handler needs, built once at startup

use bentley::daemon_logs::DaemonLogs;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::server::metrics::ServiceMetrics;
use crate::server::services::similarity::SimilarityIndex;
use crate::server::services::summarizer::Summarizer;

/// Immutable service state shared with every handler as router state
///
/// The index and summarizer are trait objects so tests can substitute
/// in-memory implementations for the ONNX and LanceDB backed ones.
#[derive(Clone)]
pub struct ServiceContext {
  pub dataset: Arc<Dataset>,
  pub index: Arc<dyn SimilarityIndex>,
  pub summarizer: Arc<dyn Summarizer>,
  pub logs: DaemonLogs,
  pub metrics: Arc<ServiceMetrics>,
}

impl ServiceContext {
  pub fn new(
    dataset: Dataset,
    index: Arc<dyn SimilarityIndex>,
    summarizer: Arc<dyn Summarizer>,
    logs: DaemonLogs,
  ) -> Self {
    Self {
      dataset: Arc::new(dataset),
      index,
      summarizer,
      logs,
      metrics: Arc::new(ServiceMetrics::new()),
    }
  }
}
