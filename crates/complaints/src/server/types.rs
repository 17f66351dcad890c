//! Wire types for the query service
//!
//! `/summarize` and `/complaint/{id}` keep the dashboard's original JSON
//! contract: a bare object that either carries the result or an `error` key,
//! always with status 200.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::dataset::ComplaintRecord;

/// Response message for any summarization failure past validation
pub const SUMMARIZE_FAILED: &str = "Failed to summarize";

/// Response message for a blank query
pub const EMPTY_QUERY: &str = "Query must not be empty";

pub fn complaint_not_found(id: i64) -> String {
  format!("No complaint found with ID {id}")
}

// Summarize
// =========

/// Body of `POST /summarize`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SummarizeRequest {
  /// Free text to retrieve passages for
  pub query: String,
}

/// Either a summary or an error, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SummarizeResponse {
  Summary { summary: String },
  Error { error: String },
}

impl SummarizeResponse {
  pub fn error(message: impl Into<String>) -> Self {
    Self::Error { error: message.into() }
  }
}

// Lookup
// ======

/// The subset of a record returned by `GET /complaint/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplaintDetails {
  #[serde(rename = "Date received")]
  pub date_received: Option<String>,

  #[serde(rename = "Product")]
  pub product: Option<String>,

  #[serde(rename = "Issue")]
  pub issue: Option<String>,

  #[serde(rename = "Company")]
  pub company: Option<String>,

  /// Cleaned narrative, empty when the record has none
  #[serde(rename = "Narrative", default)]
  pub narrative: String,
}

impl From<&ComplaintRecord> for ComplaintDetails {
  fn from(record: &ComplaintRecord) -> Self {
    Self {
      date_received: record.date_received.clone(),
      product: record.product.clone(),
      issue: record.issue.clone(),
      company: record.company.clone(),
      // Stored text as-is; only missing-value sentinels become ""
      narrative: record
        .cleaned_narrative
        .clone()
        .filter(|_| record.usable_cleaned_narrative().is_some())
        .unwrap_or_default(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ComplaintResponse {
  Error { error: String },
  Found(ComplaintDetails),
}

// Operational endpoints
// =====================

/// Response for `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusResponse {
  pub status: String,
  pub version: String,
  /// Records in the loaded dataset
  pub records: usize,
  /// Passages in the similarity index; absent when the index could not be queried
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub passages: Option<usize>,
}

/// Response for `GET /version`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VersionResponse {
  pub version: String,
}

/// Query string for `GET /logs`
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LogsQuery {
  /// Newest entries to return
  pub limit: Option<usize>,
  /// Only entries of this level
  pub level: Option<String>,
}

/// Response for `GET /logs`
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogsResponse {
  pub logs: Vec<LogEntry>,
}

/// Individual log entry (re-exported from bentley)
pub type LogEntry = bentley::daemon_logs::LogEntry;

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_summarize_response_shapes() {
    let ok = SummarizeResponse::Summary { summary: "short".to_string() };
    assert_eq!(serde_json::to_value(&ok).unwrap(), json!({"summary": "short"}));
    assert_eq!(
      serde_json::to_value(SummarizeResponse::error(SUMMARIZE_FAILED)).unwrap(),
      json!({"error": "Failed to summarize"})
    );
  }

  #[test]
  fn test_complaint_details_use_dataset_column_names() {
    let mut record = ComplaintRecord::new(3189109);
    record.date_received = Some("2019-03-01".to_string());
    record.product = Some("Credit reporting".to_string());
    record.cleaned_narrative = Some("nan".to_string());

    let value = serde_json::to_value(ComplaintResponse::Found((&record).into())).unwrap();
    assert_eq!(
      value,
      json!({
        "Date received": "2019-03-01",
        "Product": "Credit reporting",
        "Issue": null,
        "Company": null,
        "Narrative": ""
      })
    );
  }

  #[test]
  fn test_complaint_details_keep_stored_narrative_text() {
    let mut record = ComplaintRecord::new(7);
    record.cleaned_narrative = Some("  padded text  ".to_string());
    assert_eq!(ComplaintDetails::from(&record).narrative, "  padded text  ");

    record.cleaned_narrative = None;
    assert_eq!(ComplaintDetails::from(&record).narrative, "");
  }

  #[test]
  fn test_complaint_response_decodes_error_first() {
    let decoded: ComplaintResponse =
      serde_json::from_value(json!({"error": complaint_not_found(999999)})).unwrap();
    assert_eq!(
      decoded,
      ComplaintResponse::Error { error: "No complaint found with ID 999999".to_string() }
    );
  }
}
