//! A single complaint row and narrative normalization

use serde::{Deserialize, Serialize};

/// Strings that stand in for a missing value in exported datasets
const MISSING_SENTINELS: &[&str] =
  &["nan", "inf", "+inf", "-inf", "infinity", "+infinity", "-infinity", "none", "null"];

/// One row of the complaint dataset
///
/// Every column except the identifier may be missing; empty cells load as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
  #[serde(rename = "Complaint ID")]
  pub id: i64,

  #[serde(rename = "Date received", default)]
  pub date_received: Option<String>,

  #[serde(rename = "Product", default)]
  pub product: Option<String>,

  #[serde(rename = "Sub-product", default)]
  pub sub_product: Option<String>,

  #[serde(rename = "Issue", default)]
  pub issue: Option<String>,

  #[serde(rename = "Sub-issue", default)]
  pub sub_issue: Option<String>,

  /// Narrative as submitted by the consumer
  #[serde(rename = "Consumer complaint narrative", default)]
  pub narrative: Option<String>,

  /// Normalized narrative produced by the cleaning step
  #[serde(rename = "cleaned_narrative", default)]
  pub cleaned_narrative: Option<String>,

  #[serde(rename = "Company", default)]
  pub company: Option<String>,

  /// Two-letter region code
  #[serde(rename = "State", default)]
  pub state: Option<String>,

  #[serde(rename = "ZIP code", default)]
  pub zip_code: Option<String>,

  #[serde(rename = "Tags", default)]
  pub tags: Option<String>,

  #[serde(rename = "Submitted via", default)]
  pub submitted_via: Option<String>,

  #[serde(rename = "Company response to consumer", default)]
  pub company_response: Option<String>,

  #[serde(rename = "Timely response?", default)]
  pub timely_response: Option<String>,

  #[serde(rename = "Consumer disputed?", default)]
  pub consumer_disputed: Option<String>,
}

impl ComplaintRecord {
  /// Create a record with only the identifier set
  pub fn new(id: i64) -> Self {
    Self {
      id,
      date_received: None,
      product: None,
      sub_product: None,
      issue: None,
      sub_issue: None,
      narrative: None,
      cleaned_narrative: None,
      company: None,
      state: None,
      zip_code: None,
      tags: None,
      submitted_via: None,
      company_response: None,
      timely_response: None,
      consumer_disputed: None,
    }
  }

  /// Raw narrative, if it carries any usable text
  pub fn usable_narrative(&self) -> Option<&str> {
    usable_text(self.narrative.as_deref())
  }

  /// Cleaned narrative, if it carries any usable text
  pub fn usable_cleaned_narrative(&self) -> Option<&str> {
    usable_text(self.cleaned_narrative.as_deref())
  }
}

/// Trimmed text, or `None` when the value is absent, blank or a missing-value sentinel
pub fn usable_text(value: Option<&str>) -> Option<&str> {
  let trimmed = value?.trim();
  if trimmed.is_empty() || is_missing_sentinel(trimmed) {
    None
  } else {
    Some(trimmed)
  }
}

fn is_missing_sentinel(value: &str) -> bool {
  MISSING_SENTINELS.iter().any(|sentinel| value.eq_ignore_ascii_case(sentinel))
}
