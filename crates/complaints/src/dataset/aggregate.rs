//! Counts, frequency tables and rate tables for the dashboard views

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use super::filter::Selection;
use super::{ComplaintRecord, Dataset};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Frequency table of a column, most frequent first
///
/// Missing values are not counted, so `total` is the number of present values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueCounts {
  entries: Vec<(String, usize)>,
  total: usize,
}

impl ValueCounts {
  /// Count the present values; ties are ordered by value
  pub fn from_values<'a, I>(values: I) -> Self
  where
    I: IntoIterator<Item = Option<&'a str>>,
  {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0;
    for value in values.into_iter().flatten() {
      *counts.entry(value).or_default() += 1;
      total += 1;
    }

    let mut entries: Vec<(String, usize)> =
      counts.into_iter().map(|(value, count)| (value.to_string(), count)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Self { entries, total }
  }

  pub fn entries(&self) -> &[(String, usize)] {
    &self.entries
  }

  pub fn total(&self) -> usize {
    self.total
  }

  /// Share of each value among present values
  pub fn normalized(&self) -> Vec<(String, f64)> {
    if self.total == 0 {
      return Vec::new();
    }
    self
      .entries
      .iter()
      .map(|(value, count)| (value.clone(), *count as f64 / self.total as f64))
      .collect()
  }

  /// Count for one value, zero when absent
  pub fn count_of(&self, value: &str) -> usize {
    self.entries.iter().find(|(v, _)| v == value).map_or(0, |(_, count)| *count)
  }
}

/// Parse the received date in the formats seen in complaint exports
pub fn parse_date(value: &str) -> Option<NaiveDate> {
  let value = value.trim();
  // Timestamps like 2019-03-01T00:00:00 only need their date part
  let date_part = value.split(['T', ' ']).next().unwrap_or(value);
  DATE_FORMATS.iter().find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

/// Submission counts per day in chronological order; unparseable dates are skipped
pub fn date_counts<'a, I>(records: I) -> Vec<(NaiveDate, usize)>
where
  I: IntoIterator<Item = &'a ComplaintRecord>,
{
  let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
  for date in records.into_iter().filter_map(|r| r.date_received.as_deref().and_then(parse_date)) {
    *counts.entry(date).or_default() += 1;
  }
  counts.into_iter().collect()
}

/// Counts and charts for the overview view
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
  pub total: usize,
  pub in_region: usize,
  pub in_selection: usize,
  pub issues: ValueCounts,
  pub timeline: Vec<(NaiveDate, usize)>,
}

impl Overview {
  pub fn compute(dataset: &Dataset, selection: &Selection) -> Self {
    let selected: Vec<&ComplaintRecord> =
      dataset.filtered(&selection.region, &selection.company).collect();

    Self {
      total: dataset.len(),
      in_region: dataset.in_region(&selection.region).count(),
      in_selection: selected.len(),
      issues: ValueCounts::from_values(selected.iter().map(|r| r.issue.as_deref())),
      timeline: date_counts(selected.iter().copied()),
    }
  }
}

/// Organization-wide statistics, independent of the region filter
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
  pub company: String,
  pub total: usize,
  pub issues: ValueCounts,
  pub dispute_rate: Vec<(String, f64)>,
  pub timely_response_rate: Vec<(String, f64)>,
}

impl CompanyProfile {
  pub fn compute(dataset: &Dataset, company: &str) -> Self {
    let records: Vec<&ComplaintRecord> = dataset.for_company(company).collect();

    let disputed = ValueCounts::from_values(records.iter().map(|r| r.consumer_disputed.as_deref()));
    let timely = ValueCounts::from_values(records.iter().map(|r| r.timely_response.as_deref()));

    Self {
      company: company.to_string(),
      total: records.len(),
      issues: ValueCounts::from_values(records.iter().map(|r| r.issue.as_deref())),
      dispute_rate: disputed.normalized(),
      timely_response_rate: timely.normalized(),
    }
  }
}
