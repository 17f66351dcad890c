mod common;

use std::fs;
use tempfile::TempDir;

use common::write_sample_csv;
use complaints::dataset::aggregate::{CompanyProfile, Overview};
use complaints::dataset::filter::Selection;
use complaints::dataset::{Dataset, DatasetError, DASHBOARD_COLUMNS, SERVICE_COLUMNS};

#[test]
fn test_load_sample_export() {
  let temp = TempDir::new().unwrap();
  let path = write_sample_csv(temp.path());

  let dataset = Dataset::load(&path, DASHBOARD_COLUMNS).unwrap();

  assert_eq!(dataset.len(), 5);
  assert_eq!(dataset.source(), path.as_path());
  assert_eq!(dataset.regions(), vec!["CA", "TX"]);
  assert_eq!(dataset.companies_in_region("TX"), vec!["Acme Bank", "Beta Loans"]);

  let record = dataset.get(3189111).unwrap();
  assert_eq!(record.usable_cleaned_narrative(), Some("they charged a late fee twice"));
  assert_eq!(dataset.get(3189113).unwrap().usable_narrative(), None);
  assert!(dataset.get(42).is_none());
}

#[test]
fn test_selection_and_aggregates_over_file() {
  let temp = TempDir::new().unwrap();
  let dataset = Dataset::load(write_sample_csv(temp.path()), DASHBOARD_COLUMNS).unwrap();

  let selection = Selection::resolve(&dataset, Some("TX"), None).unwrap();
  assert_eq!(selection.company, "Acme Bank");

  let overview = Overview::compute(&dataset, &selection);
  assert_eq!((overview.total, overview.in_region, overview.in_selection), (5, 3, 2));
  assert_eq!(overview.timeline.len(), 2);

  let profile = CompanyProfile::compute(&dataset, "Acme Bank");
  assert_eq!(profile.total, 3);
  assert_eq!(profile.timely_response_rate, vec![("Yes".to_string(), 1.0)]);
}

#[test]
fn test_missing_file_is_read_error() {
  let temp = TempDir::new().unwrap();
  let err = Dataset::load(temp.path().join("absent.csv"), SERVICE_COLUMNS).unwrap_err();

  assert!(matches!(err, DatasetError::Read { .. }));
  assert!(err.to_string().starts_with("Failed to read dataset"));
}

#[test]
fn test_missing_component_column_is_reported() {
  let temp = TempDir::new().unwrap();
  let path = temp.path().join("no_state.csv");
  fs::write(
    &path,
    "Complaint ID,Date received,Product,Issue,Company,cleaned_narrative\n1,2019-01-01,P,I,C,text\n",
  )
  .unwrap();

  // The service only needs the cleaned narrative, the dashboard needs State
  assert_eq!(Dataset::load(&path, SERVICE_COLUMNS).unwrap().len(), 1);
  match Dataset::load(&path, DASHBOARD_COLUMNS).unwrap_err() {
    DatasetError::MissingColumn { column, .. } => assert_eq!(column, "State"),
    other => panic!("expected a missing column, got {other}"),
  }
}
