mod common;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

use common::{service_context, write_sample_csv, FakeIndex, FakeSummarizer};
use complaints::server::startup::build_app;

/// Nothing listens on the discard port, so any service call fails fast
const UNREACHABLE_SERVICE: &str = "http://127.0.0.1:9";

/// Helper to create a Command for the `complaints` binary over a dataset file.
fn complaints_cmd(data: &Path) -> Command {
  let mut cmd = Command::cargo_bin("complaints").expect("binary exists");
  cmd.env("COMPLAINTS_DATA", data);
  cmd.env("COMPLAINTS_SERVER_URL", UNREACHABLE_SERVICE);
  cmd.env("COMPLAINTS_TIMEOUT_SECS", "2");
  cmd.env("NO_COLOR", "1");
  cmd
}

#[test]
fn test_overview_defaults_to_first_region_and_company() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .arg("overview")
    .assert()
    .success()
    .stdout(contains("CA").and(contains("Acme Bank")).and(contains("All complaints")))
    .stdout(contains("Incorrect information on your report"))
    .stdout(contains("Submissions by date").and(contains("2019-04-20")));
}

#[test]
fn test_unknown_region_lists_choices() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["overview", "--region", "NY"])
    .assert()
    .failure()
    .stderr(contains("Unknown region 'NY'. Available regions: CA, TX"));
}

#[test]
fn test_company_outside_region_is_rejected() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["profile", "--region", "TX", "--company", "Gamma Collections"])
    .assert()
    .failure()
    .stderr(contains("'Gamma Collections' has no complaints in TX"));
}

#[test]
fn test_regions_and_companies() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data).arg("regions").assert().success().stdout(contains("CA").and(contains("TX")));

  complaints_cmd(&data)
    .args(["companies", "--region", "TX"])
    .assert()
    .success()
    .stdout(contains("Acme Bank").and(contains("Beta Loans")).and(contains("Gamma").not()));
}

#[test]
fn test_profile_rates_span_all_regions() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["profile", "--region", "TX", "--company", "Acme Bank"])
    .assert()
    .success()
    .stdout(contains("Acme Bank (all regions)"))
    .stdout(contains("66.7%").and(contains("33.3%")));
}

#[test]
fn test_explore_missing_narrative_warns_without_summarizing() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["explore", "--region", "CA", "--company", "Gamma Collections"])
    .assert()
    .success()
    .stdout(contains("Complaint 3189113"))
    .stdout(contains("No valid complaint narrative found for summarization."))
    .stdout(contains("Failed to get summary").not());
}

#[test]
fn test_explore_id_outside_selection_is_rejected() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["explore", "--region", "TX", "--company", "Acme Bank", "--id", "3189112"])
    .assert()
    .failure()
    .stderr(contains("Complaint 3189112 is not in the current selection"));
}

#[test]
fn test_lookup_rejects_non_integer_id() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["lookup", "31x9"])
    .assert()
    .failure()
    .stderr(contains("Invalid complaint ID '31x9'"))
    .stdout(contains("Failed to fetch complaint").not());
}

#[test]
fn test_lookup_reports_unreachable_service() {
  let temp = assert_fs::TempDir::new().unwrap();
  let data = write_sample_csv(temp.path());

  complaints_cmd(&data)
    .args(["lookup", "3189109"])
    .assert()
    .success()
    .stdout(contains("Failed to fetch complaint"));
}

#[test]
fn test_lookup_without_narrative_warns_without_summarizing() {
  let temp = TempDir::new().unwrap();
  let index = Arc::new(FakeIndex::with_passages(&["late fee charged twice"]));
  let summarizer = Arc::new(FakeSummarizer::replying("unused"));
  let app = build_app(service_context(&temp, index.clone(), summarizer.clone()));

  let runtime = Runtime::new().unwrap();
  let addr = runtime.block_on(async {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    addr
  });

  complaints_cmd(&temp.path().join("unused.csv"))
    .env("COMPLAINTS_SERVER_URL", format!("http://{addr}"))
    .args(["lookup", "3189110"])
    .assert()
    .success()
    .stdout(contains("Complaint 3189110").and(contains("Acme Bank")))
    .stdout(contains("No valid complaint narrative found for summarization."))
    .stdout(contains("Failed").not());

  assert_eq!(index.searches(), 0);
  assert!(summarizer.inputs().is_empty());
}

#[test]
fn test_missing_dataset_file() {
  let temp = assert_fs::TempDir::new().unwrap();

  complaints_cmd(&temp.path().join("absent.csv"))
    .arg("regions")
    .assert()
    .failure()
    .stderr(contains("Failed to read dataset"));
}
