use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use std::path::Path;

use crate::cli::client::{get_client, ComplaintsClient};
use crate::cli::display::{
  date_entries, pending_spinner, print_bar_chart, print_failure, print_heading, print_rate_table,
  print_record, print_summary, print_warning, print_wrapped, wrap_text,
};
use crate::dataset::aggregate::{CompanyProfile, Overview};
use crate::dataset::filter::Selection;
use crate::dataset::{usable_text, Dataset, DASHBOARD_COLUMNS};
use crate::server::types::{ComplaintResponse, SummarizeResponse};

pub const NO_NARRATIVE_WARNING: &str = "No valid complaint narrative found for summarization.";
const SUMMARY_FAILED: &str = "Failed to get summary.";

/// Load the dataset with the columns the dashboard views need
pub fn load_dataset(path: &Path) -> Result<Dataset> {
  let dataset = Dataset::load(path, DASHBOARD_COLUMNS)?;
  bentley::verbose!("Loaded {} complaints from {}", dataset.len(), path.display());
  Ok(dataset)
}

/// Parse a user-typed complaint identifier
pub fn parse_complaint_id(text: &str) -> Result<i64> {
  let trimmed = text.trim();
  trimmed
    .parse::<i64>()
    .map_err(|_| anyhow!("Invalid complaint ID '{}': expected a whole number", trimmed))
}

fn print_selection(selection: &Selection) {
  println!(
    "{} {}  {} {}",
    "Region:".bold(),
    selection.region.cyan(),
    "Company:".bold(),
    selection.company.yellow()
  );
}

/// Counts, issue chart and submission timeline for the current filter
pub fn overview(dataset: &Dataset, region: Option<&str>, company: Option<&str>) -> Result<()> {
  let selection = Selection::resolve(dataset, region, company)?;
  let overview = Overview::compute(dataset, &selection);

  print_selection(&selection);
  print_heading("Complaint counts");
  println!("  {:<28} {}", "All complaints", overview.total);
  println!("  {:<28} {}", format!("In {}", selection.region), overview.in_region);
  println!(
    "  {:<28} {}",
    format!("In {} for {}", selection.region, selection.company),
    overview.in_selection
  );

  print_bar_chart("Issues", overview.issues.entries());
  print_bar_chart("Submissions by date", &date_entries(&overview.timeline));
  Ok(())
}

/// Identifiers in the current filter and one record in full, with a summary of its narrative
pub async fn explore(
  dataset: &Dataset,
  region: Option<&str>,
  company: Option<&str>,
  id: Option<&str>,
) -> Result<()> {
  let selection = Selection::resolve(dataset, region, company)?;
  let requested = id.map(parse_complaint_id).transpose()?;

  let ids: Vec<i64> = dataset.filtered(&selection.region, &selection.company).map(|r| r.id).collect();
  print_selection(&selection);

  if ids.is_empty() {
    print_warning("No complaints match the current selection.");
    return Ok(());
  }

  let selected = match requested {
    Some(id) if ids.contains(&id) => id,
    Some(id) => bail!(
      "Complaint {} is not in the current selection ({} / {})",
      id,
      selection.region,
      selection.company
    ),
    None => ids[0],
  };

  print_heading(&format!("{} complaints", ids.len()));
  let listed = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
  for line in wrap_text(&listed, 80) {
    println!("  {line}");
  }

  let record = dataset.get(selected).context("Selected complaint disappeared from the dataset")?;
  print_record(record);

  match record.usable_narrative() {
    Some(narrative) => {
      let client = get_client()?;
      request_summary(&client, narrative).await;
    }
    None => print_warning(NO_NARRATIVE_WARNING),
  }
  Ok(())
}

/// Summarize complaints related to free text
pub async fn query(text: &str) -> Result<()> {
  if text.trim().is_empty() {
    bail!("Query must not be empty");
  }
  let client = get_client()?;
  request_summary(&client, text).await;
  Ok(())
}

/// Look up a complaint on the service and summarize its narrative
pub async fn lookup(id_text: &str) -> Result<()> {
  let id = parse_complaint_id(id_text)?;
  let client = get_client()?;

  let spinner = pending_spinner(&format!("Looking up complaint {id}..."));
  let response = client.lookup(id).await;
  spinner.finish_and_clear();

  let details = match response {
    Ok(ComplaintResponse::Found(details)) => details,
    Ok(ComplaintResponse::Error { error }) => {
      print_failure(&error);
      return Ok(());
    }
    Err(e) => {
      print_failure(&format!("Failed to fetch complaint: {e}"));
      return Ok(());
    }
  };

  print_heading(&format!("Complaint {id}"));
  for (name, value) in [
    ("Date received", &details.date_received),
    ("Product", &details.product),
    ("Issue", &details.issue),
    ("Company", &details.company),
  ] {
    println!("  {:<16} {}", format!("{name}:").bold(), value.as_deref().unwrap_or("-"));
  }

  match usable_text(Some(details.narrative.as_str())) {
    Some(narrative) => {
      print_wrapped("Narrative", narrative);
      request_summary(&client, narrative).await;
    }
    None => print_warning(NO_NARRATIVE_WARNING),
  }
  Ok(())
}

/// Organization-wide counts and rates, ignoring the region filter
pub fn profile(dataset: &Dataset, region: Option<&str>, company: Option<&str>) -> Result<()> {
  let selection = Selection::resolve(dataset, region, company)?;
  let profile = CompanyProfile::compute(dataset, &selection.company);

  print_heading(&format!("{} (all regions)", profile.company));
  println!("  {:<28} {}", "Total complaints", profile.total);
  print_bar_chart("Issues", profile.issues.entries());
  print_rate_table("Consumer disputed?", &profile.dispute_rate);
  print_rate_table("Timely response?", &profile.timely_response_rate);
  Ok(())
}

pub fn regions(dataset: &Dataset) -> Result<()> {
  let regions = dataset.regions();
  if regions.is_empty() {
    print_warning("The dataset has no complaints with a region.");
    return Ok(());
  }
  for region in regions {
    println!("{} ({})", region.cyan(), dataset.in_region(region).count());
  }
  Ok(())
}

pub fn companies(dataset: &Dataset, region: Option<&str>) -> Result<()> {
  let selection = Selection::resolve(dataset, region, None)?;
  print_heading(&format!("Companies in {}", selection.region));
  for company in dataset.companies_in_region(&selection.region) {
    println!("  {}", company.yellow());
  }
  Ok(())
}

/// Call summarize and render the outcome; failures are reported, never propagated
async fn request_summary(client: &ComplaintsClient, text: &str) {
  let spinner = pending_spinner("Generating summary...");
  let response = client.summarize(text).await;
  spinner.finish_and_clear();

  match response {
    Ok(SummarizeResponse::Summary { summary }) => print_summary(&summary),
    Ok(SummarizeResponse::Error { error }) => print_failure(&format!("{SUMMARY_FAILED} {error}")),
    Err(e) => print_failure(&format!("{SUMMARY_FAILED} {e}")),
  }
}
