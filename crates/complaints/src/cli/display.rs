//! Terminal rendering for the dashboard views

use chrono::NaiveDate;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::dataset::ComplaintRecord;

/// Widest bar drawn by the charts
const BAR_WIDTH: usize = 40;

/// Longest label shown before truncation
const LABEL_WIDTH: usize = 40;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// Scale `count` against `max` onto a bar of at most `width` cells
///
/// Any non-zero count gets at least one cell so small categories stay visible.
pub fn bar_length(count: usize, max: usize, width: usize) -> usize {
  if count == 0 || max == 0 {
    return 0;
  }
  ((count * width) / max).max(1)
}

fn truncate_label(label: &str) -> String {
  if label.chars().count() <= LABEL_WIDTH {
    return label.to_string();
  }
  let mut short: String = label.chars().take(LABEL_WIDTH - 1).collect();
  short.push('…');
  short
}

/// Horizontal bar chart lines for labelled counts, in the given order
pub fn bar_chart_lines(entries: &[(String, usize)]) -> Vec<String> {
  let max = entries.iter().map(|(_, count)| *count).max().unwrap_or(0);
  let label_width =
    entries.iter().map(|(label, _)| truncate_label(label).chars().count()).max().unwrap_or(0);

  entries
    .iter()
    .map(|(label, count)| {
      let bar = "█".repeat(bar_length(*count, max, BAR_WIDTH));
      format!("{:<label_width$}  {} {}", truncate_label(label), bar.cyan(), count)
    })
    .collect()
}

/// Chart entries labelled by submission date, keeping chronological order
pub fn date_entries(days: &[(NaiveDate, usize)]) -> Vec<(String, usize)> {
  days.iter().map(|(date, count)| (date.format("%Y-%m-%d").to_string(), *count)).collect()
}

/// Rate table lines with percentages
pub fn rate_table_lines(rates: &[(String, f64)]) -> Vec<String> {
  let label_width = rates.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
  rates
    .iter()
    .map(|(label, rate)| format!("{:<label_width$}  {:>6.1}%", label, rate * 100.0))
    .collect()
}

pub fn print_heading(title: &str) {
  println!("\n{}", title.bold().underline());
}

pub fn print_bar_chart(title: &str, entries: &[(String, usize)]) {
  print_heading(title);
  if entries.is_empty() {
    println!("  {}", "No data for the current selection".dimmed());
    return;
  }
  for line in bar_chart_lines(entries) {
    println!("  {line}");
  }
}

pub fn print_rate_table(title: &str, rates: &[(String, f64)]) {
  print_heading(title);
  if rates.is_empty() {
    println!("  {}", "No data".dimmed());
    return;
  }
  for line in rate_table_lines(rates) {
    println!("  {line}");
  }
}

fn print_field(name: &str, value: Option<&str>) {
  println!("  {:<28} {}", format!("{name}:").bold(), value.unwrap_or("-"));
}

/// Every column of a record, with the narrative wrapped below
pub fn print_record(record: &ComplaintRecord) {
  print_heading(&format!("Complaint {}", record.id));
  print_field("Date received", record.date_received.as_deref());
  print_field("Product", record.product.as_deref());
  print_field("Sub-product", record.sub_product.as_deref());
  print_field("Issue", record.issue.as_deref());
  print_field("Sub-issue", record.sub_issue.as_deref());
  print_field("Company", record.company.as_deref());
  print_field("State", record.state.as_deref());
  print_field("ZIP code", record.zip_code.as_deref());
  print_field("Tags", record.tags.as_deref());
  print_field("Submitted via", record.submitted_via.as_deref());
  print_field("Company response to consumer", record.company_response.as_deref());
  print_field("Timely response?", record.timely_response.as_deref());
  print_field("Consumer disputed?", record.consumer_disputed.as_deref());

  if let Some(narrative) = record.usable_narrative() {
    print_wrapped("Consumer complaint narrative", narrative);
  }
}

/// A titled block of wrapped text
pub fn print_wrapped(title: &str, text: &str) {
  println!("\n  {}", title.bold());
  for line in wrap_text(text, 80) {
    println!("    {line}");
  }
}

pub fn print_summary(summary: &str) {
  print_wrapped("Summary", summary);
}

pub fn print_warning(message: &str) {
  println!("{} {}", "⚠".yellow(), message.yellow());
}

pub fn print_failure(message: &str) {
  println!("{} {}", "✗".red(), message.red());
}

/// Spinner shown while a request to the service is pending
pub fn pending_spinner(message: &str) -> ProgressBar {
  let spinner = ProgressBar::new_spinner();
  if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
    spinner.set_style(style);
  }
  spinner.set_message(message.to_string());
  spinner.enable_steady_tick(Duration::from_millis(100));
  spinner
}
