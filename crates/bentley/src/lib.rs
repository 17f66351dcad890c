//! Bentley - leveled console logging for the complaints tools
//!
//! All output goes to stderr so stdout stays reserved for rendered views.
//!
//! ## Usage
//!
//! Level functions: `info()`, `warn()`, `error()`, `success()`, `verbose()`
//!
//! Each has a format-style macro of the same name:
//! `bentley::info!("Loaded {} records", count)`.
//!
//! Persistent JSONL logs for the query service live in [`daemon_logs`]
//! behind the `daemon-logs` feature.

use colored::*;

#[cfg(feature = "daemon-logs")]
pub mod daemon_logs;

/// Core logging function that handles the actual output
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Format a colored, fixed-width prefix for log messages
fn format_prefix(color: Color, prefix: &str) -> String {
  let padding = 7usize.saturating_sub(prefix.len() + 2);
  format!("[{}]{:<padding$}", prefix.color(color).bold(), "")
}

fn log_prefixed(color: Color, prefix: &str, message: &str) {
  let prefix = format_prefix(color, prefix);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn verbose(message: &str) {
  log_prefixed(Color::Cyan, "verb", message);
}

/// Info level logging - general information
pub fn info(message: &str) {
  log_prefixed(Color::Blue, "info", message);
}

/// Warning level logging - something needs attention
pub fn warn(message: &str) {
  log_prefixed(Color::Yellow, "warn", message);
}

/// Error level logging - something went wrong
pub fn error(message: &str) {
  log_prefixed(Color::Red, "error", message);
}

/// Success level logging - something completed successfully
pub fn success(message: &str) {
  log_prefixed(Color::Green, "sccs", message);
}

#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => {
    $crate::info(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($($arg:tt)*) => {
    $crate::warn(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => {
    $crate::error(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($($arg:tt)*) => {
    $crate::verbose(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => {
    $crate::success(&format!($($arg)*)) // LCOV_EXCL_LINE
  };
}
