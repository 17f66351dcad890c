//! Persistent structured logs for long-running services
//!
//! Entries are appended to a JSONL file and echoed to the console unless the
//! store is silent. Reads return the newest `limit` entries in chronological
//! order so they print naturally in a terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Verbose,
  Info,
  Success,
  Warn,
  Error,
}

impl Level {
  /// Parse a level filter; `"all"` and unknown values mean no filter
  pub fn parse_filter(filter: &str) -> Option<Self> {
    match filter.to_ascii_lowercase().as_str() {
      "verbose" => Some(Self::Verbose),
      "info" => Some(Self::Info),
      "success" => Some(Self::Success),
      "warn" | "warning" => Some(Self::Warn),
      "error" => Some(Self::Error),
      _ => None,
    }
  }
}

/// Request context attached to a log entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogContext {
  /// Request ID for correlation
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,

  /// Wall-clock duration of the logged operation
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,

  /// Free-text query the operation was run for
  #[serde(skip_serializing_if = "Option::is_none")]
  pub query: Option<String>,
}

/// A structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: Level,
  pub component: String,
  pub message: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<LogContext>,
}

struct LogFile {
  path: PathBuf,
}

impl LogFile {
  fn open(path: &Path) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self { path: path.to_path_buf() })
  }

  fn append(&mut self, entry: &LogEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  fn read(&self, limit: Option<usize>, level: Option<Level>) -> std::io::Result<Vec<LogEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }
      // Skip malformed lines
      let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
        continue;
      };
      if level.is_none_or(|wanted| entry.level == wanted) {
        entries.push(entry);
      }
    }

    entries.sort_by_key(|entry| entry.timestamp);
    if let Some(limit) = limit {
      let skip = entries.len().saturating_sub(limit);
      entries.drain(..skip);
    }
    Ok(entries)
  }
}

/// Thread-safe JSONL log store shared across request handlers
#[derive(Clone)]
pub struct DaemonLogs {
  file: Arc<Mutex<LogFile>>,
  silent: bool,
}

impl DaemonLogs {
  /// Open (or create) a log store at `path`, echoing entries to stderr
  pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::new_with_silent(path, false)
  }

  /// Open a log store, optionally without console echo
  pub fn new_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let file = LogFile::open(path.as_ref())?;
    Ok(Self { file: Arc::new(Mutex::new(file)), silent })
  }

  /// Append an entry, returning any I/O failure
  pub async fn append(
    &self,
    level: Level,
    component: &str,
    message: &str,
    context: Option<LogContext>,
  ) -> std::io::Result<()> {
    let entry = LogEntry {
      timestamp: Utc::now(),
      level,
      component: component.to_string(),
      message: message.to_string(),
      context,
    };
    self.file.lock().await.append(&entry)
  }

  /// Append an entry and echo it; write failures are reported on the console only
  pub async fn record(&self, level: Level, component: &str, message: &str, context: Option<LogContext>) {
    if let Err(e) = self.append(level, component, message, context).await {
      crate::warn!("Failed to persist log entry: {e}");
    }

    if self.silent {
      return;
    }
    match level {
      Level::Verbose => crate::verbose(message),
      Level::Info => crate::info(message),
      Level::Success => crate::success(message),
      Level::Warn => crate::warn(message),
      Level::Error => crate::error(message),
    }
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.record(Level::Info, component, message, None).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.record(Level::Success, component, message, None).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.record(Level::Warn, component, message, None).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.record(Level::Error, component, message, None).await;
  }

  /// Newest `limit` entries (all when `None`), oldest first, optionally one level only
  pub async fn get_logs(&self, limit: Option<usize>, level: Option<Level>) -> std::io::Result<Vec<LogEntry>> {
    self.file.lock().await.read(limit, level)
  }

  pub async fn log_file_path(&self) -> PathBuf {
    self.file.lock().await.path.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::TempDir;

  fn temp_log_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("service.logs.jsonl");
    (temp_dir, log_path)
  }

  #[tokio::test]
  async fn test_new_creates_file_and_parents() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested").join("deep").join("service.jsonl");

    let logs = DaemonLogs::new_with_silent(&nested, true).unwrap();

    assert!(nested.exists());
    assert_eq!(logs.log_file_path().await, nested);
  }

  #[tokio::test]
  async fn test_append_writes_one_json_line_per_entry() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = DaemonLogs::new_with_silent(&log_path, true).unwrap();

    logs.append(Level::Info, "api", "First", None).await.unwrap();
    logs.append(Level::Error, "api", "Second", None).await.unwrap();

    let content = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = content.trim().split('\n').collect();
    assert_eq!(lines.len(), 2);

    let entry: LogEntry = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(entry.level, Level::Error);
    assert_eq!(entry.message, "Second");
    assert!(lines[0].contains("\"level\":\"info\""));
  }

  #[tokio::test]
  async fn test_context_round_trips_with_query_and_duration() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = DaemonLogs::new_with_silent(&log_path, true).unwrap();

    let context = LogContext {
      query: Some("credit report errors".to_string()),
      duration_ms: Some(1520.0),
      ..Default::default()
    };
    logs.record(Level::Success, "summarize", "done", Some(context.clone())).await;

    let entries = logs.get_logs(None, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].context.as_ref(), Some(&context));

    let raw = fs::read_to_string(&log_path).unwrap();
    assert!(!raw.contains("request_id"), "absent context fields are skipped");
  }

  #[tokio::test]
  async fn test_get_logs_filters_by_level() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = DaemonLogs::new_with_silent(&log_path, true).unwrap();

    logs.info("one", "a").await;
    logs.warn("two", "a").await;
    logs.info("three", "a").await;

    let infos = logs.get_logs(None, Some(Level::Info)).await.unwrap();
    assert_eq!(infos.len(), 2);
    assert!(infos.iter().all(|e| e.level == Level::Info));
  }

  #[tokio::test]
  async fn test_get_logs_keeps_newest_entries_in_order() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = DaemonLogs::new_with_silent(&log_path, true).unwrap();

    for i in 0..5 {
      logs.info(&format!("entry {i}"), "a").await;
      tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let latest = logs.get_logs(Some(2), None).await.unwrap();
    let messages: Vec<_> = latest.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["entry 3", "entry 4"]);
  }

  #[tokio::test]
  async fn test_get_logs_skips_malformed_lines() {
    let (_temp_dir, log_path) = temp_log_path();
    let logs = DaemonLogs::new_with_silent(&log_path, true).unwrap();

    logs.info("valid", "a").await;
    fs::OpenOptions::new()
      .append(true)
      .open(&log_path)
      .unwrap()
      .write_all(b"not json\n\n")
      .unwrap();
    logs.error("also valid", "a").await;

    assert_eq!(logs.get_logs(None, None).await.unwrap().len(), 2);
  }

  #[test]
  fn test_level_filter_parsing() {
    assert_eq!(Level::parse_filter("warning"), Some(Level::Warn));
    assert_eq!(Level::parse_filter("ERROR"), Some(Level::Error));
    assert_eq!(Level::parse_filter("all"), None);
  }
}
