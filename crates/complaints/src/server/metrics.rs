//! Prometheus-compatible request metrics
//!
//! Counters are lock-free `AtomicU64`s; `/metrics` renders them in the text
//! exposition format.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const ENDPOINT_COUNT: usize = 6;

/// Endpoints with their own counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  Summarize,
  Complaint,
  Status,
  Logs,
  Metrics,
  Other,
}

impl Endpoint {
  const ALL: [Endpoint; ENDPOINT_COUNT] = [
    Endpoint::Summarize,
    Endpoint::Complaint,
    Endpoint::Status,
    Endpoint::Logs,
    Endpoint::Metrics,
    Endpoint::Other,
  ];

  /// Map a matched route template to its endpoint
  pub fn from_route(route: &str) -> Self {
    match route {
      "/summarize" => Self::Summarize,
      "/complaint/{id}" => Self::Complaint,
      "/status" | "/version" => Self::Status,
      "/logs" => Self::Logs,
      "/metrics" => Self::Metrics,
      _ => Self::Other,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Summarize => "summarize",
      Self::Complaint => "complaint",
      Self::Status => "status",
      Self::Logs => "logs",
      Self::Metrics => "metrics",
      Self::Other => "other",
    }
  }

  fn index(self) -> usize {
    self as usize
  }
}

#[derive(Default)]
struct EndpointCounters {
  requests: AtomicU64,
  errors: AtomicU64,
  latency_us: AtomicU64,
}

/// Per-endpoint counters shared by the middleware and handlers
pub struct ServiceMetrics {
  endpoints: [EndpointCounters; ENDPOINT_COUNT],
  start_time: Instant,
}

impl Default for ServiceMetrics {
  fn default() -> Self {
    Self::new()
  }
}

impl ServiceMetrics {
  pub fn new() -> Self {
    Self { endpoints: Default::default(), start_time: Instant::now() }
  }

  /// Count a completed request and add its latency
  pub fn record_request(&self, endpoint: Endpoint, elapsed: Duration) {
    let counters = &self.endpoints[endpoint.index()];
    counters.requests.fetch_add(1, Ordering::Relaxed);
    counters.latency_us.fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
  }

  /// Count a request answered with an error payload or error status
  pub fn record_error(&self, endpoint: Endpoint) {
    self.endpoints[endpoint.index()].errors.fetch_add(1, Ordering::Relaxed);
  }

  pub fn requests(&self, endpoint: Endpoint) -> u64 {
    self.endpoints[endpoint.index()].requests.load(Ordering::Relaxed)
  }

  pub fn errors(&self, endpoint: Endpoint) -> u64 {
    self.endpoints[endpoint.index()].errors.load(Ordering::Relaxed)
  }

  /// Format all metrics as Prometheus text exposition
  pub fn to_prometheus(&self, records: usize, passages: Option<usize>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# HELP complaints_dataset_records Records loaded from the dataset");
    let _ = writeln!(out, "# TYPE complaints_dataset_records gauge");
    let _ = writeln!(out, "complaints_dataset_records {records}");
    if let Some(passages) = passages {
      let _ = writeln!(out, "# HELP complaints_index_passages Passages held by the similarity index");
      let _ = writeln!(out, "# TYPE complaints_index_passages gauge");
      let _ = writeln!(out, "complaints_index_passages {passages}");
    }
    let _ = writeln!(out, "# HELP complaints_uptime_seconds Server uptime in seconds");
    let _ = writeln!(out, "# TYPE complaints_uptime_seconds gauge");
    let _ = writeln!(out, "complaints_uptime_seconds {}", self.start_time.elapsed().as_secs());

    let families = [
      ("complaints_requests_total", "Requests handled per endpoint"),
      ("complaints_errors_total", "Requests answered with an error per endpoint"),
      ("complaints_request_latency_us_sum", "Summed request latency in microseconds per endpoint"),
    ];

    for (family, (name, help)) in families.into_iter().enumerate() {
      let _ = writeln!(out, "# HELP {name} {help}");
      let _ = writeln!(out, "# TYPE {name} counter");
      for endpoint in Endpoint::ALL {
        let counters = &self.endpoints[endpoint.index()];
        let value = match family {
          0 => &counters.requests,
          1 => &counters.errors,
          _ => &counters.latency_us,
        }
        .load(Ordering::Relaxed);
        let _ = writeln!(out, "{name}{{endpoint=\"{}\"}} {value}", endpoint.label());
      }
    }

    out
  }
}
