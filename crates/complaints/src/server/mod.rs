//! Query service for the complaint dashboard
//!
//! Exposes summarization over the passage index and record lookup over the
//! dataset as a small axum REST API.

pub mod context;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod startup;
pub mod types;
