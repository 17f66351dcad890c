//! Terminal dashboard over the complaint dataset
//!
//! Dataset views run locally; summarization and lookup go through the query
//! service over HTTP.

pub mod client;
pub mod commands;
pub mod display;
