pub mod complaint;
pub mod logs;
pub mod metrics;
pub mod status;
pub mod summarize;
