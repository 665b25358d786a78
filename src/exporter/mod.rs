//! Metrics export.

pub mod prometheus;

pub use prometheus::{Metrics, MetricsServer};
