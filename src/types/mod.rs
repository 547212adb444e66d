//! Shared data types.

pub mod usage_metrics;
