//! Metrics for the 14 standard PDF fonts.

pub mod metrics;
