//! Hub and session statistics

pub mod metrics;

pub use metrics::{HubMetrics, HubStats, SessionStats};
