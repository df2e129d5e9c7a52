//! Registry activity statistics

pub mod metrics;

pub use metrics::{RegistryStats, StatsSnapshot};
