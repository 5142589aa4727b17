//! Infrastructure - configuration and metrics
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults, process-wide zone policy)
//! - `metrics` - Lock-free run counters

pub mod config;
pub mod metrics;

// Re-export commonly used types
pub use config::{excluded_zones, install_excluded_zones, Config};
pub use metrics::{Metrics, MetricsSummary};
