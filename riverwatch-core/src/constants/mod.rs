//! Constants for RiverWatch Core
//!
//! Reference values of the monitoring backend, collected in one place so the
//! defaults of every configuration struct trace back to a named constant.
//!
//! ## Organization
//!
//! - **Metrics**: plausible ranges per water-quality metric
//! - **Time**: freshness threshold and cache lifetimes
//! - **Detector**: history sizes and noise ratios of the malfunction heuristics
//! - **Storage**: batch sizes for bulk writes
//!
//! Constants are defaults, not limits. Every component receives its values
//! through a config struct at construction.

/// Plausible value ranges per metric.
pub mod metrics;

/// Freshness thresholds and cache time-to-live values.
pub mod time;

/// Malfunction heuristic parameters.
pub mod detector;

/// Bulk write sizing.
pub mod storage;

pub use detector::{
    DEFAULT_ERRATIC_MIN_MEAN, DEFAULT_ERRATIC_RATIO, DEFAULT_MIN_HISTORY, DEFAULT_TRAILING_WINDOW,
};
pub use storage::DEFAULT_INSERT_BATCH_SIZE;
pub use time::{DEFAULT_ANALYSIS_TTL_MINUTES, DEFAULT_FRESHNESS_THRESHOLD_MINUTES};
